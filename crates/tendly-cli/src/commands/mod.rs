pub mod config;
pub mod focus;
pub mod garden;
pub mod social;
pub mod stats;
pub mod task;

use serde::Serialize;
use tendly_core::{
    AttestationProvider, Config, GardenEngine, Identity, LocalAttestor, SqliteStore,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Identity from `TENDLY_USER` / `TENDLY_DISPLAY_NAME`, else the local user.
fn identity_from_env() -> Identity {
    let local = Identity::local();
    let user_id = std::env::var("TENDLY_USER")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(local.user_id);
    let display_name = std::env::var("TENDLY_DISPLAY_NAME")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(local.display_name);
    Identity::new(user_id, display_name)
}

/// The local attestor, generating and saving a key on first use.
fn attestor_for(config: &mut Config) -> Result<Option<Box<dyn AttestationProvider>>, Box<dyn std::error::Error>> {
    if !config.attestation.enabled {
        return Ok(None);
    }
    let attestor = match config.attestation.secret.as_deref() {
        Some(secret) => LocalAttestor::from_hex(secret)?,
        None => {
            let attestor = LocalAttestor::generate();
            config.attestation.secret = Some(attestor.secret_hex());
            config.save()?;
            attestor
        }
    };
    Ok(Some(Box::new(attestor)))
}

/// Open the SQLite-backed engine for the current user and load it.
pub fn open_engine() -> Result<GardenEngine, Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    let identity = identity_from_env();
    let store = SqliteStore::open_default(identity.user_id.clone())?;
    let attestor = attestor_for(&mut config)?;
    let mut engine = GardenEngine::new(Box::new(store), attestor, identity, config);
    let report = engine.load();
    tracing::debug!(?report, "engine ready");
    Ok(engine)
}

/// Log queued events and make sure everything reached the store.
pub fn finish(engine: &mut GardenEngine) {
    for event in engine.take_events() {
        tracing::debug!(?event, "event");
    }
    let outcome = engine.persist();
    if !outcome.is_clean() {
        eprintln!("warning: {} collection(s) could not be saved", outcome.failed);
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
