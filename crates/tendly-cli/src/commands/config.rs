use clap::Subcommand;
use tendly_core::Config;

use super::{finish, open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "timer.focus_minutes")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            // Through the engine so an idle timer picks up new lengths now.
            let mut engine = open_engine()?;
            let mut config = engine.config().clone();
            config.set(&key, &value)?;
            engine.update_config(config)?;
            engine.config().save()?;
            finish(&mut engine);
            println!("ok");
        }
        ConfigAction::List => {
            let mut config = Config::load()?;
            if config.attestation.secret.is_some() {
                config.attestation.secret = Some("<hidden>".into());
            }
            print_json(&config)?;
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
