//! Versioned JSON documents stored under fixed keys.
//!
//! Every document is wrapped as `{"version": N, "data": ...}`. A document
//! that is missing, unparseable, or from another schema version decodes to
//! the type's default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SCHEMA_VERSION: u32 = 1;

pub const TASKS: &str = "tasks";
pub const PLANTS: &str = "plants";
pub const SESSIONS: &str = "sessions";
pub const PROFILE: &str = "profile";
pub const ACHIEVEMENTS: &str = "achievements";
pub const FEED: &str = "feed";
pub const TIMER: &str = "timer";
pub const WEATHER: &str = "weather";
pub const CHALLENGES: &str = "challenges";

/// Every key the engine writes, in write order.
pub const ALL_KEYS: [&str; 9] = [
    TASKS,
    PLANTS,
    SESSIONS,
    PROFILE,
    ACHIEVEMENTS,
    FEED,
    TIMER,
    WEATHER,
    CHALLENGES,
];

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

/// Why a stored document could not be read.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Not JSON, or not the expected shape
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Written by another schema version
    #[error("schema version {found}, expected {}", SCHEMA_VERSION)]
    Version { found: u32 },
}

pub fn encode<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&EnvelopeRef {
        version: SCHEMA_VERSION,
        data,
    })
}

pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, DecodeError> {
    // Check the version before the payload shape, so a future schema is
    // reported as such rather than as malformed.
    let header: Envelope<serde_json::Value> = serde_json::from_str(raw)?;
    if header.version != SCHEMA_VERSION {
        return Err(DecodeError::Version {
            found: header.version,
        });
    }
    Ok(serde_json::from_value(header.data)?)
}
