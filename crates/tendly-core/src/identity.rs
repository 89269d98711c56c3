use serde::{Deserialize, Serialize};

/// Authenticated user as supplied by the host application.
///
/// The engine only reads it: the id partitions storage and signs social
/// actions, the display fields are copied onto posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            avatar_url: None,
        }
    }

    /// Single-user identity used when no provider is wired in.
    pub fn local() -> Self {
        Self::new("local", "Gardener")
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::local()
    }
}
