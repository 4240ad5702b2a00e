use chrono::{DateTime, Utc};
use std::fmt;

const SESSION_PREFIX: &str = "user_";

/// Identifier correlating every request from one client run with the
/// conversational state the backend keeps for it.
///
/// Created once at startup and never regenerated; the value is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        SessionId(format!("{SESSION_PREFIX}{}", now.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
