//! Status-code based severity tiers.
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::types::ParsedLine;

/// Coarse classification of an access-log record.
///
/// Ordered from least to most severe, so `tier_a <= tier_b` compares
/// severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Normal,
    ClientError,
    ServerError,
}

impl SeverityTier {
    /// `>= 500` is a server error, `400..=499` a client error, anything else
    /// (including 0 for "no status") is normal.
    pub fn from_status(status: u64) -> Self {
        match status {
            500..=u64::MAX => SeverityTier::ServerError,
            400..=499 => SeverityTier::ClientError,
            _ => SeverityTier::Normal,
        }
    }

    /// Log level an event of this tier is emitted at.
    pub fn level(self) -> Level {
        match self {
            SeverityTier::Normal => Level::INFO,
            SeverityTier::ClientError => Level::WARN,
            SeverityTier::ServerError => Level::ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityTier::Normal => "normal",
            SeverityTier::ClientError => "client_error",
            SeverityTier::ServerError => "server_error",
        }
    }
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a parse result. A missing line or a line without a usable
/// status is treated as status 0.
pub fn classify(parsed: Option<&ParsedLine>) -> SeverityTier {
    let status = parsed.and_then(ParsedLine::status).unwrap_or(0);
    SeverityTier::from_status(status)
}
