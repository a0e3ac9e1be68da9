//! Subscription tiers and their upload limits

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MB: i64 = 1024 * 1024;

/// Account subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    #[default]
    Free,
    Basic,
    Professional,
    Team,
}

/// Upload limits for a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    /// Largest accepted PDF, in bytes
    pub max_file_size: i64,
    /// Maximum schematics owned; `None` is unlimited
    pub max_schematics: Option<i64>,
}

impl Tier {
    pub fn limits(self) -> TierLimits {
        match self {
            Tier::Free => TierLimits {
                max_file_size: 10 * MB,
                max_schematics: Some(50),
            },
            Tier::Basic => TierLimits {
                max_file_size: 50 * MB,
                max_schematics: Some(500),
            },
            Tier::Professional => TierLimits {
                max_file_size: 100 * MB,
                max_schematics: Some(5000),
            },
            Tier::Team => TierLimits {
                max_file_size: 200 * MB,
                max_schematics: None,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "FREE",
            Tier::Basic => "BASIC",
            Tier::Professional => "PROFESSIONAL",
            Tier::Team => "TEAM",
        }
    }

    /// Parse a stored tier, falling back to FREE for unknown values
    pub fn from_db(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl TierLimits {
    /// Size limit in whole megabytes, as shown to users
    pub fn max_file_size_mb(&self) -> i64 {
        (self.max_file_size as f64 / MB as f64).round() as i64
    }

    /// Whether an account with `count` schematics may add another
    pub fn allows_another(&self, count: i64) -> bool {
        match self.max_schematics {
            Some(max) => count < max,
            None => true,
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" => Ok(Tier::Free),
            "BASIC" => Ok(Tier::Basic),
            "PROFESSIONAL" => Ok(Tier::Professional),
            "TEAM" => Ok(Tier::Team),
            other => Err(format!("Unknown tier: {}", other)),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
