use serde::{Deserialize, Serialize};

use crate::error::{BktError, Result};
use crate::types::{is_probability, DEFAULT_MASTERY_THRESHOLD};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterConfig {
    pub mastery_threshold: f64,
    pub track_progress: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
            track_progress: false,
        }
    }
}

impl RosterConfig {
    /// Defaults overridden by `BKT_MASTERY_THRESHOLD` and `BKT_TRACK_PROGRESS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("BKT_MASTERY_THRESHOLD") {
            match val.parse::<f64>() {
                Ok(threshold) if is_probability(threshold) => config.mastery_threshold = threshold,
                _ => tracing::warn!(value = %val, "Ignoring invalid BKT_MASTERY_THRESHOLD"),
            }
        }
        if let Some(val) = lookup("BKT_TRACK_PROGRESS") {
            match val.as_str() {
                "true" | "1" => config.track_progress = true,
                "false" | "0" => config.track_progress = false,
                _ => tracing::warn!(value = %val, "Ignoring invalid BKT_TRACK_PROGRESS"),
            }
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if !is_probability(self.mastery_threshold) {
            return Err(BktError::InvalidArgument(format!(
                "mastery threshold {} is not a probability",
                self.mastery_threshold
            )));
        }
        Ok(())
    }
}
