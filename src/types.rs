//! Common Types and Constants
//!
//! Shared data structures used by the model and roster modules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BktError, Result};

// ==================== Constants ====================

/// Marker for "unset / no observation / untrained"
pub const SENTINEL: f64 = -1.0;

/// Default probability at or above which a student counts as mastered
pub const DEFAULT_MASTERY_THRESHOLD: f64 = 0.95;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

/// Wire code for the appended end-of-sequence observation
pub const SENTINEL_CODE: u8 = 0;

/// Resource id used when no `multilearn` labels are given
pub const DEFAULT_RESOURCE: usize = 1;

/// Label of the single resource / category a plainly fitted skill carries
pub const DEFAULT_LABEL: &str = "default";

/// Returns true for a valid probability, i.e. neither the sentinel nor NaN.
pub fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

// ==================== Classification ====================

/// Coarse mastery classification of one student
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateType {
    /// No usable belief yet
    #[default]
    Default,
    Unmastered,
    Mastered,
}

impl StateType {
    pub const fn as_str(self) -> &'static str {
        match self {
            StateType::Default => "DEFAULT",
            StateType::Unmastered => "UNMASTERED",
            StateType::Mastered => "MASTERED",
        }
    }

    /// Threshold rule: sentinel -> `Default`, `>= threshold` -> `Mastered`,
    /// anything else -> `Unmastered`.
    pub fn classify(mastery_probability: f64, mastery_threshold: f64) -> Self {
        if !is_probability(mastery_probability) {
            StateType::Default
        } else if mastery_probability >= mastery_threshold {
            StateType::Mastered
        } else {
            StateType::Unmastered
        }
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Belief ====================

/// Continuous belief about one student
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Belief {
    /// Predicted probability of answering the last observed item correctly
    pub correctness_estimate: f64,
    /// Posterior probability that the skill is mastered
    pub mastery_probability: f64,
}

impl Belief {
    /// Both fields set to the sentinel
    pub const fn untrained() -> Self {
        Self {
            correctness_estimate: SENTINEL,
            mastery_probability: SENTINEL,
        }
    }

    /// Belief before any observation for a fitted skill
    pub const fn seeded(prior: f64) -> Self {
        Self {
            correctness_estimate: SENTINEL,
            mastery_probability: prior,
        }
    }

    pub fn is_trained(&self) -> bool {
        is_probability(self.mastery_probability)
    }
}

impl Default for Belief {
    fn default() -> Self {
        Self::untrained()
    }
}

// ==================== Identifiers ====================

/// Student identifier
///
/// Auto-generated populations use the decimal ids `1..=N`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for StudentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i32> for StudentId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for StudentId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<usize> for StudentId {
    fn from(id: usize) -> Self {
        Self(id.to_string())
    }
}

// ==================== Update Input ====================

/// One correctness observation or a fixed-length run of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Correctness {
    Single(i32),
    Sequence(Vec<i32>),
}

impl Correctness {
    /// Validated observations, each 0 (incorrect) or 1 (correct).
    pub fn observations(&self) -> Result<Vec<u8>> {
        let raw: &[i32] = match self {
            Correctness::Single(value) => std::slice::from_ref(value),
            Correctness::Sequence(values) => values,
        };
        if raw.is_empty() {
            return Err(BktError::InvalidArgument(
                "correctness sequence must not be empty".to_string(),
            ));
        }
        raw.iter()
            .map(|&value| match value {
                0 => Ok(0),
                1 => Ok(1),
                other => Err(BktError::InvalidArgument(format!(
                    "correctness must be 0 or 1, got {other}"
                ))),
            })
            .collect()
    }
}

impl From<i32> for Correctness {
    fn from(value: i32) -> Self {
        Correctness::Single(value)
    }
}

impl From<bool> for Correctness {
    fn from(value: bool) -> Self {
        Correctness::Single(i32::from(value))
    }
}

impl From<Vec<i32>> for Correctness {
    fn from(values: Vec<i32>) -> Self {
        Correctness::Sequence(values)
    }
}

impl From<&[i32]> for Correctness {
    fn from(values: &[i32]) -> Self {
        Correctness::Sequence(values.to_vec())
    }
}

impl From<Vec<bool>> for Correctness {
    fn from(values: Vec<bool>) -> Self {
        Correctness::Sequence(values.into_iter().map(i32::from).collect())
    }
}

/// Recognized update options
///
/// Each label sequence, when present, carries one label per real observation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptions {
    /// Per-observation resource labels, looked up in the skill's resource table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multilearn: Option<Vec<String>>,
    /// Per-observation guess/slip category labels, looked up in the skill's category table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multigs: Option<Vec<String>>,
}

impl UpdateOptions {
    pub fn with_multilearn<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.multilearn = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_multigs<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.multigs = Some(labels.into_iter().map(Into::into).collect());
        self
    }
}
