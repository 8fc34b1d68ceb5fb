//! Observation batch wire format
//!
//! Codes are shifted by one so that a column reads `1` for incorrect, `2` for
//! correct and `0` for "no observation". Every batch ends with one sentinel
//! column. `starts` are 1-based offsets into the columns.

use serde::{Deserialize, Serialize};

use crate::error::{BktError, Result};
use crate::model::params::SkillParams;
use crate::types::{UpdateOptions, DEFAULT_RESOURCE, SENTINEL_CODE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationBatch {
    pub starts: Vec<usize>,
    pub lengths: Vec<usize>,
    /// 1-based resource id per column
    pub resources: Vec<usize>,
    /// One row per guess/slip category, one column per position
    pub data: Vec<Vec<u8>>,
}

impl ObservationBatch {
    /// Builds a single-segment batch for `observations` (0/1 values) followed
    /// by the sentinel column.
    pub fn for_update(
        skill: &str,
        params: &SkillParams,
        observations: &[u8],
        options: &UpdateOptions,
    ) -> Result<Self> {
        let codes: Vec<u8> = observations
            .iter()
            .map(|&observed| observed + 1)
            .chain(std::iter::once(SENTINEL_CODE))
            .collect();
        let len = codes.len();

        let resources = match options.multilearn.as_deref() {
            Some(labels) => {
                check_label_count("multilearn", labels, observations.len())?;
                let mut ids = labels
                    .iter()
                    .map(|label| {
                        params
                            .resource_id(label)
                            .ok_or_else(|| BktError::UnknownResource {
                                skill: skill.to_string(),
                                label: label.clone(),
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                // The sentinel column keeps the resource of the last real observation.
                let last = ids.last().copied().unwrap_or(DEFAULT_RESOURCE);
                ids.push(last);
                ids
            }
            None => vec![DEFAULT_RESOURCE; len],
        };

        let data = match options.multigs.as_deref() {
            Some(labels) => {
                check_label_count("multigs", labels, observations.len())?;
                let mut rows = vec![vec![SENTINEL_CODE; len]; params.num_categories()];
                for (column, label) in labels.iter().enumerate() {
                    let row = params
                        .category_row(label)
                        .ok_or_else(|| BktError::UnknownCategory {
                            skill: skill.to_string(),
                            label: label.clone(),
                        })?;
                    rows[row][column] = codes[column];
                }
                rows
            }
            None => vec![codes],
        };

        Ok(Self {
            starts: vec![1],
            lengths: vec![len],
            resources,
            data,
        })
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Category row and shifted code of the observation at `column`, if any.
    pub fn observation_at(&self, column: usize) -> Option<(usize, u8)> {
        self.data.iter().enumerate().find_map(|(row, codes)| {
            codes
                .get(column)
                .copied()
                .filter(|&code| code != SENTINEL_CODE)
                .map(|code| (row, code))
        })
    }
}

fn check_label_count(option: &str, labels: &[String], expected: usize) -> Result<()> {
    if labels.len() != expected {
        return Err(BktError::InvalidArgument(format!(
            "{option} carries {} labels for {expected} observations",
            labels.len()
        )));
    }
    Ok(())
}
