//! Fitted per-skill BKT parameters
//!
//! Resources (learning opportunities) are numbered from 1 on the wire;
//! guess/slip categories are numbered from 0 and select a data row.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{BktError, Result};
use crate::types::{is_probability, DEFAULT_LABEL};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillParams {
    /// Population probability of mastery before any observation
    pub prior: f64,
    /// `[P(unmastered), P(mastered)]` at the first position, derived from `prior`
    pub initial_distribution: [f64; 2],
    /// P(unmastered -> mastered), one entry per resource
    pub learns: Vec<f64>,
    /// P(mastered -> unmastered), one entry per resource
    pub forgets: Vec<f64>,
    /// P(correct | unmastered), one entry per category
    pub guesses: Vec<f64>,
    /// P(incorrect | mastered), one entry per category
    pub slips: Vec<f64>,
    /// Resource label -> 1-based resource id
    pub resource_names: HashMap<String, usize>,
    /// Category label -> 0-based data row
    pub gs_names: HashMap<String, usize>,
}

impl SkillParams {
    /// Single-resource, single-category skill without forgetting.
    pub fn new(prior: f64, learn: f64, guess: f64, slip: f64) -> Self {
        Self {
            prior,
            initial_distribution: [1.0 - prior, prior],
            learns: vec![learn],
            forgets: vec![0.0],
            guesses: vec![guess],
            slips: vec![slip],
            resource_names: HashMap::from([(DEFAULT_LABEL.to_string(), 1)]),
            gs_names: HashMap::from([(DEFAULT_LABEL.to_string(), 0)]),
        }
    }

    /// Replaces the resource table. Ids are assigned `1..=n` in iteration order.
    pub fn with_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        self.learns.clear();
        self.forgets.clear();
        self.resource_names.clear();
        for (index, (label, learn, forget)) in resources.into_iter().enumerate() {
            self.resource_names.insert(label.into(), index + 1);
            self.learns.push(learn);
            self.forgets.push(forget);
        }
        self
    }

    /// Replaces the guess/slip category table. Rows are assigned `0..n` in iteration order.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        self.guesses.clear();
        self.slips.clear();
        self.gs_names.clear();
        for (row, (label, guess, slip)) in categories.into_iter().enumerate() {
            self.gs_names.insert(label.into(), row);
            self.guesses.push(guess);
            self.slips.push(slip);
        }
        self
    }

    pub fn with_forget(mut self, forget: f64) -> Self {
        self.forgets = vec![forget; self.learns.len()];
        self
    }

    pub fn num_resources(&self) -> usize {
        self.learns.len()
    }

    pub fn num_categories(&self) -> usize {
        self.guesses.len()
    }

    pub fn resource_id(&self, label: &str) -> Option<usize> {
        self.resource_names.get(label).copied()
    }

    pub fn category_row(&self, label: &str) -> Option<usize> {
        self.gs_names.get(label).copied()
    }

    /// Copy of these parameters that starts inference from `mastery_probability`
    /// instead of the population prior.
    pub fn resumed_from(&self, mastery_probability: f64) -> Self {
        Self {
            prior: mastery_probability,
            initial_distribution: [1.0 - mastery_probability, mastery_probability],
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_probability(self.prior) {
            return Err(invalid(format!("prior {} is not a probability", self.prior)));
        }
        let [unmastered, mastered] = self.initial_distribution;
        if !is_probability(unmastered)
            || !is_probability(mastered)
            || (unmastered + mastered - 1.0).abs() > 1e-6
        {
            return Err(invalid(format!(
                "initial distribution {:?} does not sum to 1",
                self.initial_distribution
            )));
        }
        if (mastered - self.prior).abs() > 1e-6 {
            return Err(invalid(format!(
                "initial distribution {:?} disagrees with prior {}",
                self.initial_distribution, self.prior
            )));
        }

        if self.learns.is_empty() || self.learns.len() != self.forgets.len() {
            return Err(invalid(format!(
                "{} learn rates for {} forget rates",
                self.learns.len(),
                self.forgets.len()
            )));
        }
        if self.guesses.is_empty() || self.guesses.len() != self.slips.len() {
            return Err(invalid(format!(
                "{} guess rates for {} slip rates",
                self.guesses.len(),
                self.slips.len()
            )));
        }

        let rates = self
            .learns
            .iter()
            .chain(&self.forgets)
            .chain(&self.guesses)
            .chain(&self.slips);
        if let Some(bad) = rates.copied().find(|&rate| !is_probability(rate)) {
            return Err(invalid(format!("rate {bad} is not a probability")));
        }

        if let Some((label, &id)) = self
            .resource_names
            .iter()
            .find(|(_, &id)| id == 0 || id > self.num_resources())
        {
            return Err(invalid(format!("resource {label:?} maps to unknown id {id}")));
        }
        if let Some((label, &row)) = self
            .gs_names
            .iter()
            .find(|(_, &row)| row >= self.num_categories())
        {
            return Err(invalid(format!("category {label:?} maps to unknown row {row}")));
        }

        Ok(())
    }
}

fn invalid(message: String) -> BktError {
    BktError::InvalidArgument(message)
}
