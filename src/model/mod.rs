//! BKT model parameters and prediction
//!
//! The [`Model`] owns the fitted parameters of every skill it knows about and
//! one [`Predictor`]. Fitting lives outside this crate: trained parameters are
//! installed with [`Model::fit_skill`].
//!
//! Readers never hold the parameter lock across a prediction. An update takes
//! a snapshot with [`Model::skill_params`], applies its own overrides to the
//! copy and passes the copy to [`Model::predict`].

pub mod batch;
pub mod forward;
pub mod params;

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use batch::ObservationBatch;
pub use forward::ForwardPredictor;
pub use params::SkillParams;

/// Output of one prediction call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// P(correct) per column
    pub correct_predictions: Vec<f64>,
    /// `[P(unmastered), P(mastered)]` per column
    pub state_predictions: [Vec<f64>; 2],
}

impl Prediction {
    pub fn mastered(&self) -> &[f64] {
        &self.state_predictions[1]
    }
}

/// Pure prediction routine over one parameter set and one batch
pub trait Predictor: Send + Sync {
    fn predict(&self, params: &SkillParams, batch: &ObservationBatch) -> Result<Prediction>;
}

pub struct Model {
    fit_model: RwLock<HashMap<String, SkillParams>>,
    predictor: Box<dyn Predictor>,
}

impl Model {
    /// Empty model backed by the [`ForwardPredictor`]
    pub fn new() -> Self {
        Self::with_predictor(ForwardPredictor)
    }

    pub fn with_predictor(predictor: impl Predictor + 'static) -> Self {
        Self {
            fit_model: RwLock::new(HashMap::new()),
            predictor: Box::new(predictor),
        }
    }

    /// Installs (or replaces) fitted parameters for `skill`.
    pub fn fit_skill(&self, skill: impl Into<String>, params: SkillParams) -> Result<()> {
        params.validate()?;
        let skill = skill.into();
        tracing::info!(skill = %skill, prior = params.prior, "Skill parameters installed");
        self.fit_model.write().insert(skill, params);
        Ok(())
    }

    pub fn remove_skill(&self, skill: &str) -> Option<SkillParams> {
        self.fit_model.write().remove(skill)
    }

    /// Snapshot of the fitted parameters for `skill`
    pub fn skill_params(&self, skill: &str) -> Option<SkillParams> {
        self.fit_model.read().get(skill).cloned()
    }

    pub fn is_fitted(&self, skill: &str) -> bool {
        self.fit_model.read().contains_key(skill)
    }

    pub fn skills(&self) -> Vec<String> {
        let mut skills: Vec<String> = self.fit_model.read().keys().cloned().collect();
        skills.sort();
        skills
    }

    pub fn predict(&self, params: &SkillParams, batch: &ObservationBatch) -> Result<Prediction> {
        self.predictor.predict(params, batch)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("skills", &self.skills())
            .finish_non_exhaustive()
    }
}
