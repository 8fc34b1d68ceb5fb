//! Per-student mastery state
//!
//! A [`State`] pairs a continuous [`Belief`] with its [`StateType`]
//! classification. Updates resume inference from the stored belief: the
//! prediction runs on a copy of the skill parameters whose initial
//! distribution is `[1 - p, p]`, so the model's own parameters are left
//! exactly as they were.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BktError, Result};
use crate::model::{ObservationBatch, Prediction};
use crate::roster::SkillContext;
use crate::types::{is_probability, Belief, Correctness, StateType, UpdateOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    state_type: StateType,
    belief: Belief,
    history: Vec<Belief>,
}

impl State {
    /// Seeds the belief from the skill's fitted prior, or the sentinel belief
    /// when the skill has not been fitted. An untrained state is always
    /// `Default`, whatever `initial_state` says.
    pub fn new(initial_state: StateType, context: &SkillContext) -> Self {
        let (belief, state_type) = match context.model().skill_params(context.skill()) {
            Some(params) => (Belief::seeded(params.prior), initial_state),
            None => (Belief::untrained(), StateType::Default),
        };
        Self {
            state_type,
            belief,
            history: Vec::new(),
        }
    }

    pub fn state_type(&self) -> StateType {
        self.state_type
    }

    pub fn belief(&self) -> Belief {
        self.belief
    }

    pub fn mastery_probability(&self) -> f64 {
        self.belief.mastery_probability
    }

    pub fn correctness_estimate(&self) -> f64 {
        self.belief.correctness_estimate
    }

    pub fn history(&self) -> &[Belief] {
        &self.history
    }

    /// Feeds one observation (or a run of them) through the model and
    /// commits the resulting belief. On error nothing is changed.
    pub fn update(
        &mut self,
        context: &SkillContext,
        correctness: impl Into<Correctness>,
        options: &UpdateOptions,
    ) -> Result<()> {
        let observations = correctness.into().observations()?;
        let skill = context.skill();
        let params = context
            .model()
            .skill_params(skill)
            .ok_or_else(|| BktError::SkillNotFitted(skill.to_string()))?;

        let batch = ObservationBatch::for_update(skill, &params, &observations, options)?;

        let params = if self.belief.is_trained() {
            tracing::debug!(
                skill = %skill,
                prior = params.prior,
                resumed_from = self.belief.mastery_probability,
                "Resuming inference from stored belief"
            );
            params.resumed_from(self.belief.mastery_probability)
        } else {
            params
        };

        let prediction = context.model().predict(&params, &batch)?;
        let belief = extract_belief(&prediction)?;

        self.belief = belief;
        if context.track_progress() {
            self.history.push(belief);
        }
        self.reclassify(context);

        tracing::debug!(
            skill = %skill,
            observations = observations.len(),
            mastery = belief.mastery_probability,
            correctness = belief.correctness_estimate,
            state = %self.state_type,
            "State updated"
        );
        Ok(())
    }

    /// Re-applies the roster threshold to the stored mastery probability.
    pub fn reclassify(&mut self, context: &SkillContext) {
        self.state_type =
            StateType::classify(self.belief.mastery_probability, context.mastery_threshold());
    }

    /// Back to the sentinel belief and `Default`, with an empty history.
    pub(crate) fn reset(&mut self) {
        self.state_type = StateType::Default;
        self.belief = Belief::untrained();
        self.history.clear();
    }
}

/// The correctness estimate is aligned with the last real observation (the
/// column before the sentinel); the mastery probability is the belief
/// entering the next opportunity (the sentinel column).
fn extract_belief(prediction: &Prediction) -> Result<Belief> {
    let correct = &prediction.correct_predictions;
    let correctness_estimate = correct
        .len()
        .checked_sub(2)
        .map(|index| correct[index])
        .ok_or_else(|| {
            BktError::Prediction(format!("{} correctness predictions", correct.len()))
        })?;
    let mastery_probability = prediction
        .mastered()
        .last()
        .copied()
        .ok_or_else(|| BktError::Prediction("no state predictions".to_string()))?;

    if !is_probability(correctness_estimate) || !is_probability(mastery_probability) {
        return Err(BktError::Prediction(format!(
            "non-probability output: correctness {correctness_estimate}, mastery {mastery_probability}"
        )));
    }

    Ok(Belief {
        correctness_estimate,
        mastery_probability,
    })
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with mastery probability: {:.6} and correctness probability: {:.6}",
            self.state_type, self.belief.mastery_probability, self.belief.correctness_estimate
        )
    }
}
