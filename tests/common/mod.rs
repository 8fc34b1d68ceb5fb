#![allow(dead_code)]

use std::sync::Arc;

use danci_bkt::{
    BktError, ForwardPredictor, Model, ObservationBatch, Prediction, Predictor, Result,
    SkillParams,
};
use parking_lot::Mutex;

pub const SKILL: &str = "fractions";

/// Forward predictor that remembers every call it served.
#[derive(Clone, Default)]
pub struct RecordingPredictor {
    pub calls: Arc<Mutex<Vec<(SkillParams, ObservationBatch)>>>,
}

impl Predictor for RecordingPredictor {
    fn predict(&self, params: &SkillParams, batch: &ObservationBatch) -> Result<Prediction> {
        self.calls.lock().push((params.clone(), batch.clone()));
        ForwardPredictor.predict(params, batch)
    }
}

pub struct FailingPredictor;

impl Predictor for FailingPredictor {
    fn predict(&self, _: &SkillParams, _: &ObservationBatch) -> Result<Prediction> {
        Err(BktError::Prediction("backend unavailable".to_string()))
    }
}

/// Returns the same mastery probability for every column.
pub struct FixedPredictor(pub f64);

impl Predictor for FixedPredictor {
    fn predict(&self, _: &SkillParams, batch: &ObservationBatch) -> Result<Prediction> {
        let len = batch.len();
        Ok(Prediction {
            correct_predictions: vec![0.9; len],
            state_predictions: [vec![1.0 - self.0; len], vec![self.0; len]],
        })
    }
}

pub fn fractions_params() -> SkillParams {
    SkillParams::new(0.3, 0.2, 0.1, 0.1)
}

pub fn fitted_model() -> Arc<Model> {
    let model = Model::new();
    model
        .fit_skill(SKILL, fractions_params())
        .expect("valid parameters");
    Arc::new(model)
}

pub fn recording_model() -> (Arc<Model>, RecordingPredictor) {
    let recorder = RecordingPredictor::default();
    let model = Model::with_predictor(recorder.clone());
    model
        .fit_skill(SKILL, fractions_params())
        .expect("valid parameters");
    (Arc::new(model), recorder)
}
