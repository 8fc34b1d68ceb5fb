//! Forward-filter BKT prediction
//!
//! For every column `t` of a segment:
//! - `P(correct_t) = (1 - p_t) * guess + p_t * (1 - slip)`
//! - condition on the observation at `t`, if any (Bayes rule)
//! - `p_{t+1} = p'_t * (1 - forget) + (1 - p'_t) * learn`
//!
//! `p_t` is the belief entering column `t`, so the sentinel column of an
//! update batch carries the belief entering the next opportunity.

use crate::error::{BktError, Result};
use crate::model::batch::ObservationBatch;
use crate::model::params::SkillParams;
use crate::model::{Prediction, Predictor};
use crate::types::EPSILON;

const INCORRECT_CODE: u8 = 1;
const CORRECT_CODE: u8 = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardPredictor;

impl Predictor for ForwardPredictor {
    fn predict(&self, params: &SkillParams, batch: &ObservationBatch) -> Result<Prediction> {
        let total = batch.len();
        if batch.data.iter().any(|row| row.len() != total) {
            return Err(BktError::Prediction("ragged observation rows".to_string()));
        }
        if batch.resources.len() != total {
            return Err(BktError::Prediction(format!(
                "{} resources for {total} observations",
                batch.resources.len()
            )));
        }
        if batch.data.len() > params.num_categories() {
            return Err(BktError::Prediction(format!(
                "{} category rows for {} fitted categories",
                batch.data.len(),
                params.num_categories()
            )));
        }

        let mut correct = vec![0.0; total];
        let mut mastered = vec![0.0; total];

        for (&start, &length) in batch.starts.iter().zip(&batch.lengths) {
            let begin = start
                .checked_sub(1)
                .ok_or_else(|| BktError::Prediction("segment starts are 1-based".to_string()))?;
            let end = match begin.checked_add(length) {
                Some(end) if end <= total => end,
                _ => {
                    return Err(BktError::Prediction(format!(
                        "segment {start}+{length} exceeds {total} observations"
                    )))
                }
            };

            let mut p = params.initial_distribution[1];
            for t in begin..end {
                mastered[t] = p;

                let (row, code) = match batch.observation_at(t) {
                    Some((row, code)) => (row, Some(code)),
                    None => (0, None),
                };
                let guess = params.guesses[row];
                let slip = params.slips[row];
                correct[t] = ((1.0 - p) * guess + p * (1.0 - slip)).clamp(0.0, 1.0);

                let (like_mastered, like_unmastered) = match code {
                    Some(CORRECT_CODE) => (1.0 - slip, guess),
                    Some(INCORRECT_CODE) => (slip, 1.0 - guess),
                    Some(other) => {
                        return Err(BktError::Prediction(format!(
                            "unknown observation code {other} at column {t}"
                        )))
                    }
                    None => (1.0, 1.0),
                };
                let evidence = p * like_mastered + (1.0 - p) * like_unmastered;
                if evidence > EPSILON {
                    p = p * like_mastered / evidence;
                }

                let resource = batch.resources[t];
                let index = resource
                    .checked_sub(1)
                    .filter(|&index| index < params.num_resources())
                    .ok_or_else(|| {
                        BktError::Prediction(format!("unknown resource id {resource}"))
                    })?;
                let learn = params.learns[index];
                let forget = params.forgets[index];
                p = (p * (1.0 - forget) + (1.0 - p) * learn).clamp(0.0, 1.0);
            }
        }

        let unmastered = mastered.iter().map(|p| 1.0 - p).collect();
        Ok(Prediction {
            correct_predictions: correct,
            state_predictions: [unmastered, mastered],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UpdateOptions;

    fn batch(params: &SkillParams, observations: &[u8]) -> ObservationBatch {
        ObservationBatch::for_update("skill", params, observations, &UpdateOptions::default())
            .unwrap()
    }

    #[test]
    fn typical_answer_correct() {
        let params = SkillParams::new(0.3, 0.2, 0.1, 0.1);
        let prediction = ForwardPredictor.predict(&params, &batch(&params, &[1])).unwrap();
        assert!((prediction.correct_predictions[0] - 0.34).abs() < 1e-9);
        assert!((prediction.mastered()[1] - 0.835).abs() < 0.001);
        assert_eq!(prediction.mastered()[0], 0.3);
    }

    #[test]
    fn typical_answer_incorrect() {
        let params = SkillParams::new(0.3, 0.2, 0.1, 0.1);
        let prediction = ForwardPredictor.predict(&params, &batch(&params, &[0])).unwrap();
        assert!((prediction.mastered()[1] - 0.236).abs() < 0.001);
    }

    #[test]
    fn no_guess_answer_correct() {
        let params = SkillParams::new(0.5, 0.5, 0.0, 0.1);
        let prediction = ForwardPredictor.predict(&params, &batch(&params, &[1])).unwrap();
        assert!((prediction.mastered()[1] - 1.0).abs() < 0.001);
    }

    #[test]
    fn state_rows_are_complementary() {
        let params = SkillParams::new(0.3, 0.2, 0.1, 0.1);
        let prediction = ForwardPredictor
            .predict(&params, &batch(&params, &[1, 0, 1, 1]))
            .unwrap();
        for (u, m) in prediction.state_predictions[0]
            .iter()
            .zip(&prediction.state_predictions[1])
        {
            assert!((u + m - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn forgetting_pulls_belief_down() {
        let params = SkillParams::new(0.9, 0.0, 0.2, 0.1).with_forget(0.5);
        let prediction = ForwardPredictor.predict(&params, &batch(&params, &[1])).unwrap();
        assert!(prediction.mastered()[1] < 0.6);
    }

    #[test]
    fn rejects_unknown_resource() {
        let params = SkillParams::new(0.3, 0.2, 0.1, 0.1);
        let mut bad = batch(&params, &[1]);
        bad.resources = vec![3, 3];
        assert!(matches!(
            ForwardPredictor.predict(&params, &bad),
            Err(BktError::Prediction(_))
        ));
    }

    #[test]
    fn oversized_segment_is_an_error() {
        let params = SkillParams::new(0.3, 0.2, 0.1, 0.1);
        let mut bad = batch(&params, &[1]);
        bad.lengths = vec![usize::MAX];
        assert!(matches!(
            ForwardPredictor.predict(&params, &bad),
            Err(BktError::Prediction(_))
        ));
    }
}
