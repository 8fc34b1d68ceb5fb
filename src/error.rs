use thiserror::Error;

use crate::types::StudentId;

pub type Result<T> = std::result::Result<T, BktError>;

#[derive(Debug, Error)]
pub enum BktError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("student not found: {0}")]
    StudentNotFound(StudentId),
    #[error("skill {0:?} has no fitted parameters")]
    SkillNotFitted(String),
    #[error("unknown resource label {label:?} for skill {skill:?}")]
    UnknownResource { skill: String, label: String },
    #[error("unknown category label {label:?} for skill {skill:?}")]
    UnknownCategory { skill: String, label: String },
    #[error("prediction failed: {0}")]
    Prediction(String),
}
