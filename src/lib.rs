//! # danci-bkt - Bayesian Knowledge Tracing rosters
//!
//! Tracks, per student and per skill, a continuously updated mastery
//! probability under a two-state BKT model, and classifies every student as
//! `Default`, `Unmastered` or `Mastered` as new correctness observations
//! arrive.
//!
//! ## Modules
//!
//! - [`model`] - fitted skill parameters, the observation batch wire format and
//!   the prediction seam ([`Predictor`]) with a forward-filter default
//! - [`roster`] - the per-skill student registry and the per-student state
//!   automaton
//! - [`types`] - shared constants and plain data types
//! - [`error`] - crate error type
//! - [`logging`] - `tracing` subscriber setup for hosts and tests
//!
//! ## Incremental updates
//!
//! Each [`State::update`] resumes inference from the student's own last
//! belief. The model's shared parameters are never written: the update takes
//! a snapshot of the skill parameters, substitutes the student's belief for
//! the population prior in that snapshot, and hands it to the predictor.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use danci_bkt::{Model, Population, Roster, RosterConfig, SkillParams, StateType, UpdateOptions};
//!
//! let model = Arc::new(Model::new());
//! model.fit_skill("fractions", SkillParams::new(0.3, 0.2, 0.1, 0.1)).unwrap();
//!
//! let mut roster = Roster::new(
//!     Population::Count(3),
//!     "fractions",
//!     RosterConfig::default(),
//!     Some(model),
//! )
//! .unwrap();
//!
//! let state = roster.update_state(&1.into(), vec![1, 1], &UpdateOptions::default()).unwrap();
//! assert_eq!(state.state_type(), StateType::Mastered);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod error;
pub mod logging;
pub mod model;
pub mod roster;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{BktError, Result};

pub use types::*;

pub use model::{ForwardPredictor, Model, ObservationBatch, Prediction, Predictor, SkillParams};

pub use roster::{Population, Roster, RosterConfig, SkillContext, State};
