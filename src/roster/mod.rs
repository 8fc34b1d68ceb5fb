//! Student roster for one skill
//!
//! A [`Roster`] owns every [`State`] of one skill. The roster-level settings
//! a state reads during an update (skill, threshold, progress tracking and the
//! shared model) live in a [`SkillContext`] that the roster lends to its
//! states for the duration of each call.

pub mod config;
pub mod state;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::error::{BktError, Result};
use crate::model::Model;
use crate::types::{is_probability, Correctness, StateType, StudentId, UpdateOptions};

pub use config::RosterConfig;
pub use state::State;

/// Initial student population
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Population {
    /// `N` students with ids `1..=N`
    Count(usize),
    /// Explicit ids in insertion order
    Ids(Vec<StudentId>),
}

impl Population {
    fn into_ids(self) -> Result<Vec<StudentId>> {
        match self {
            Population::Count(0) => Err(BktError::InvalidArgument(
                "student count must be positive".to_string(),
            )),
            Population::Count(count) => Ok((1..=count).map(StudentId::from).collect()),
            Population::Ids(ids) => {
                let duplicate = {
                    let mut seen = HashSet::with_capacity(ids.len());
                    ids.iter().find(|id| !seen.insert(*id)).cloned()
                };
                match duplicate {
                    Some(duplicate) => Err(BktError::InvalidArgument(format!(
                        "duplicate student id {duplicate}"
                    ))),
                    None => Ok(ids),
                }
            }
        }
    }
}

impl From<usize> for Population {
    fn from(count: usize) -> Self {
        Population::Count(count)
    }
}

impl From<u32> for Population {
    fn from(count: u32) -> Self {
        Population::Count(count as usize)
    }
}

/// Negative counts become `Count(0)` and are rejected when the roster is built.
impl From<i32> for Population {
    fn from(count: i32) -> Self {
        Population::Count(usize::try_from(count).unwrap_or(0))
    }
}

impl<T: Into<StudentId>> From<Vec<T>> for Population {
    fn from(ids: Vec<T>) -> Self {
        Population::Ids(ids.into_iter().map(Into::into).collect())
    }
}

/// Roster-level settings shared by every state of a roster
#[derive(Debug, Clone)]
pub struct SkillContext {
    skill: String,
    mastery_threshold: f64,
    track_progress: bool,
    model: Arc<Model>,
}

impl SkillContext {
    pub fn new(skill: impl Into<String>, config: &RosterConfig, model: Arc<Model>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            skill: skill.into(),
            mastery_threshold: config.mastery_threshold,
            track_progress: config.track_progress,
            model,
        })
    }

    pub fn skill(&self) -> &str {
        &self.skill
    }

    pub fn mastery_threshold(&self) -> f64 {
        self.mastery_threshold
    }

    pub fn track_progress(&self) -> bool {
        self.track_progress
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }
}

#[derive(Debug)]
pub struct Roster {
    context: SkillContext,
    order: Vec<StudentId>,
    students: HashMap<StudentId, State>,
}

impl Roster {
    /// Builds a roster and registers `students`, each seeded from the model's
    /// current parameters for `skill`. Without a model a fresh [`Model`] is
    /// created.
    ///
    /// Duplicate ids in an explicit population are rejected.
    pub fn new(
        students: impl Into<Population>,
        skill: impl Into<String>,
        config: RosterConfig,
        model: Option<Arc<Model>>,
    ) -> Result<Self> {
        let model = model.unwrap_or_else(|| Arc::new(Model::new()));
        let context = SkillContext::new(skill, &config, model)?;
        let ids = students.into().into_ids()?;

        let mut roster = Self {
            context,
            order: Vec::with_capacity(ids.len()),
            students: HashMap::with_capacity(ids.len()),
        };
        roster.add_students(ids);

        tracing::info!(
            skill = %roster.context.skill,
            students = roster.len(),
            mastery_threshold = roster.context.mastery_threshold,
            track_progress = roster.context.track_progress,
            fitted = roster.context.model.is_fitted(&roster.context.skill),
            "Roster created"
        );
        Ok(roster)
    }

    // ==================== Students ====================

    /// Registers `id` with a freshly seeded state, replacing any existing one.
    pub fn add_student(&mut self, id: impl Into<StudentId>, initial_state: StateType) {
        let id = id.into();
        let state = State::new(initial_state, &self.context);
        if self.students.insert(id.clone(), state).is_none() {
            self.order.push(id);
        } else {
            tracing::debug!(student = %id, "Replaced existing student state");
        }
    }

    /// Registers every id with the `Default` classification.
    pub fn add_students<I, T>(&mut self, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<StudentId>,
    {
        for id in ids {
            self.add_student(id, StateType::Default);
        }
    }

    /// Registers `ids[i]` with `initial_states[i]`.
    pub fn add_students_with<T: Into<StudentId>>(
        &mut self,
        ids: Vec<T>,
        initial_states: Vec<StateType>,
    ) -> Result<()> {
        if ids.len() != initial_states.len() {
            return Err(BktError::InvalidArgument(format!(
                "{} initial states for {} students",
                initial_states.len(),
                ids.len()
            )));
        }
        for (id, initial_state) in ids.into_iter().zip(initial_states) {
            self.add_student(id, initial_state);
        }
        Ok(())
    }

    pub fn remove_student(&mut self, id: &StudentId) -> Result<State> {
        let state = self
            .students
            .remove(id)
            .ok_or_else(|| BktError::StudentNotFound(id.clone()))?;
        self.order.retain(|registered| registered != id);
        Ok(state)
    }

    /// Removes every id, or none of them if any id is not registered.
    pub fn remove_students(&mut self, ids: &[StudentId]) -> Result<()> {
        self.check_registered(ids.iter())?;
        for id in ids {
            self.remove_student(id)?;
        }
        Ok(())
    }

    pub fn contains(&self, id: &StudentId) -> bool {
        self.students.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    // ==================== States ====================

    /// Returns the student to the sentinel belief and `Default`, keeping its
    /// registration.
    pub fn reset_state(&mut self, id: &StudentId) -> Result<()> {
        self.state_mut(id)?.reset();
        tracing::debug!(student = %id, "State reset");
        Ok(())
    }

    pub fn reset_states(&mut self) {
        for state in self.students.values_mut() {
            state.reset();
        }
    }

    pub fn get_state(&self, id: &StudentId) -> Result<&State> {
        self.students
            .get(id)
            .ok_or_else(|| BktError::StudentNotFound(id.clone()))
    }

    /// All states in registration order
    pub fn get_states(&self) -> impl Iterator<Item = (&StudentId, &State)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.students.get(id).map(|state| (id, state)))
    }

    pub fn update_state(
        &mut self,
        id: &StudentId,
        correctness: impl Into<Correctness>,
        options: &UpdateOptions,
    ) -> Result<&State> {
        let state = self
            .students
            .get_mut(id)
            .ok_or_else(|| BktError::StudentNotFound(id.clone()))?;
        if let Err(err) = state.update(&self.context, correctness, options) {
            tracing::warn!(student = %id, skill = %self.context.skill, error = %err, "State update failed");
            return Err(err);
        }
        Ok(state)
    }

    /// Applies one update per entry. Every id is checked before any state
    /// changes; an update error stops the batch, keeping earlier updates.
    pub fn update_states<I, T, C>(
        &mut self,
        corrects: I,
        options: &UpdateOptions,
    ) -> Result<impl Iterator<Item = (&StudentId, &State)> + '_>
    where
        I: IntoIterator<Item = (T, C)>,
        T: Into<StudentId>,
        C: Into<Correctness>,
    {
        let corrects: Vec<(StudentId, Correctness)> = corrects
            .into_iter()
            .map(|(id, correctness)| (id.into(), correctness.into()))
            .collect();
        self.check_registered(corrects.iter().map(|(id, _)| id))?;

        for (id, correctness) in corrects {
            self.update_state(&id, correctness, options)?;
        }
        Ok(self.get_states())
    }

    // ==================== Settings ====================

    pub fn skill(&self) -> &str {
        &self.context.skill
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.context.model
    }

    /// Swaps the shared model. Existing beliefs are kept.
    pub fn set_model(&mut self, model: Arc<Model>) {
        self.context.model = model;
        tracing::info!(skill = %self.context.skill, "Roster model replaced");
    }

    pub fn mastery_threshold(&self) -> f64 {
        self.context.mastery_threshold
    }

    /// Stores the threshold and reclassifies every student from its stored
    /// mastery probability. No predictions are run.
    pub fn set_mastery_threshold(&mut self, mastery_threshold: f64) -> Result<()> {
        if !is_probability(mastery_threshold) {
            return Err(BktError::InvalidArgument(format!(
                "mastery threshold {mastery_threshold} is not a probability"
            )));
        }
        self.context.mastery_threshold = mastery_threshold;
        for state in self.students.values_mut() {
            state.reclassify(&self.context);
        }
        tracing::info!(
            skill = %self.context.skill,
            mastery_threshold,
            "Mastery threshold changed"
        );
        Ok(())
    }

    pub fn track_progress(&self) -> bool {
        self.context.track_progress
    }

    pub fn set_track_progress(&mut self, track_progress: bool) {
        self.context.track_progress = track_progress;
    }

    pub fn context(&self) -> &SkillContext {
        &self.context
    }

    fn state_mut(&mut self, id: &StudentId) -> Result<&mut State> {
        self.students
            .get_mut(id)
            .ok_or_else(|| BktError::StudentNotFound(id.clone()))
    }

    fn check_registered<'a>(&self, mut ids: impl Iterator<Item = &'a StudentId>) -> Result<()> {
        match ids.find(|id| !self.students.contains_key(*id)) {
            Some(missing) => Err(BktError::StudentNotFound(missing.clone())),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Roster({}, {:?}, {}, {}, {:?})",
            self.len(),
            self.context.skill,
            self.context.mastery_threshold,
            self.context.track_progress,
            self.context.model
        )
    }
}
