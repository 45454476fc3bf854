//! Critic variants. Both expose the TD-error contract; the episode loop
//! talks to them through the [`Critic`] trait and never needs to know
//! whether values live in a table or in network weights.

mod neural;
mod tabular;

pub use neural::NeuralCritic;
pub use tabular::TabularCritic;

use crate::error::TrainingError;
use crate::game::State;

/// Which value-function representation to train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticKind {
    Tabular,
    Approximate,
}

/// Critic hyperparameters, shared by both variants. The network fields are
/// ignored by the tabular critic.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CriticConfig {
    pub kind: CriticKind,
    pub learning_rate: f64,
    pub discount_factor: f32,
    pub trace_decay: f32,
    /// Hidden-layer widths of the value approximator.
    pub hidden_sizes: Vec<usize>,
    pub epochs: usize,
    pub minibatch_size: usize,
    /// Fraction of each training batch held out for validation loss.
    pub validation_fraction: f32,
}

impl Default for CriticConfig {
    fn default() -> Self {
        CriticConfig {
            kind: CriticKind::Tabular,
            learning_rate: 1e-3,
            discount_factor: 0.9,
            trace_decay: 0.9,
            hidden_sizes: vec![20, 30, 5],
            epochs: 1,
            minibatch_size: 1,
            validation_fraction: 0.0,
        }
    }
}

/// Shared critic contract. `compute_td_error` is the classic bootstrapped
/// difference `r + gamma * V(s') - V(s)`; the result is cached so dependent
/// updates within the same step see the same signal.
pub trait Critic {
    /// Predicted value of a state.
    fn value(&mut self, state: State) -> f32;

    fn discount_factor(&self) -> f32;

    /// Most recently computed TD-error.
    fn td_error(&self) -> f32;

    fn cache_td_error(&mut self, td_error: f32);

    fn compute_td_error(&mut self, reward: f32, state: State, next_state: State) -> f32 {
        let td_error = reward + self.discount_factor() * self.value(next_state) - self.value(state);
        self.cache_td_error(td_error);
        td_error
    }

    /// Called when a state is freshly visited. The tabular critic sets the
    /// state's eligibility to 1; the approximate critic carries eligibility
    /// in parameter space and has nothing to do here.
    fn mark_visited(&mut self, _state: State) {}

    /// One replayed value update for a recorded step: the tabular critic
    /// applies its eligibility-weighted value update and decays the trace,
    /// the approximate critic runs one gradient-eligibility training step
    /// toward `reward + gamma * V(next_state)`.
    fn replay_step(
        &mut self,
        state: State,
        reward: f32,
        next_state: State,
    ) -> Result<(), TrainingError>;

    /// Clear all eligibility state at the start of an episode.
    fn reset_eligibilities(&mut self);
}

/// Construct the configured critic variant for a board with `num_cells`
/// cells (the input width of the approximate critic's encoder).
pub fn build_critic(config: &CriticConfig, num_cells: usize) -> Box<dyn Critic> {
    match config.kind {
        CriticKind::Tabular => Box::new(TabularCritic::new(config)),
        CriticKind::Approximate => Box::new(NeuralCritic::new(config, num_cells)),
    }
}
