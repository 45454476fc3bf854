use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::error::TrainingError;
use crate::game::State;

use super::{Critic, CriticConfig};

/// Unseen states start at a small positive random value rather than 0,
/// which breaks ties between fresh states and nudges early exploration.
const VALUE_INIT_RANGE: std::ops::Range<f32> = 0.0..0.1;

/// Value function as an explicit per-state table, with a per-state
/// eligibility trace following the same decay law as the actor's.
pub struct TabularCritic {
    learning_rate: f32,
    discount_factor: f32,
    trace_decay: f32,
    values: HashMap<State, f32>,
    eligibilities: HashMap<State, f32>,
    td_error: f32,
    rng: StdRng,
}

impl TabularCritic {
    pub fn new(config: &CriticConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    pub fn with_rng(config: &CriticConfig, rng: StdRng) -> Self {
        TabularCritic {
            learning_rate: config.learning_rate as f32,
            discount_factor: config.discount_factor,
            trace_decay: config.trace_decay,
            values: HashMap::new(),
            eligibilities: HashMap::new(),
            td_error: 0.0,
            rng,
        }
    }

    /// Eligibility of a state; 0 for states never visited.
    pub fn eligibility(&self, state: State) -> f32 {
        self.eligibilities.get(&state).copied().unwrap_or(0.0)
    }

    /// `value[state] += learning_rate * td_error * eligibility[state]`.
    fn update_value(&mut self, state: State) {
        let delta = self.learning_rate * self.td_error * self.eligibility(state);
        let current = self.value(state);
        self.values.insert(state, current + delta);
    }

    fn decay_eligibility(&mut self, state: State) {
        let decay = self.discount_factor * self.trace_decay;
        if let Some(e) = self.eligibilities.get_mut(&state) {
            *e *= decay;
        }
    }
}

impl Critic for TabularCritic {
    fn value(&mut self, state: State) -> f32 {
        let rng = &mut self.rng;
        *self
            .values
            .entry(state)
            .or_insert_with(|| rng.random_range(VALUE_INIT_RANGE))
    }

    fn discount_factor(&self) -> f32 {
        self.discount_factor
    }

    fn td_error(&self) -> f32 {
        self.td_error
    }

    fn cache_td_error(&mut self, td_error: f32) {
        self.td_error = td_error;
    }

    fn mark_visited(&mut self, state: State) {
        self.eligibilities.insert(state, 1.0);
    }

    fn replay_step(
        &mut self,
        state: State,
        _reward: f32,
        _next_state: State,
    ) -> Result<(), TrainingError> {
        self.update_value(state);
        self.decay_eligibility(state);
        Ok(())
    }

    fn reset_eligibilities(&mut self) {
        self.eligibilities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_critic(config: &CriticConfig) -> TabularCritic {
        TabularCritic::with_rng(config, StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_unseen_value_in_init_range() {
        let mut critic = seeded_critic(&CriticConfig::default());
        for bits in 0..20u64 {
            let v = critic.value(State::new(bits));
            assert!(VALUE_INIT_RANGE.contains(&v), "value {} out of range", v);
        }
    }

    #[test]
    fn test_value_stable_after_first_lookup() {
        let mut critic = seeded_critic(&CriticConfig::default());
        let state = State::new(0b1011);
        let first = critic.value(state);
        assert_eq!(critic.value(state), first);
    }

    #[test]
    fn test_td_error_formula() {
        let config = CriticConfig {
            discount_factor: 0.9,
            ..Default::default()
        };
        let mut critic = seeded_critic(&config);
        let s = State::new(0b01);
        let s_next = State::new(0b10);
        critic.values.insert(s, 2.0);
        critic.values.insert(s_next, 5.0);

        let td = critic.compute_td_error(10.0, s, s_next);
        let expected = 10.0 + 0.9 * 5.0 - 2.0;
        assert!((td - expected).abs() < 1e-6);
        assert_eq!(critic.td_error(), td);
    }

    #[test]
    fn test_state_eligibility_decay_law() {
        let config = CriticConfig {
            discount_factor: 0.9,
            trace_decay: 0.8,
            ..Default::default()
        };
        let mut critic = seeded_critic(&config);
        let state = State::new(0b111);

        critic.mark_visited(state);
        let per_step = 0.9f32 * 0.8;
        for k in 1..=4 {
            critic.decay_eligibility(state);
            assert!((critic.eligibility(state) - per_step.powi(k)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_replay_step_applies_value_update_then_decay() {
        let config = CriticConfig {
            learning_rate: 0.5,
            discount_factor: 1.0,
            trace_decay: 0.5,
            ..Default::default()
        };
        let mut critic = seeded_critic(&config);
        let state = State::new(0b11);
        critic.values.insert(state, 1.0);
        critic.mark_visited(state);
        critic.cache_td_error(2.0);

        critic.replay_step(state, 0.0, State::new(0b01)).unwrap();
        // value: 1.0 + 0.5 * 2.0 * 1.0; eligibility decayed afterwards
        assert!((critic.value(state) - 2.0).abs() < 1e-6);
        assert!((critic.eligibility(state) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_reset_eligibilities() {
        let mut critic = seeded_critic(&CriticConfig::default());
        let state = State::new(0b1);
        critic.mark_visited(state);
        critic.reset_eligibilities();
        assert_eq!(critic.eligibility(state), 0.0);
    }
}
