use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::game::{Action, Sap, State};

/// Actor hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub learning_rate: f32,
    pub discount_factor: f32,
    pub trace_decay: f32,
    pub epsilon_start: f32,
    /// Multiplicative per-episode decay of the exploration rate.
    pub epsilon_decay: f32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        ActorConfig {
            learning_rate: 0.7,
            discount_factor: 0.9,
            trace_decay: 0.9,
            epsilon_start: 1.0,
            epsilon_decay: 0.98,
        }
    }
}

/// The policy half of the actor-critic pair: a lazily grown desirability
/// map over state-action pairs, a decaying eligibility trace over the same
/// keys, and an annealed exploration rate.
pub struct Actor {
    config: ActorConfig,
    epsilon: f32,
    policy: HashMap<Sap, f32>,
    eligibilities: HashMap<Sap, f32>,
    rng: StdRng,
}

impl Actor {
    pub fn new(config: &ActorConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    pub fn with_rng(config: &ActorConfig, rng: StdRng) -> Self {
        Actor {
            epsilon: config.epsilon_start,
            config: config.clone(),
            policy: HashMap::new(),
            eligibilities: HashMap::new(),
            rng,
        }
    }

    /// Desirability of a state-action pair; 0 for pairs never updated.
    pub fn policy_value(&self, sap: Sap) -> f32 {
        self.policy.get(&sap).copied().unwrap_or(0.0)
    }

    /// Eligibility of a state-action pair; 0 for pairs never visited.
    pub fn eligibility(&self, sap: Sap) -> f32 {
        self.eligibilities.get(&sap).copied().unwrap_or(0.0)
    }

    /// Pick an action for `state`. `None` when no action is legal, which
    /// signals a terminal state upstream. With probability epsilon the
    /// choice is uniformly random; otherwise the highest-desirability
    /// action wins, ties resolving to the first encountered. When every
    /// candidate is equally desirable the choice is uniform as well.
    pub fn select_action(&mut self, state: State, legal: &[Action]) -> Option<Action> {
        if legal.is_empty() {
            return None;
        }

        if self.rng.random_range(0.0..1.0) < self.epsilon {
            return Some(legal[self.rng.random_range(0..legal.len())]);
        }

        let first = self.policy_value((state, legal[0]));
        let mut best = legal[0];
        let mut best_value = first;
        let mut all_equal = true;
        for &action in &legal[1..] {
            let value = self.policy_value((state, action));
            if value != first {
                all_equal = false;
            }
            if value > best_value {
                best = action;
                best_value = value;
            }
        }

        if all_equal {
            // Degenerate case: nothing distinguishes the candidates.
            return Some(legal[self.rng.random_range(0..legal.len())]);
        }
        Some(best)
    }

    /// Mark a pair as freshly visited: eligibility becomes exactly 1.
    /// A revisit resets the trace, it does not accumulate.
    pub fn record_visit(&mut self, sap: Sap) {
        self.eligibilities.insert(sap, 1.0);
    }

    /// Decay one pair's eligibility by discount x trace-decay.
    pub fn decay_eligibility(&mut self, sap: Sap) {
        let decay = self.config.discount_factor * self.config.trace_decay;
        if let Some(e) = self.eligibilities.get_mut(&sap) {
            *e *= decay;
        }
    }

    /// `policy[sap] += learning_rate * td_error * eligibility[sap]`.
    pub fn update_policy(&mut self, sap: Sap, td_error: f32) {
        let delta = self.config.learning_rate * td_error * self.eligibility(sap);
        *self.policy.entry(sap).or_insert(0.0) += delta;
    }

    /// Clear the eligibility map at the start of an episode.
    pub fn reset_eligibilities(&mut self) {
        self.eligibilities.clear();
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Anneal the exploration rate by the configured factor.
    pub fn decay_epsilon(&mut self) {
        self.epsilon *= self.config.epsilon_decay;
    }

    /// Force the exploration rate, e.g. to 0 for the final greedy episode.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_actor(config: &ActorConfig) -> Actor {
        Actor::with_rng(config, StdRng::seed_from_u64(7))
    }

    fn action(mover: usize, jumped: usize, landing: usize) -> Action {
        Action {
            mover,
            jumped,
            landing,
        }
    }

    #[test]
    fn test_select_action_none_when_no_legal_actions() {
        let mut actor = seeded_actor(&ActorConfig::default());
        assert_eq!(actor.select_action(State::new(0b111), &[]), None);
    }

    #[test]
    fn test_select_action_greedy_argmax() {
        let config = ActorConfig::default();
        let mut actor = seeded_actor(&config);
        actor.set_epsilon(0.0);

        let state = State::new(0b10110);
        let legal = [action(0, 1, 2), action(3, 4, 5), action(2, 1, 0)];
        actor.record_visit((state, legal[1]));
        actor.update_policy((state, legal[1]), 2.0);

        for _ in 0..20 {
            assert_eq!(actor.select_action(state, &legal), Some(legal[1]));
        }
    }

    #[test]
    fn test_select_action_all_equal_stays_legal() {
        let mut actor = seeded_actor(&ActorConfig::default());
        actor.set_epsilon(0.0);
        let legal = [action(0, 1, 2), action(3, 4, 5)];
        for _ in 0..20 {
            let chosen = actor.select_action(State::new(1), &legal).unwrap();
            assert!(legal.contains(&chosen));
        }
    }

    #[test]
    fn test_eligibility_decay_law() {
        let config = ActorConfig {
            discount_factor: 0.9,
            trace_decay: 0.8,
            ..Default::default()
        };
        let mut actor = seeded_actor(&config);
        let sap = (State::new(0b11), action(0, 1, 2));

        actor.record_visit(sap);
        assert_eq!(actor.eligibility(sap), 1.0);

        let per_step = 0.9f32 * 0.8;
        for k in 1..=5 {
            actor.decay_eligibility(sap);
            let expected = per_step.powi(k);
            assert!((actor.eligibility(sap) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_revisit_resets_eligibility() {
        let mut actor = seeded_actor(&ActorConfig::default());
        let sap = (State::new(0b1), action(0, 1, 2));
        actor.record_visit(sap);
        actor.decay_eligibility(sap);
        actor.record_visit(sap);
        assert_eq!(actor.eligibility(sap), 1.0);
    }

    #[test]
    fn test_policy_update_linearity() {
        let config = ActorConfig {
            learning_rate: 0.5,
            ..Default::default()
        };
        let mut actor = seeded_actor(&config);
        let sap = (State::new(0b101), action(2, 1, 0));

        actor.record_visit(sap);
        actor.decay_eligibility(sap);
        let eligibility = actor.eligibility(sap);
        let before = actor.policy_value(sap);

        let td_error = -3.0;
        actor.update_policy(sap, td_error);
        let expected = before + 0.5 * td_error * eligibility;
        assert!((actor.policy_value(sap) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_update_without_visit_is_noop() {
        let mut actor = seeded_actor(&ActorConfig::default());
        let sap = (State::new(0b1), action(0, 1, 2));
        actor.update_policy(sap, 100.0);
        assert_eq!(actor.policy_value(sap), 0.0);
    }

    #[test]
    fn test_reset_eligibilities_clears() {
        let mut actor = seeded_actor(&ActorConfig::default());
        let sap = (State::new(0b1), action(0, 1, 2));
        actor.record_visit(sap);
        actor.reset_eligibilities();
        assert_eq!(actor.eligibility(sap), 0.0);
    }

    #[test]
    fn test_epsilon_decay_monotone() {
        let config = ActorConfig {
            epsilon_start: 1.0,
            epsilon_decay: 0.9,
            ..Default::default()
        };
        let mut actor = seeded_actor(&config);
        let mut previous = actor.epsilon();
        for _ in 0..50 {
            actor.decay_epsilon();
            assert!(actor.epsilon() <= previous);
            previous = actor.epsilon();
        }
        actor.set_epsilon(0.0);
        assert_eq!(actor.epsilon(), 0.0);
    }
}
