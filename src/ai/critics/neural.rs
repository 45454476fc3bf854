use crate::ai::networks::ValueNetworkConfig;
use crate::ai::split_gd::{FitOptions, SplitGd};
use crate::ai::state_encoding::encode_state;
use crate::error::TrainingError;
use crate::game::State;

use super::{Critic, CriticConfig};

/// Value function approximated by a feed-forward network, trained with the
/// gradient-eligibility update. Eligibility lives in parameter space inside
/// [`SplitGd`], so unlike the tabular critic there is no per-state trace to
/// maintain here.
pub struct NeuralCritic {
    gd: SplitGd,
    num_cells: usize,
    discount_factor: f32,
    td_error: f32,
}

impl NeuralCritic {
    pub fn new(config: &CriticConfig, num_cells: usize) -> Self {
        let net_config = ValueNetworkConfig::new(num_cells, config.hidden_sizes.clone());
        let options = FitOptions {
            epochs: config.epochs,
            minibatch_size: config.minibatch_size,
            validation_fraction: config.validation_fraction,
        };
        let gd = SplitGd::new(
            &net_config,
            config.learning_rate,
            config.discount_factor,
            config.trace_decay,
            options,
        );

        NeuralCritic {
            gd,
            num_cells,
            discount_factor: config.discount_factor,
            td_error: 0.0,
        }
    }
}

impl Critic for NeuralCritic {
    fn value(&mut self, state: State) -> f32 {
        self.gd.value(&encode_state(state, self.num_cells))
    }

    fn discount_factor(&self) -> f32 {
        self.discount_factor
    }

    fn td_error(&self) -> f32 {
        self.td_error
    }

    fn cache_td_error(&mut self, td_error: f32) {
        self.td_error = td_error;
        self.gd.set_td_error(td_error);
    }

    /// One training step toward the bootstrapped target
    /// `reward + gamma * V(next_state)`.
    fn replay_step(
        &mut self,
        state: State,
        reward: f32,
        next_state: State,
    ) -> Result<(), TrainingError> {
        let target = reward + self.discount_factor * self.value(next_state);
        let features = encode_state(state, self.num_cells);
        self.gd.fit(&[features], &[target])?;
        Ok(())
    }

    fn reset_eligibilities(&mut self) {
        self.gd.reset_traces();
    }
}
