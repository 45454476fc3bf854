use serde::Serialize;

use crate::ai::{Actor, Critic};
use crate::error::TrainingError;
use crate::game::Board;

use super::episode::{run_episode, EpisodeTrace};
use super::metrics::TrainingMetrics;

const METRICS_WINDOW: usize = 50;

/// Training-run parameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    /// Progress is logged and sampled every this many episodes.
    pub log_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 200,
            log_interval: 10,
        }
    }
}

/// Windowed statistics sampled during the run.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressPoint {
    pub episode: usize,
    pub epsilon: f32,
    pub win_rate: f32,
    pub average_pegs_remaining: f32,
    pub average_reward: f32,
}

/// Summary of a completed training run. `learning_curve` holds the pegs
/// remaining after every episode in order; `final_trace` is the concluding
/// greedy episode played with exploration forced off. Downstream
/// visualization consumes those two sequences.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub episodes: usize,
    pub total_wins: usize,
    pub learning_curve: Vec<usize>,
    pub progress: Vec<ProgressPoint>,
    pub final_trace: EpisodeTrace,
}

/// Drives repeated episodes over one board, annealing exploration between
/// them and collecting rolling statistics.
pub struct Trainer {
    config: TrainerConfig,
    metrics: TrainingMetrics,
}

impl Trainer {
    pub fn new(config: &TrainerConfig) -> Self {
        Trainer {
            config: config.clone(),
            metrics: TrainingMetrics::new(METRICS_WINDOW),
        }
    }

    /// Run the configured number of episodes. The final episode is played
    /// greedily (epsilon forced to 0) and returned in full in the report.
    pub fn train(
        &mut self,
        board: &mut Board,
        actor: &mut Actor,
        critic: &mut dyn Critic,
    ) -> Result<TrainingReport, TrainingError> {
        let mut learning_curve = Vec::with_capacity(self.config.num_episodes);
        let mut progress = Vec::new();
        let mut final_trace = None;

        for episode in 1..=self.config.num_episodes {
            if episode == self.config.num_episodes {
                actor.set_epsilon(0.0);
            }

            board.reset();
            let trace = run_episode(board, actor, critic)?;
            learning_curve.push(trace.pegs_remaining);
            self.metrics.record_episode(trace.pegs_remaining, trace.final_reward);

            if episode % self.config.log_interval == 0 || episode == self.config.num_episodes {
                let point = ProgressPoint {
                    episode,
                    epsilon: actor.epsilon(),
                    win_rate: self.metrics.win_rate(),
                    average_pegs_remaining: self.metrics.average_pegs_remaining(),
                    average_reward: self.metrics.average_reward(),
                };
                log::info!(
                    "episode {}/{}: epsilon {:.3}, win rate {:.2}, avg pegs left {:.2}",
                    point.episode,
                    self.config.num_episodes,
                    point.epsilon,
                    point.win_rate,
                    point.average_pegs_remaining,
                );
                progress.push(point);
            }

            actor.decay_epsilon();
            final_trace = Some(trace);
        }

        let final_trace = final_trace.ok_or(TrainingError::NoEpisodes)?;
        log::info!(
            "training finished: {} wins over {} episodes, greedy run left {} pegs",
            self.metrics.total_wins(),
            self.metrics.total_episodes(),
            final_trace.pegs_remaining,
        );

        Ok(TrainingReport {
            episodes: self.config.num_episodes,
            total_wins: self.metrics.total_wins(),
            learning_curve,
            progress,
            final_trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::critics::{build_critic, CriticConfig};
    use crate::ai::ActorConfig;
    use crate::game::{BoardConfig, BoardShape};

    fn small_board() -> Board {
        Board::build(BoardShape::Triangular, 4, &[(1, 0)]).unwrap()
    }

    #[test]
    fn test_train_produces_report() {
        let mut board = small_board();
        let mut actor = Actor::new(&ActorConfig::default());
        let mut critic = build_critic(&CriticConfig::default(), board.num_cells());
        let config = TrainerConfig {
            num_episodes: 20,
            log_interval: 5,
        };

        let report = Trainer::new(&config)
            .train(&mut board, &mut actor, critic.as_mut())
            .unwrap();
        assert_eq!(report.episodes, 20);
        assert_eq!(report.learning_curve.len(), 20);
        assert!(!report.progress.is_empty());
        assert!(!report.final_trace.steps.is_empty());
        assert_eq!(
            *report.learning_curve.last().unwrap(),
            report.final_trace.pegs_remaining
        );
    }

    #[test]
    fn test_final_episode_is_greedy() {
        let mut board = small_board();
        let mut actor = Actor::new(&ActorConfig::default());
        let mut critic = build_critic(&CriticConfig::default(), board.num_cells());
        let config = TrainerConfig {
            num_episodes: 5,
            log_interval: 1,
        };

        Trainer::new(&config)
            .train(&mut board, &mut actor, critic.as_mut())
            .unwrap();
        // Epsilon was forced to 0 for the last episode; the decay applied
        // afterwards keeps it there.
        assert_eq!(actor.epsilon(), 0.0);
    }

    #[test]
    fn test_progress_sampled_at_interval() {
        let mut board = small_board();
        let mut actor = Actor::new(&ActorConfig::default());
        let mut critic = build_critic(&CriticConfig::default(), board.num_cells());
        let config = TrainerConfig {
            num_episodes: 10,
            log_interval: 3,
        };

        let report = Trainer::new(&config)
            .train(&mut board, &mut actor, critic.as_mut())
            .unwrap();
        let episodes: Vec<usize> = report.progress.iter().map(|p| p.episode).collect();
        assert_eq!(episodes, vec![3, 6, 9, 10]);
    }

    #[test]
    fn test_board_reset_between_episodes() {
        let mut board = small_board();
        let initial = board.encode();
        let mut actor = Actor::new(&ActorConfig::default());
        let mut critic = build_critic(&CriticConfig::default(), board.num_cells());
        let config = TrainerConfig {
            num_episodes: 3,
            log_interval: 1,
        };

        let report = Trainer::new(&config)
            .train(&mut board, &mut actor, critic.as_mut())
            .unwrap();
        assert_eq!(report.final_trace.steps[0].state, initial);
    }
}
