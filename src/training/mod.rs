mod episode;
mod metrics;
mod trainer;

pub use episode::{run_episode, EpisodeTrace, Experience};
pub use metrics::TrainingMetrics;
pub use trainer::{ProgressPoint, Trainer, TrainerConfig, TrainingReport};
