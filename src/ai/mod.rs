pub mod actor;
pub mod critics;
pub mod networks;
pub mod split_gd;
pub mod state_encoding;

pub use actor::{Actor, ActorConfig};
pub use critics::{build_critic, Critic, CriticConfig, CriticKind};
