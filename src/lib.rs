//! Actor-critic reinforcement learning for single-player peg solitaire.
//!
//! The actor keeps a table of state-action desirabilities; the critic
//! estimates state values either tabularly or with a small feed-forward
//! network trained by a gradient-eligibility update. Both learn from the
//! same TD-error signal, with eligibility traces spreading credit back
//! along each episode.

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
