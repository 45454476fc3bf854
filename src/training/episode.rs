use serde::Serialize;

use crate::ai::{Actor, Critic};
use crate::error::TrainingError;
use crate::game::{Action, Board, State};

/// One recorded step of an episode rollout.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Experience {
    pub state: State,
    pub action: Action,
    pub reward: f32,
    pub next_state: State,
}

/// Outcome of a single episode.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeTrace {
    pub steps: Vec<Experience>,
    pub pegs_remaining: usize,
    pub final_reward: f32,
}

/// Play one episode from the board's current occupancy to a terminal
/// state, learning after every move.
///
/// Each step: the actor picks a jump, the board applies it, the critic
/// computes one TD-error from the observed transition, and then every
/// step recorded so far (the fresh one included) is replayed under that
/// single TD-error signal: the critic refreshes its value estimates and
/// the actor nudges desirabilities by eligibility-weighted amounts,
/// decaying each pair's trace afterwards.
pub fn run_episode(
    board: &mut Board,
    actor: &mut Actor,
    critic: &mut dyn Critic,
) -> Result<EpisodeTrace, TrainingError> {
    actor.reset_eligibilities();
    critic.reset_eligibilities();
    let mut steps: Vec<Experience> = Vec::new();

    loop {
        let state = board.encode();
        let legal = board.legal_actions();
        let Some(action) = actor.select_action(state, &legal) else {
            break;
        };

        board.apply(action);
        let reward = board.reward();
        let next_state = board.encode();

        actor.record_visit((state, action));
        let td_error = critic.compute_td_error(reward, state, next_state);
        if !td_error.is_finite() {
            return Err(TrainingError::NonFiniteTdError(td_error));
        }
        critic.mark_visited(state);

        steps.push(Experience {
            state,
            action,
            reward,
            next_state,
        });

        for experience in &steps {
            critic.replay_step(experience.state, experience.reward, experience.next_state)?;
            let sap = (experience.state, experience.action);
            actor.update_policy(sap, td_error);
            actor.decay_eligibility(sap);
        }

        if !board.is_neutral() {
            break;
        }
    }

    Ok(EpisodeTrace {
        pegs_remaining: board.peg_count(),
        final_reward: board.reward(),
        steps,
    })
}
