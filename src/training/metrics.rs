use std::collections::VecDeque;

/// Rolling training statistics over a bounded window of recent episodes.
pub struct TrainingMetrics {
    window_size: usize,
    pegs_remaining: VecDeque<usize>,
    rewards: VecDeque<f32>,
    total_episodes: usize,
    total_wins: usize,
}

impl TrainingMetrics {
    pub fn new(window_size: usize) -> Self {
        TrainingMetrics {
            window_size,
            pegs_remaining: VecDeque::with_capacity(window_size),
            rewards: VecDeque::with_capacity(window_size),
            total_episodes: 0,
            total_wins: 0,
        }
    }

    pub fn record_episode(&mut self, pegs_remaining: usize, final_reward: f32) {
        if self.pegs_remaining.len() == self.window_size {
            self.pegs_remaining.pop_front();
            self.rewards.pop_front();
        }
        self.pegs_remaining.push_back(pegs_remaining);
        self.rewards.push_back(final_reward);

        self.total_episodes += 1;
        if pegs_remaining == 1 {
            self.total_wins += 1;
        }
    }

    /// Fraction of episodes in the window that ended with a single peg.
    pub fn win_rate(&self) -> f32 {
        if self.pegs_remaining.is_empty() {
            return 0.0;
        }
        let wins = self.pegs_remaining.iter().filter(|&&p| p == 1).count();
        wins as f32 / self.pegs_remaining.len() as f32
    }

    pub fn average_pegs_remaining(&self) -> f32 {
        if self.pegs_remaining.is_empty() {
            return 0.0;
        }
        self.pegs_remaining.iter().sum::<usize>() as f32 / self.pegs_remaining.len() as f32
    }

    pub fn average_reward(&self) -> f32 {
        if self.rewards.is_empty() {
            return 0.0;
        }
        self.rewards.iter().sum::<f32>() / self.rewards.len() as f32
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_wins(&self) -> usize {
        self.total_wins
    }
}
