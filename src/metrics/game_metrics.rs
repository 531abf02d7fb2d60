use std::time::{Duration, Instant};

/// Per-process play statistics; nothing here outlives the session
pub struct GameMetrics {
    running_since: Option<Instant>,
    banked: Duration,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            running_since: None,
            banked: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            high_score: 0,
            games_played: 0,
        }
    }

    pub fn update(&mut self) {
        let live = self
            .running_since
            .map(|since| since.elapsed())
            .unwrap_or_default();
        self.elapsed_time = self.banked + live;
    }

    pub fn is_clock_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn on_game_start(&mut self) {
        self.banked = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
        self.running_since = Some(Instant::now());
    }

    pub fn on_pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += since.elapsed();
        }
        self.update();
    }

    pub fn on_resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.on_pause();
        self.games_played += 1;
        if final_score > self.high_score {
            self.high_score = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
