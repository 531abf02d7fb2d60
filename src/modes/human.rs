use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use rand::{Rng, rngs::StdRng};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use super::terminal::{TerminalSession, TuiTerminal};
use crate::game::{GameConfig, GameEngine, GameEvent, GameState, Phase};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Render at 30 FPS (33ms per frame)
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

pub struct HumanMode<R = StdRng> {
    engine: GameEngine<R>,
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl HumanMode<StdRng> {
    pub fn new(config: GameConfig, seed: Option<u64>) -> Self {
        let engine = match seed {
            Some(seed) => GameEngine::seeded(config, seed),
            None => GameEngine::new(config),
        };
        Self::with_engine(engine)
    }
}

impl<R: Rng> HumanMode<R> {
    pub fn with_engine(engine: GameEngine<R>) -> Self {
        let state = engine.initial_state();

        Self {
            engine,
            state,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut session = TerminalSession::enter()?;
        info!(
            width = self.state.grid_width,
            height = self.state.grid_height,
            "terminal ready"
        );

        // The session restores the terminal when it drops, error or not
        self.run_game_loop(session.terminal()).await
    }

    async fn run_game_loop(&mut self, terminal: &mut TuiTerminal) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.engine.config().tick_interval());
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut render_timer = interval(RENDER_INTERVAL);
        render_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                _ = tick_timer.tick() => {
                    self.apply(GameEvent::Tick);
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &self.metrics);
                    }).context("Failed to draw frame")?;
                }
            }

            if self.should_quit {
                info!(
                    games_played = self.metrics.games_played,
                    high_score = self.metrics.high_score,
                    "quitting"
                );
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            match self.input_handler.handle_key_event(key) {
                KeyAction::GameAction(game_event) => self.apply(game_event),
                KeyAction::Quit => self.should_quit = true,
                KeyAction::None => {}
            }
        }
    }

    /// Feed one event through the engine and keep the session stats in step
    fn apply(&mut self, event: GameEvent) {
        let before = self.state.phase;
        let before_score = self.state.score;

        self.state = self.engine.transition(self.state.clone(), event);

        let after = self.state.phase;
        match (before, after) {
            (_, Phase::Running) if before == Phase::NotStarted || event == GameEvent::Reset => {
                self.metrics.on_game_start();
                info!(?event, "game started");
            }
            (Phase::Running, Phase::Paused) => {
                self.metrics.on_pause();
                debug!(score = self.state.score, "paused");
            }
            (Phase::Paused, Phase::Running) => {
                self.metrics.on_resume();
                debug!("resumed");
            }
            (Phase::Running, Phase::GameOver) => {
                self.metrics.on_game_over(self.state.score);
                info!(
                    score = self.state.score,
                    length = self.state.snake.len(),
                    steps = self.state.steps,
                    cause = ?self.state.collision,
                    "game over"
                );
            }
            _ => {}
        }

        if self.state.score > before_score {
            debug!(score = self.state.score, food = ?self.state.food, "food eaten");
        }
    }
}
