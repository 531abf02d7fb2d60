use super::{
    action::{Direction, GameEvent},
    config::GameConfig,
    state::{CollisionType, GameState, Phase, Position, Snake},
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IteratorRandom};
use tracing::debug;

/// The game engine that handles all game logic
///
/// Every operation takes the current [`GameState`] by value and returns the
/// next one; the engine itself only holds the configuration and the RNG used
/// for food placement. Inputs that do not apply to the current phase come
/// back unchanged.
pub struct GameEngine<R = StdRng> {
    config: GameConfig,
    rng: R,
}

impl GameEngine<StdRng> {
    /// Create a new game engine seeded from OS entropy
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine whose food sequence is reproducible
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// State shown before the first key press
    pub fn initial_state(&self) -> GameState {
        let snake = Snake::new(self.config.initial_head, self.config.initial_direction);

        GameState::new(
            snake,
            self.config.initial_food,
            self.config.grid_width,
            self.config.grid_height,
        )
    }

    /// Apply one event to a state
    pub fn transition(&mut self, state: GameState, event: GameEvent) -> GameState {
        match event {
            GameEvent::Tick => self.tick(state),
            GameEvent::SetDirection(direction) => self.set_direction(state, direction),
            GameEvent::TogglePause => self.toggle_pause(state),
            GameEvent::Reset => self.reset(),
        }
    }

    /// Start over from the initial layout, already running
    pub fn reset(&self) -> GameState {
        self.initial_state().with_phase(Phase::Running)
    }

    /// Execute one step of the game
    pub fn tick(&mut self, mut state: GameState) -> GameState {
        if state.phase != Phase::Running {
            return state;
        }

        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        // Checked against the body before the tail moves
        if let Some(collision_type) = self.check_collision(&state, new_head) {
            state.phase = Phase::GameOver;
            state.collision = Some(collision_type);
            return state;
        }

        let ate_food = new_head == state.food;
        state.snake.advance_to(new_head, ate_food);
        state.steps += 1;

        if ate_food {
            state.score = state.score.saturating_add(self.config.food_reward);

            match self.spawn_food(&state.snake, state.grid_width, state.grid_height) {
                Some(food) => state.food = food,
                None => {
                    state.phase = Phase::GameOver;
                    state.collision = Some(CollisionType::BoardFull);
                }
            }
        }

        state
    }

    /// Request a turn for the next tick
    ///
    /// Only turns onto the other axis of the current direction are taken.
    /// Any directional input starts a game that has not started yet.
    pub fn set_direction(&self, mut state: GameState, requested: Direction) -> GameState {
        match state.phase {
            Phase::GameOver => return state,
            Phase::NotStarted => state.phase = Phase::Running,
            Phase::Running | Phase::Paused => {}
        }

        if state.snake.direction.is_orthogonal(requested) {
            state.snake.direction = requested;
        }

        state
    }

    pub fn toggle_pause(&self, mut state: GameState) -> GameState {
        state.phase = match state.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            other => other,
        };
        state
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<CollisionType> {
        if !state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if state.is_occupied_by_snake(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Pick a uniformly random cell not covered by the snake
    ///
    /// Rejection sampling is tried once per grid cell; after that the free
    /// cells are enumerated and one is chosen directly. Returns `None` only
    /// when the snake covers the whole grid.
    pub fn spawn_food(&mut self, snake: &Snake, width: usize, height: usize) -> Option<Position> {
        let capacity = width * height;
        if snake.len() >= capacity {
            return None;
        }

        for _ in 0..capacity {
            let x = self.rng.gen_range(0..width) as i32;
            let y = self.rng.gen_range(0..height) as i32;
            let pos = Position::new(x, y);

            if !snake.occupies(pos) {
                return Some(pos);
            }
        }

        debug!(
            snake_len = snake.len(),
            capacity, "food sampling exhausted retries, choosing from free cells"
        );

        (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x as i32, y as i32)))
            .filter(|pos| !snake.occupies(*pos))
            .choose(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn engine() -> GameEngine {
        GameEngine::seeded(GameConfig::default(), 7)
    }

    fn running(body: &[(i32, i32)], direction: Direction, food: (i32, i32)) -> GameState {
        let snake = Snake::from_segments(
            body.iter().map(|&(x, y)| Position::new(x, y)).collect(),
            direction,
        );
        GameState::new(snake, Position::new(food.0, food.1), 20, 20).with_phase(Phase::Running)
    }

    fn assert_snake_invariant(state: &GameState) {
        let unique: HashSet<_> = state.snake.body.iter().collect();
        assert_eq!(unique.len(), state.snake.len(), "duplicate cells");
        assert!(!state.snake.is_empty());
        for &cell in &state.snake.body {
            assert!(state.is_in_bounds(cell), "{cell:?} out of bounds");
        }
    }

    #[test]
    fn test_initial_state() {
        let engine = engine();
        let state = engine.initial_state();

        assert_eq!(state.phase, Phase::NotStarted);
        assert_eq!(state.snake.body, vec![Position::new(10, 10)]);
        assert_eq!(state.direction(), Direction::Right);
        assert_eq!(state.food, Position::new(15, 15));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = engine();
        let state = engine.reset();
        let initial_head = state.snake.head();

        let state = engine.tick(state);

        assert!(state.is_running());
        assert_eq!(state.steps, 1);
        assert_eq!(state.snake.head(), initial_head.moved_by(1, 0));
        assert_eq!(state.snake.len(), 1);
    }

    #[test]
    fn test_wall_collision_leaves_snake() {
        let mut engine = engine();
        let cases = [
            ((0, 5), Direction::Left),
            ((19, 5), Direction::Right),
            ((5, 0), Direction::Up),
            ((5, 19), Direction::Down),
        ];

        for ((x, y), direction) in cases {
            let before = running(&[(x, y)], direction, (10, 10));
            let after = engine.tick(before.clone());

            assert_eq!(after.phase, Phase::GameOver);
            assert_eq!(after.collision, Some(CollisionType::Wall));
            assert_eq!(after.snake, before.snake);
            assert_eq!(after.score, before.score);
        }
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine();

        // Head at (5,5) heading up into (5,4), which is part of the body
        let before = running(
            &[(5, 5), (6, 5), (6, 4), (5, 4), (4, 4)],
            Direction::Up,
            (0, 0),
        );
        let after = engine.tick(before.clone());

        assert_eq!(after.phase, Phase::GameOver);
        assert_eq!(after.collision, Some(CollisionType::SelfCollision));
        assert_eq!(after.snake, before.snake);
    }

    #[test]
    fn test_moving_into_vacating_tail_collides() {
        let mut engine = engine();

        // A 2x2 loop: the tail at (5,4) would leave this tick, but the check
        // runs against the body before it moves.
        let before = running(&[(5, 5), (6, 5), (6, 4), (5, 4)], Direction::Up, (0, 0));
        let after = engine.tick(before);

        assert_eq!(after.phase, Phase::GameOver);
        assert_eq!(after.collision, Some(CollisionType::SelfCollision));
    }

    #[test]
    fn test_self_collision_from_turns() {
        let mut engine = engine();
        let mut state = running(&[(5, 5), (4, 5), (3, 5), (2, 5)], Direction::Right, (8, 8));

        // Right: (6,5), (5,5), (4,5), (3,5)
        state = engine.tick(state);
        // Down: (6,6), (6,5), (5,5), (4,5)
        state = engine.set_direction(state, Direction::Down);
        state = engine.tick(state);
        // Left: (5,6), (6,6), (6,5), (5,5)
        state = engine.set_direction(state, Direction::Left);
        state = engine.tick(state);
        // Up: (5,5) is still body
        state = engine.set_direction(state, Direction::Up);
        state = engine.tick(state);

        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.collision, Some(CollisionType::SelfCollision));
        assert_eq!(state.steps, 3);
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = engine();
        let before = running(&[(5, 5)], Direction::Right, (6, 5));

        let after = engine.tick(before);

        assert_eq!(
            after.snake.body,
            vec![Position::new(6, 5), Position::new(5, 5)]
        );
        assert_eq!(after.score, 10);
        assert!(after.is_running());
        assert!(!after.snake.occupies(after.food));
        assert!(after.is_in_bounds(after.food));
    }

    #[test]
    fn test_length_conserved_without_food() {
        let mut engine = engine();
        let before = running(&[(5, 5), (4, 5), (3, 5)], Direction::Right, (15, 15));

        let after = engine.tick(before.clone());

        assert_eq!(after.snake.len(), before.snake.len());
        assert_eq!(after.snake.head(), Position::new(6, 5));
        assert_eq!(after.snake.tail(), Position::new(4, 5));
        assert_eq!(after.snake.body[1..], before.snake.body[..2]);
        assert_eq!(after.food, before.food);
        assert_eq!(after.score, 0);
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let engine = engine();
        let pairs = [
            (Direction::Up, Direction::Down),
            (Direction::Down, Direction::Up),
            (Direction::Left, Direction::Right),
            (Direction::Right, Direction::Left),
        ];

        for (current, reverse) in pairs {
            let state = running(&[(5, 5)], current, (0, 0));
            let state = engine.set_direction(state, reverse);
            assert_eq!(state.direction(), current);
        }
    }

    #[test]
    fn test_same_direction_is_ignored_and_turn_accepted() {
        let engine = engine();
        let state = running(&[(5, 5)], Direction::Right, (0, 0));

        let state = engine.set_direction(state, Direction::Right);
        assert_eq!(state.direction(), Direction::Right);

        let state = engine.set_direction(state, Direction::Down);
        assert_eq!(state.direction(), Direction::Down);
    }

    #[test]
    fn test_each_turn_checked_against_latest_direction() {
        let mut engine = engine();
        let state = running(&[(5, 5), (4, 5), (3, 5)], Direction::Right, (0, 0));

        // Left is orthogonal to the pending Up, so both turns are taken
        let state = engine.set_direction(state, Direction::Up);
        let state = engine.set_direction(state, Direction::Left);
        assert_eq!(state.direction(), Direction::Left);

        // and the next tick lands on the neck at (4,5)
        let state = engine.tick(state);
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.collision, Some(CollisionType::SelfCollision));
    }

    #[test]
    fn test_direction_starts_game() {
        let engine = engine();

        let state = engine.set_direction(engine.initial_state(), Direction::Up);
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.direction(), Direction::Up);

        // Starting with the current direction still starts the game
        let state = engine.set_direction(engine.initial_state(), Direction::Right);
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.direction(), Direction::Right);
    }

    #[test]
    fn test_direction_buffered_while_paused() {
        let mut engine = engine();
        let paused = engine.toggle_pause(engine.reset());
        assert_eq!(paused.phase, Phase::Paused);

        let paused = engine.set_direction(paused, Direction::Down);
        assert_eq!(paused.direction(), Direction::Down);
        assert_eq!(paused.phase, Phase::Paused);

        let still = engine.tick(paused.clone());
        assert_eq!(still, paused);

        let moved = engine.tick(engine.toggle_pause(paused));
        assert_eq!(moved.snake.head(), Position::new(10, 11));
    }

    #[test]
    fn test_input_ignored_after_game_over() {
        let mut engine = engine();
        let over = engine.tick(running(&[(19, 0)], Direction::Right, (5, 5)));
        assert!(over.is_over());

        assert_eq!(engine.set_direction(over.clone(), Direction::Down), over);
        assert_eq!(engine.toggle_pause(over.clone()), over);
        assert_eq!(engine.tick(over.clone()), over);
    }

    #[test]
    fn test_toggle_pause() {
        let engine = engine();

        let active = engine.reset();
        let paused = engine.toggle_pause(active.clone());
        assert_eq!(paused.phase, Phase::Paused);
        assert_eq!(engine.toggle_pause(paused), active);

        let not_started = engine.initial_state();
        assert_eq!(engine.toggle_pause(not_started.clone()), not_started);
    }

    #[test]
    fn test_tick_gated_outside_running() {
        let mut engine = engine();

        let not_started = engine.initial_state();
        assert_eq!(engine.tick(not_started.clone()), not_started);

        let paused = running(&[(5, 5)], Direction::Right, (6, 5)).with_phase(Phase::Paused);
        assert_eq!(engine.tick(paused.clone()), paused);
    }

    #[test]
    fn test_reset_from_any_phase() {
        let mut engine = engine();
        let expected = {
            let mut state = engine.initial_state();
            state.phase = Phase::Running;
            state
        };

        let mut grown = running(&[(5, 5), (4, 5)], Direction::Down, (6, 5));
        grown.score = 90;
        grown.steps = 40;

        for phase in [
            Phase::NotStarted,
            Phase::Running,
            Phase::Paused,
            Phase::GameOver,
        ] {
            let mut state = grown.clone().with_phase(phase);
            if phase == Phase::GameOver {
                state.collision = Some(CollisionType::Wall);
            }
            let state = engine.transition(state, GameEvent::Reset);
            assert_eq!(state, expected);
            assert_eq!(engine.transition(state, GameEvent::Reset), expected);
        }
    }

    #[test]
    fn test_transition_routes_events() {
        let mut engine = engine();
        let state = engine.initial_state();

        let state = engine.transition(state, GameEvent::SetDirection(Direction::Down));
        assert!(state.is_running());
        let state = engine.transition(state, GameEvent::Tick);
        assert_eq!(state.snake.head(), Position::new(10, 11));
        let state = engine.transition(state, GameEvent::TogglePause);
        assert_eq!(state.phase, Phase::Paused);
    }

    #[test]
    fn test_spawn_food_avoids_snake() {
        let mut engine = engine();
        let snake = Snake::from_segments(
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)],
            Direction::Left,
        );

        for _ in 0..200 {
            let food = engine.spawn_food(&snake, 3, 2).unwrap();
            assert!(!snake.occupies(food));
            assert_eq!(food.y, 1);
        }
    }

    #[test]
    fn test_spawn_food_finds_last_free_cell() {
        let mut engine = engine();

        // Every cell of a 4x4 grid except (2,3)
        let body: Vec<_> = (0..4)
            .flat_map(|y| (0..4).map(move |x| Position::new(x, y)))
            .filter(|&p| p != Position::new(2, 3))
            .collect();
        let snake = Snake::from_segments(body, Direction::Right);

        assert_eq!(engine.spawn_food(&snake, 4, 4), Some(Position::new(2, 3)));
    }

    #[test]
    fn test_spawn_food_full_board() {
        let mut engine = engine();
        let snake = Snake::from_segments(
            vec![Position::new(0, 0), Position::new(1, 0)],
            Direction::Right,
        );

        assert_eq!(engine.spawn_food(&snake, 2, 1), None);
    }

    #[test]
    fn test_filling_board_ends_game() {
        let mut engine = GameEngine::seeded(GameConfig::new(3, 1), 1);
        let snake = Snake::from_segments(
            vec![Position::new(1, 0), Position::new(0, 0)],
            Direction::Right,
        );
        let state = GameState::new(snake, Position::new(2, 0), 3, 1).with_phase(Phase::Running);

        let state = engine.tick(state);

        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.collision, Some(CollisionType::BoardFull));
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_seeded_engines_agree() {
        let mut a = GameEngine::seeded(GameConfig::default(), 42);
        let mut b = GameEngine::seeded(GameConfig::default(), 42);
        let snake = Snake::new(Position::new(10, 10), Direction::Right);

        for _ in 0..20 {
            assert_eq!(a.spawn_food(&snake, 20, 20), b.spawn_food(&snake, 20, 20));
        }
    }

    #[test]
    fn test_random_play_keeps_snake_invariant() {
        let mut engine = GameEngine::seeded(GameConfig::small(), 3);
        let mut inputs = StdRng::seed_from_u64(11);
        let directions = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ];

        for _ in 0..50 {
            let mut state = engine.reset();
            while !state.is_over() {
                if inputs.gen_bool(0.3) {
                    let direction = directions[inputs.gen_range(0..4)];
                    state = engine.set_direction(state, direction);
                }
                let before_len = state.snake.len();
                let before_score = state.score;
                state = engine.tick(state);
                assert_snake_invariant(&state);
                if !state.is_over() {
                    assert!(!state.snake.occupies(state.food));
                    let grew = state.snake.len() - before_len;
                    assert_eq!(state.score - before_score, grew as u32 * 10);
                }
                if state.steps > 500 {
                    break;
                }
            }
        }
    }
}
