use super::{
    action::TurnAction,
    config::GameConfig,
    state::{GameState, Position, Snake},
};
use crate::game::Direction;
use rand::Rng;

/// Result of a game step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// Base reward for this step: food reward, death penalty, or 0
    pub reward: f32,
    /// Whether the game has terminated
    pub terminated: bool,
    /// Score after the step
    pub score: u32,
}

/// The game engine that handles all game logic
///
/// The engine is the only component that mutates `GameState`; the
/// feature extractor and agent treat the state as read-only.
pub struct GameEngine {
    config: GameConfig,
    rng: rand::rngs::ThreadRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: rand::thread_rng(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to initial state: a snake centered on the grid
    /// heading right, with food on a random free cell
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        let food = self.spawn_food_avoid_snake(&snake);

        GameState::new(snake, food, self.config.grid_width, self.config.grid_height)
    }

    /// Execute one step of the game.
    ///
    /// If an action is given, the heading is updated by the relative
    /// turn; `None` keeps the current heading. The head advances one
    /// cell, and the step terminates the game on a wall hit, a
    /// self-collision, or when the frame counter exceeds
    /// `frame_limit_factor * snake length` (starvation timeout).
    /// Terminal steps leave the food and tail untouched.
    pub fn step(&mut self, state: &mut GameState, action: Option<TurnAction>) -> StepResult {
        if !state.is_alive {
            return StepResult {
                reward: 0.0,
                terminated: true,
                score: state.score,
            };
        }

        state.frames += 1;

        if let Some(turn) = action {
            state.snake.direction = state.snake.direction.turned(turn);
        }

        // Advance the head, remembering the previous position
        state.previous_head = Some(state.snake.head());
        let new_head = state.snake.head().moved_in_direction(state.snake.direction);
        state.snake.body.insert(0, new_head);

        let frame_limit = self.config.frame_limit_factor * state.snake.len() as u32;
        if state.is_collision(new_head) || state.frames > frame_limit {
            state.is_alive = false;
            return StepResult {
                reward: self.config.death_penalty,
                terminated: true,
                score: state.score,
            };
        }

        if new_head == state.food {
            state.score += 1;
            state.food = self.spawn_food_avoid_snake(&state.snake);
            StepResult {
                reward: self.config.food_reward,
                terminated: false,
                score: state.score,
            }
        } else {
            state.snake.body.pop();
            StepResult {
                reward: 0.0,
                terminated: false,
                score: state.score,
            }
        }
    }

    /// Spawn food at a random cell not occupied by the snake
    /// (reject-and-resample)
    fn spawn_food_avoid_snake(&mut self, snake: &Snake) -> Position {
        loop {
            let x = self.rng.gen_range(0..self.config.grid_width) as i32;
            let y = self.rng.gen_range(0..self.config.grid_height) as i32;
            let pos = Position::new(x, y);

            if !snake.body.contains(&pos) {
                return pos;
            }
        }
    }
}
