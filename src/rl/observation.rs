//! Feature extraction: projects raw game state into the fixed 28-value
//! observation vector fed to the Q-network.
//!
//! The order and count of the features is a contract with any persisted
//! network weights, so it must never change silently:
//!
//! | slots  | feature group                                   |
//! |--------|-------------------------------------------------|
//! | 0..3   | immediate danger (straight, right, left)        |
//! | 3..7   | current heading one-hot (left, right, up, down) |
//! | 7..11  | food bearing (left, right, up, down)            |
//! | 11     | normalized snake length                         |
//! | 12..16 | local body density (left, right, up, down)      |
//! | 16..20 | wall distances (left, right, top, bottom)       |
//! | 20..24 | free-space run lengths (left, right, up, down)  |
//! | 24..26 | trap indicators (tail-blocking, potential trap) |
//! | 26..28 | distance to food, movement efficiency           |

use crate::game::{Direction, GameState, Position, TurnAction};

/// Number of values in an observation
pub const STATE_SIZE: usize = 28;

/// Fixed-size numeric projection of a game state
pub type Observation = [f32; STATE_SIZE];

/// How many cells ahead the body-density features look
const DENSITY_RANGE: i32 = 3;

/// Axis-aligned probe order shared by the density, wall-distance and
/// free-space feature groups: left, right, up, down
const AXIS_DELTAS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Compute the observation vector for a state.
///
/// Pure and idempotent: calling it twice on the same unmutated state
/// yields identical results, and it never mutates the state.
pub fn extract(state: &GameState) -> Observation {
    let head = state.snake.head();
    let heading = state.snake.direction;

    let mut obs = [0.0; STATE_SIZE];
    let mut i = 0;
    let mut push = |v: f32| {
        obs[i] = v;
        i += 1;
    };

    // Immediate danger for each relative move, via the same clockwise
    // heading mapping the engine uses
    for turn in TurnAction::ALL {
        let probe = head.moved_in_direction(heading.turned(turn));
        push(bool_feature(state.is_collision(probe)));
    }

    // Current heading one-hot
    push(bool_feature(heading == Direction::Left));
    push(bool_feature(heading == Direction::Right));
    push(bool_feature(heading == Direction::Up));
    push(bool_feature(heading == Direction::Down));

    // Food bearing relative to the head (non-exclusive)
    push(bool_feature(state.food.x < head.x));
    push(bool_feature(state.food.x > head.x));
    push(bool_feature(state.food.y < head.y));
    push(bool_feature(state.food.y > head.y));

    // Normalized snake length
    let cells = (state.grid_width * state.grid_height) as f32;
    push(state.snake.len() as f32 / cells);

    // Local body density per axis direction
    for delta in AXIS_DELTAS {
        push(body_density(state, head, delta));
    }

    // Normalized Manhattan distances to the four walls
    let w = state.grid_width as f32;
    let h = state.grid_height as f32;
    push(head.x as f32 / w);
    push((state.grid_width as i32 - 1 - head.x) as f32 / w);
    push(head.y as f32 / h);
    push((state.grid_height as i32 - 1 - head.y) as f32 / h);

    // Free-space run lengths per axis direction
    for delta in AXIS_DELTAS {
        push(free_space_run(state, head, delta));
    }

    // Trap indicators
    push(bool_feature(tail_blocking_escape(state)));
    push(bool_feature(potential_trap(state)));

    // Motion summary
    push(state.distance_to_food() as f32 / (w + h));
    push(movement_efficiency(state));

    debug_assert_eq!(i, STATE_SIZE);
    obs
}

/// Named per-tick metrics for reward shaping and display collaborators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSummary {
    pub score: u32,
    pub snake_length: usize,
    /// Manhattan distance from head to food, unnormalized
    pub distance_to_food: u32,
    /// Mean of the four body-density features
    pub body_density: f32,
    /// Mean of the four free-space run features
    pub free_space_ratio: f32,
    pub trap_risk: bool,
    pub tail_blocking: bool,
}

/// Compute the named state metrics used by the trainer's reward shaping
pub fn summary(state: &GameState) -> StateSummary {
    let head = state.snake.head();

    let body_density = AXIS_DELTAS
        .iter()
        .map(|&d| body_density(state, head, d))
        .sum::<f32>()
        / AXIS_DELTAS.len() as f32;

    let free_space_ratio = AXIS_DELTAS
        .iter()
        .map(|&d| free_space_run(state, head, d))
        .sum::<f32>()
        / AXIS_DELTAS.len() as f32;

    StateSummary {
        score: state.score,
        snake_length: state.snake.len(),
        distance_to_food: state.distance_to_food(),
        body_density,
        free_space_ratio,
        trap_risk: potential_trap(state),
        tail_blocking: tail_blocking_escape(state),
    }
}

fn bool_feature(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Fraction of the next `DENSITY_RANGE` cells in a direction holding a
/// body segment (head excluded); stops early at the grid boundary
fn body_density(state: &GameState, from: Position, (dx, dy): (i32, i32)) -> f32 {
    let mut count = 0;
    for step in 1..=DENSITY_RANGE {
        let cell = from.moved_by(dx * step, dy * step);
        if !state.is_in_bounds(cell) {
            break;
        }
        if state.snake.collides_with_body(cell) {
            count += 1;
        }
    }
    count as f32 / DENSITY_RANGE as f32
}

/// Consecutive free cells in a direction starting one step away,
/// normalized by the larger grid extent
fn free_space_run(state: &GameState, from: Position, (dx, dy): (i32, i32)) -> f32 {
    let mut count = 0;
    let mut cell = from.moved_by(dx, dy);
    while !state.is_collision(cell) {
        count += 1;
        cell = cell.moved_by(dx, dy);
    }
    count as f32 / state.grid_width.max(state.grid_height) as f32
}

/// Whether the tail sits close to the head inside the head/food
/// bounding box, potentially blocking the route to the food
fn tail_blocking_escape(state: &GameState) -> bool {
    if state.snake.len() < 4 {
        return false;
    }

    let head = state.snake.head();
    let tail = state.snake.tail();

    if head.manhattan_distance(tail) > 3 {
        return false;
    }

    let food = state.food;
    let x_between = (head.x <= tail.x && tail.x <= food.x) || (food.x <= tail.x && tail.x <= head.x);
    let y_between = (head.y <= tail.y && tail.y <= food.y) || (food.y <= tail.y && tail.y <= head.y);
    x_between && y_between
}

/// Whether the head is boxed in: at most one free adjacent cell, or
/// exactly two free cells and little maneuvering room relative to the
/// snake's own length
fn potential_trap(state: &GameState) -> bool {
    let head = state.snake.head();

    let free_adjacent = AXIS_DELTAS
        .iter()
        .filter(|&&(dx, dy)| !state.is_collision(head.moved_by(dx, dy)))
        .count();

    if free_adjacent <= 1 {
        return true;
    }

    if free_adjacent == 2 {
        let total_free: f32 = AXIS_DELTAS
            .iter()
            .map(|&d| free_space_run(state, head, d) * 10.0)
            .sum();
        if total_free < state.snake.len() as f32 * 0.5 {
            return true;
        }
    }

    false
}

/// 1.0 when the last move brought the head closer to the food (or the
/// previous head was on the food), 0.0 when it moved away, 0.5 when
/// the distance is unchanged or there is no movement history yet
fn movement_efficiency(state: &GameState) -> f32 {
    let prev_head = match state.previous_head {
        Some(p) => p,
        None => return 0.5,
    };

    let current = state.distance_to_food();
    let previous = prev_head.manhattan_distance(state.food);

    if previous == 0 {
        return 1.0;
    }
    if current < previous {
        1.0
    } else if current > previous {
        0.0
    } else {
        0.5
    }
}
