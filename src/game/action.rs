/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Clockwise cycle used for relative turns: Right -> Down -> Left -> Up
const CLOCKWISE: [Direction; 4] = [
    Direction::Right,
    Direction::Down,
    Direction::Left,
    Direction::Up,
];

impl Direction {
    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn clockwise_index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }

    /// Apply a relative turn, yielding the new absolute heading
    pub fn turned(self, turn: TurnAction) -> Direction {
        let idx = self.clockwise_index();
        let next = match turn {
            TurnAction::Straight => idx,
            TurnAction::TurnRight => (idx + 1) % 4,
            TurnAction::TurnLeft => (idx + 3) % 4,
        };
        CLOCKWISE[next]
    }
}

/// Action relative to the snake's current heading
///
/// The agent never commands absolute directions; it either keeps going
/// or turns 90 degrees, which makes a 180-degree turn unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnAction {
    Straight,
    TurnRight,
    TurnLeft,
}

impl TurnAction {
    /// All actions in their canonical (one-hot) order
    pub const ALL: [TurnAction; 3] = [
        TurnAction::Straight,
        TurnAction::TurnRight,
        TurnAction::TurnLeft,
    ];

    /// Index of this action in the one-hot encoding
    pub fn index(self) -> usize {
        match self {
            TurnAction::Straight => 0,
            TurnAction::TurnRight => 1,
            TurnAction::TurnLeft => 2,
        }
    }

    /// Convert an index back to an action; out-of-range maps to Straight
    pub fn from_index(idx: usize) -> Self {
        match idx {
            1 => TurnAction::TurnRight,
            2 => TurnAction::TurnLeft,
            _ => TurnAction::Straight,
        }
    }

    /// Decode a raw one-hot vector supplied by an external caller.
    ///
    /// A well-formed vector has exactly one slot set to 1.0. Malformed
    /// vectors (all zeros, no exact 1.0) fall back to `Straight` rather
    /// than failing; the first set slot wins when several are set.
    pub fn from_one_hot(one_hot: &[f32; 3]) -> Self {
        one_hot
            .iter()
            .position(|&v| v == 1.0)
            .map(Self::from_index)
            .unwrap_or(TurnAction::Straight)
    }

    /// Encode this action as a one-hot vector
    pub fn to_one_hot(self) -> [f32; 3] {
        let mut v = [0.0; 3];
        v[self.index()] = 1.0;
        v
    }
}
