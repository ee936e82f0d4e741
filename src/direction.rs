#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
}

impl Direction {
    pub fn as_string(self) -> String {
        match self {
            Direction::Down => String::from("down"),
            Direction::Up => String::from("up"),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Down => "▼",
            Direction::Up => "▲",
        }
    }
}
