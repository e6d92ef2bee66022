use std::fmt;

/// The two phases of an actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Primary,
    Secondary,
}

impl Signal {
    /// Raw bytes the actuator firmware listens for.
    pub fn token(&self) -> &'static [u8] {
        match self {
            Signal::Primary => b"servo1",
            Signal::Secondary => b"servo2",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Primary => f.write_str("primary"),
            Signal::Secondary => f.write_str("secondary"),
        }
    }
}
