//! Assembler lifecycle states.

use std::fmt;

/// Where the assembler is within a production tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssemblerState {
    /// Waiting for the next tick.
    #[default]
    Idle,
    /// Draining and applying transactions.
    Assembling,
    /// A block was just sealed.
    Sealed,
}

impl AssemblerState {
    /// Whether `next` is a legal transition from `self`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Assembling)
                | (Self::Idle, Self::Sealed)
                | (Self::Assembling, Self::Sealed)
                | (Self::Assembling, Self::Idle)
                | (Self::Sealed, Self::Idle)
        )
    }
}

impl fmt::Display for AssemblerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Assembling => "assembling",
            Self::Sealed => "sealed",
        };
        f.write_str(name)
    }
}
