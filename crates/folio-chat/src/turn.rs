//! Turn state machine

/// Lifecycle of the current turn
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TurnState {
    /// No turn in flight
    #[default]
    Idle,
    /// The placeholder at `active` is being filled from the stream
    Streaming { active: usize },
    /// The last turn failed; ready for a new submission like `Idle`
    Failed { reason: String },
}

impl TurnState {
    pub fn is_streaming(&self) -> bool {
        matches!(self, TurnState::Streaming { .. })
    }

    /// Whether a new question may be submitted
    pub fn is_ready(&self) -> bool {
        !self.is_streaming()
    }

    /// Human-readable label for status lines
    pub fn label(&self) -> &'static str {
        match self {
            TurnState::Idle => "ready",
            TurnState::Streaming { .. } => "streaming",
            TurnState::Failed { .. } => "failed",
        }
    }
}

/// How a submitted turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Failed(String),
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed)
    }
}
