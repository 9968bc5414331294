use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// The claim request is in flight and must not be abandoned.
    CloseWhileClaiming,
}

impl fmt::Display for ClaimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimError::CloseWhileClaiming => {
                write!(f, "The bonus is being claimed and cannot be closed yet")
            }
        }
    }
}

impl std::error::Error for ClaimError {}
