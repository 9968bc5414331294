use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds shown before the claim is attempted.
pub const PRE_CLAIM_SECONDS: u32 = 10;
/// Seconds the success screen stays up before closing itself.
pub const SUCCESS_AUTO_CLOSE_SECONDS: u32 = 5;
pub const DEFAULT_CLAIM_ERROR: &str = "An unexpected error occurred.";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Idle,
    Counting,
    Claiming,
    Success,
    Error,
    Cooldown,
}

/// Snapshot of the claim flow for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct ClaimSession {
    pub status: ClaimStatus,
    pub countdown: u32,
    /// Only set while in `Cooldown`.
    pub cooldown_target: Option<DateTime<Utc>>,
    /// Only set while in `Cooldown`; never negative.
    pub cooldown_remaining: Option<Duration>,
    /// Only non-empty while in `Error`.
    pub error_message: String,
}

impl ClaimSession {
    /// Whether the close affordance should be shown.
    #[inline]
    pub fn can_close(&self) -> bool {
        self.status != ClaimStatus::Claiming
    }
}

/// Work the host must carry out after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimEffect {
    /// Start the backend claim; its outcome must be fed back with this generation.
    StartClaim { generation: u64 },
    /// Embed the sponsor content into the success view.
    InjectAd,
    /// Close the modal on the user's behalf.
    AutoClose,
}

/// The single timer that may be running in a given state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveTimer {
    PreClaim,
    Cooldown,
    AutoClose,
}

/// Render a remaining cooldown as `HH:MM:SS`.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
