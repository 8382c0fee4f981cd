use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted cycle: when it began and its ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleRecord {
    pub started_at: DateTime<Utc>,
    pub cycle_number: u32,
}

/// One decorative element living in the particle container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub id: u64,
    pub symbol: &'static str,
    pub left_percent: f64,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CelebrationView {
    pub text: String,
    pub active: bool,
}

/// Everything the viewer page needs to paint the slots.
#[derive(Debug, Clone, Serialize)]
pub struct DisplaySnapshot {
    pub days_number: String,
    pub days_label: String,
    pub progress_width: String,
    pub cycle_indicator: String,
    pub celebration: CelebrationView,
    pub particles: Vec<Particle>,
}

#[derive(Debug, Serialize)]
pub struct CycleResponse {
    pub cycle_number: u32,
    pub started_at: DateTime<Utc>,
    pub elapsed_days: i64,
    pub days_remaining: i64,
    pub progress_percent: f64,
}

/// Relayed `visibilitychange`: whether the viewer tab is on screen.
#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepAwakeMode {
    Disabled,
    Idle,
    WakeLock,
    Audio,
    AwaitingInteraction,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct KeepAwakeStatus {
    pub mode: KeepAwakeMode,
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_request_reads_a_boolean_flag() {
        let shown: VisibilityRequest = serde_json::from_str(r#"{"visible": true}"#).unwrap();
        assert!(shown.visible);
        let hidden: VisibilityRequest = serde_json::from_str(r#"{"visible": false}"#).unwrap();
        assert!(!hidden.visible);

        assert!(serde_json::from_str::<VisibilityRequest>(r#"{"state": "hidden"}"#).is_err());
        assert!(serde_json::from_str::<VisibilityRequest>(r#"{"visible": "yes"}"#).is_err());
    }
}
