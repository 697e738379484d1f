use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One weekly recurrence: this employee works this shift on this weekday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternEntry {
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub employee_id: String,
    pub employee_name: String,
    pub shift_id: Option<String>,
    pub shift_name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePreset {
    pub id: String,
    pub name: String,
    pub pattern: Vec<PatternEntry>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetInput {
    pub name: String,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPresetInput {
    pub month: u32,
    pub year: i32,
    /// Applying replaces the whole month; callers must opt in explicitly.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPresetResult {
    pub replaced: usize,
    pub created: usize,
}
