use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Catalog entry for a reusable shift definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftType {
    pub id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftNote {
    pub id: String,
    pub text: String,
    pub author_id: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

/// One scheduled line item. `employee_name` and `shift_name` are snapshots
/// taken when the entry was written, not live references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftEntry {
    pub id: String,
    pub date: NaiveDate,
    pub employee_id: String,
    pub employee_name: String,
    /// `None` for ad-hoc shifts that are not in the catalog.
    pub shift_id: Option<String>,
    pub shift_name: String,
    pub start_time: String,
    pub end_time: String,
    pub hours: f64,
    #[serde(default)]
    pub notes: Vec<ShiftNote>,
}

/// Who works and what; shared by add and edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignmentInput {
    pub employee_id: String,
    /// Catalog shift; when absent the times below describe a custom shift.
    pub shift_id: Option<String>,
    pub shift_name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftEntryInput {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub assignment: ShiftAssignmentInput,
    /// Replace an existing entry for the same employee and date instead of
    /// failing with a duplicate conflict.
    #[serde(default)]
    pub replace_existing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTypeInput {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    pub date: Option<NaiveDate>,
    pub employee_id: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Bulk clear scope: a month when both fields are set, everything otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearScheduleInput {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearScheduleResult {
    pub removed: usize,
}
