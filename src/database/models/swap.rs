use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::ShiftEntry;
use crate::database::models::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
    pub enum SwapStatus {
        #[default]
        Pending => "pending",
        Accepted => "accepted",
        Declined => "declined",
        Cancelled => "cancelled",
    }
}

impl SwapStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SwapStatus::Pending)
    }
}

/// Copy of a shift taken when the swap was requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSnapshot {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub shift_name: String,
    pub hours: f64,
}

impl From<&ShiftEntry> for ShiftSnapshot {
    fn from(entry: &ShiftEntry) -> Self {
        Self {
            id: entry.id.clone(),
            date: entry.date,
            start_time: entry.start_time.clone(),
            end_time: entry.end_time.clone(),
            shift_name: entry.shift_name.clone(),
            hours: entry.hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: Uuid,
    pub workspace_id: String,
    pub workspace_name: String,
    pub requester_id: String,
    pub requester_name: String,
    pub my_shift: ShiftSnapshot,
    /// `None` makes this an open swap any other member may pick up.
    pub target_employee_id: Option<String>,
    pub target_employee_name: Option<String>,
    pub their_shift: Option<ShiftSnapshot>,
    #[serde(default)]
    pub message: String,
    pub status: SwapStatus,
    pub is_open_swap: bool,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_by: Option<String>,
    pub declined_at: Option<DateTime<Utc>>,
    pub declined_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl SwapRequest {
    pub fn is_targeted_at(&self, user_id: &str) -> bool {
        self.target_employee_id.as_deref() == Some(user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestInput {
    pub my_shift_id: String,
    pub target_employee_id: Option<String>,
    pub their_shift_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuery {
    pub status: Option<SwapStatus>,
    /// Only pending open swaps the caller could pick up.
    #[serde(default)]
    pub open: bool,
}
