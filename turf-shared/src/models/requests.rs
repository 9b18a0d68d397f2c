use serde::{Deserialize, Serialize};

use super::booking::Amount;
use super::slot::SlotLabel;

// ============================================================================
// Request types
// ============================================================================

/// Field names follow the public API; the aliases keep older clients that
/// still send `bookingDate`/`slotTimeFrom`/`slotTimeTo` working.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSlotRequest {
    pub user_id: i32,
    #[serde(alias = "bookingDate")]
    pub date: String,
    #[serde(alias = "slotTimeFrom")]
    pub from_label: String,
    #[serde(alias = "slotTimeTo")]
    pub to_label: String,
    pub amount: Amount,
}

/// Either an explicit list of `times`, or a `from`/`to` range expanded the
/// same way a booking would be.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySlotsRequest {
    #[serde(alias = "slotDate")]
    pub date: String,
    #[serde(default, alias = "slotTimes")]
    pub times: Vec<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceSlotRequest {
    #[serde(alias = "slotDate")]
    pub date: String,
    #[serde(alias = "slotTime")]
    pub time: String,
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    pub booking_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub unavailable: Vec<SlotLabel>,
    pub available: bool,
}

impl ProbeReport {
    pub fn from_unavailable(unavailable: Vec<SlotLabel>) -> Self {
        let available = unavailable.is_empty();
        Self { unavailable, available }
    }
}

/// Why a booking or probe request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonKind {
    InvalidDate,
    InvalidTimeFormat,
    SlotConflict,
    SlotUnderMaintenance,
    Internal,
}
