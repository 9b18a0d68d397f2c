use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted state of a slot. A slot without a row reads as `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotStatus {
    Available,
    Unavailable,
    Maintenance,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "Available",
            SlotStatus::Unavailable => "Unavailable",
            SlotStatus::Maintenance => "Maintenance",
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, SlotStatus::Available)
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(SlotStatus::Available),
            "Unavailable" => Ok(SlotStatus::Unavailable),
            "Maintenance" => Ok(SlotStatus::Maintenance),
            other => Err(SlotParseError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotParseError {
    #[error("'{0}' is not a 12-hour time such as \"2 PM\"")]
    InvalidLabel(String),
    #[error("unknown slot status '{0}'")]
    UnknownStatus(String),
}

/// One hour of the day. Written as a 12-hour label ("2 PM", "12 AM"),
/// stored internally as the 24-hour hour number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotLabel(u8);

impl SlotLabel {
    pub fn from_hour(hour: u32) -> Option<Self> {
        u8::try_from(hour).ok().filter(|h| *h < 24).map(SlotLabel)
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.0)
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hour, marker) = match self.0 {
            0 => (12, "AM"),
            h @ 1..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        write!(f, "{hour} {marker}")
    }
}

impl FromStr for SlotLabel {
    type Err = SlotParseError;

    /// Accepts "h tt" and "hh tt": an hour 1-12, optionally zero padded,
    /// a single space, then AM or PM.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SlotParseError::InvalidLabel(s.to_string());

        let (hour, marker) = s.trim().split_once(' ').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&hour) {
            return Err(invalid());
        }

        let offset = if marker.eq_ignore_ascii_case("AM") {
            0
        } else if marker.eq_ignore_ascii_case("PM") {
            12
        } else {
            return Err(invalid());
        };

        Ok(SlotLabel(hour % 12 + offset))
    }
}

impl TryFrom<String> for SlotLabel {
    type Error = SlotParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotLabel> for String {
    fn from(label: SlotLabel) -> Self {
        label.to_string()
    }
}

/// A persisted slot row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub slot_id: i32,
    pub slot_date: NaiveDate,
    pub slot_time: SlotLabel,
    pub status: SlotStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parsing() {
        assert_eq!("2 PM".parse::<SlotLabel>().unwrap().hour(), 14);
        assert_eq!("02 PM".parse::<SlotLabel>().unwrap().hour(), 14);
        assert_eq!("12 AM".parse::<SlotLabel>().unwrap().hour(), 0);
        assert_eq!("12 PM".parse::<SlotLabel>().unwrap().hour(), 12);
        assert_eq!("11 am".parse::<SlotLabel>().unwrap().hour(), 11);

        for bad in ["", "2", "2PM", "13 PM", "0 AM", "2:00 PM", "002 PM", "2 XM", "14"] {
            assert!(bad.parse::<SlotLabel>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_label_rendering_drops_padding() {
        let label: SlotLabel = "09 AM".parse().unwrap();
        assert_eq!(label.to_string(), "9 AM");
        assert_eq!(SlotLabel::from_hour(0).unwrap().to_string(), "12 AM");
        assert_eq!(SlotLabel::from_hour(23).unwrap().to_string(), "11 PM");
        assert!(SlotLabel::from_hour(24).is_none());
    }

    #[test]
    fn test_label_serde() {
        let label: SlotLabel = serde_json::from_str("\"3 PM\"").unwrap();
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"3 PM\"");
        assert!(serde_json::from_str::<SlotLabel>("\"3 ZZ\"").is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [SlotStatus::Available, SlotStatus::Unavailable, SlotStatus::Maintenance] {
            assert_eq!(status.as_str().parse::<SlotStatus>().unwrap(), status);
        }
        assert!("Booked".parse::<SlotStatus>().is_err());
    }
}
