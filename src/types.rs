//! Shared primitive IDs and the quality rating enum.

use serde::{Deserialize, Serialize};

/// Monotonic sleep-night identifier.
pub type NightId = u64;
/// Timestamp in milliseconds since the Unix epoch.
pub type EpochMs = u64;

/// Raw column value for an unrated night.
pub const QUALITY_UNRATED_RAW: i64 = -1;

/// Sleep quality rating bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    /// No rating selected yet.
    #[default]
    Unrated,
    /// Rating 0.
    VeryBad,
    /// Rating 1.
    Poor,
    /// Rating 2.
    SoSo,
    /// Rating 3.
    Okay,
    /// Rating 4.
    PrettyGood,
    /// Rating 5.
    Excellent,
}

impl Quality {
    /// Raw integer stored in the quality column.
    pub fn as_raw(self) -> i64 {
        match self {
            Quality::Unrated => QUALITY_UNRATED_RAW,
            Quality::VeryBad => 0,
            Quality::Poor => 1,
            Quality::SoSo => 2,
            Quality::Okay => 3,
            Quality::PrettyGood => 4,
            Quality::Excellent => 5,
        }
    }

    /// Decodes a raw column value; anything out of range reads as unrated.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Quality::VeryBad,
            1 => Quality::Poor,
            2 => Quality::SoSo,
            3 => Quality::Okay,
            4 => Quality::PrettyGood,
            5 => Quality::Excellent,
            _ => Quality::Unrated,
        }
    }

    /// True once the user has picked a rating.
    pub fn is_rated(self) -> bool {
        !matches!(self, Quality::Unrated)
    }
}
