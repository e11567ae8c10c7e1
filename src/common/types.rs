use ahash::AHashMap;
use get_size::GetSize;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::ops::{Add, Sub};

/// Sample timestamps are 64-bit integer ticks (epoch milliseconds by
/// convention). `max_interval` and all interval arithmetic use the same unit.
pub type Timestamp = i64;

/// Unordered tag map as handed over by producers.
pub type Labels = AHashMap<String, String>;

/// Ordered sequence of `(tag_name, tag_value)` pairs keying a series within
/// a [`crate::tree::FilterTree`]. Sorted lexicographically before descent so
/// the same tag set always resolves to the same node.
pub type TagPath = Vec<(String, String)>;

/// Represents a data point in a time series.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
#[derive(GetSize)]
pub struct Sample {
    /// Timestamp from epoch.
    pub timestamp: Timestamp,

    /// Value for this data point.
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Sample { timestamp, value }
    }
}

impl Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.timestamp, self.value)
    }
}

impl Add for Sample {
    type Output = Sample;

    fn add(self, other: Sample) -> Sample {
        Sample::new(self.timestamp + other.timestamp, self.value + other.value)
    }
}

impl Sub for Sample {
    type Output = Sample;

    fn sub(self, other: Sample) -> Sample {
        Sample::new(self.timestamp - other.timestamp, self.value - other.value)
    }
}

impl PartialEq for Sample {
    #[inline]
    fn eq(&self, other: &Sample) -> bool {
        // Two samples are equal if their timestamps are equal, and their
        // values are either equal or are both NaN.
        if self.timestamp == other.timestamp {
            if self.value.is_nan() {
                return other.value.is_nan();
            }
            return self.value == other.value;
        }
        false
    }
}

impl Eq for Sample {}

impl Ord for Sample {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

impl PartialOrd for Sample {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
