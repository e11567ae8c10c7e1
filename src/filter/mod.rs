use crate::common::types::{Sample, Timestamp};
use crate::error::{FilterError, FilterResult};
use get_size::GetSize;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt::Display;
use std::str::FromStr;

mod deadband;
mod frame;
mod hysteresis;
mod sdt;

pub use deadband::DeadbandFilter;
pub use frame::SampleFrame;
pub use hysteresis::HysteresisFilter;
pub use sdt::SdtFilter;

/// Points released by a single `filter_point` call, in chronological order.
/// A call emits at most two points (a deferred point plus the current one).
pub type FilterOutput = SmallVec<[Sample; 2]>;

/// Capability set common to all compression filters.
///
/// `filter_samples` and `filter_frame` are provided on top of
/// `filter_point`, so implementors only supply the point-wise state machine
/// and `flush`.
pub trait Filter {
    /// Admit one sample, returning the points released by it. Samples must
    /// arrive in strictly increasing timestamp order; a stale sample is
    /// rejected with [`FilterError::InvalidOrder`] and leaves state
    /// untouched.
    fn filter_point(&mut self, timestamp: Timestamp, value: f64) -> FilterResult<FilterOutput>;

    /// Release the most recent suppressed sample, if any. Idempotent until
    /// new input arrives.
    fn flush(&mut self) -> Option<Sample>;

    /// Filter an ordered batch of samples. Equivalent to calling
    /// `filter_point` on every sample in order and concatenating the
    /// results. Does not flush.
    fn filter_samples(&mut self, samples: &[Sample]) -> FilterResult<Vec<Sample>> {
        let mut emitted = Vec::new();
        for sample in samples {
            emitted.extend(self.filter_point(sample.timestamp, sample.value)?);
        }
        Ok(emitted)
    }

    /// Filter a two-column frame, preserving its column names in the
    /// output. Does not flush.
    fn filter_frame(&mut self, frame: &SampleFrame) -> FilterResult<SampleFrame> {
        frame.validate_shape()?;
        let mut out = SampleFrame::new(frame.time_column.clone(), frame.value_column.clone());
        for sample in frame.samples() {
            for emitted in self.filter_point(sample.timestamp, sample.value)? {
                out.push(emitted);
            }
        }
        Ok(out)
    }
}

#[non_exhaustive]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(GetSize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Constant amplitude band around the last emitted value.
    #[default]
    Deadband,
    /// Running max-min spread of values since the last emission.
    Hysteresis,
    /// Swinging-door trending parallelogram envelope.
    Sdt,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Deadband => "deadband",
            FilterKind::Hysteresis => "hysteresis",
            FilterKind::Sdt => "sdt",
        }
    }
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            s if s.eq_ignore_ascii_case("deadband") => Ok(FilterKind::Deadband),
            s if s.eq_ignore_ascii_case("hysteresis") => Ok(FilterKind::Hysteresis),
            s if s.eq_ignore_ascii_case("sdt") => Ok(FilterKind::Sdt),
            _ => Err(FilterError::InvalidParameter(format!(
                "unknown filter kind: {s}"
            ))),
        }
    }
}

impl TryFrom<&str> for FilterKind {
    type Error = FilterError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        FilterKind::from_str(s)
    }
}

/// Construction parameters for one compression filter. Doubles as the
/// factory a [`crate::tree::FilterTree`] uses to build a fresh compressor
/// for every lazily created node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[derive(GetSize)]
pub struct FilterConfig {
    pub kind: FilterKind,

    /// Per-algorithm error budget: full deadband width, maximum hysteresis
    /// spread, or SDT compression deviation.
    pub threshold: f64,

    /// Maximum permitted time gap between consecutive emitted points.
    pub max_interval: Timestamp,
}

impl FilterConfig {
    pub fn new(kind: FilterKind, threshold: f64, max_interval: Timestamp) -> FilterResult<Self> {
        let config = FilterConfig {
            kind,
            threshold,
            max_interval,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FilterResult<()> {
        validate_params(self.threshold, self.max_interval)
    }

    /// Build a fresh compressor. Parameters must have been validated.
    pub(crate) fn build(&self) -> SeriesFilter {
        match self.kind {
            FilterKind::Deadband => {
                SeriesFilter::Deadband(DeadbandFilter::with_params(self.threshold, self.max_interval))
            }
            FilterKind::Hysteresis => SeriesFilter::Hysteresis(HysteresisFilter::with_params(
                self.threshold,
                self.max_interval,
            )),
            FilterKind::Sdt => {
                SeriesFilter::Sdt(SdtFilter::with_params(self.threshold, self.max_interval))
            }
        }
    }
}

pub(crate) fn validate_params(threshold: f64, max_interval: Timestamp) -> FilterResult<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(FilterError::InvalidParameter(format!(
            "threshold must be a finite non-negative number, got {threshold}"
        )));
    }
    if max_interval <= 0 {
        return Err(FilterError::InvalidParameter(format!(
            "max_interval must be positive, got {max_interval}"
        )));
    }
    Ok(())
}

/// A compression filter of any supported kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[derive(GetSize)]
pub enum SeriesFilter {
    Deadband(DeadbandFilter),
    Hysteresis(HysteresisFilter),
    Sdt(SdtFilter),
}

impl SeriesFilter {
    pub fn new(config: FilterConfig) -> FilterResult<Self> {
        config.validate()?;
        Ok(config.build())
    }

    pub fn kind(&self) -> FilterKind {
        use SeriesFilter::*;
        match self {
            Deadband(_) => FilterKind::Deadband,
            Hysteresis(_) => FilterKind::Hysteresis,
            Sdt(_) => FilterKind::Sdt,
        }
    }
}

impl Filter for SeriesFilter {
    fn filter_point(&mut self, timestamp: Timestamp, value: f64) -> FilterResult<FilterOutput> {
        use SeriesFilter::*;
        match self {
            Deadband(filter) => filter.filter_point(timestamp, value),
            Hysteresis(filter) => filter.filter_point(timestamp, value),
            Sdt(filter) => filter.filter_point(timestamp, value),
        }
    }

    fn flush(&mut self) -> Option<Sample> {
        use SeriesFilter::*;
        match self {
            Deadband(filter) => filter.flush(),
            Hysteresis(filter) => filter.flush(),
            Sdt(filter) => filter.flush(),
        }
    }
}
