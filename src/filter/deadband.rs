use crate::common::types::{Sample, Timestamp};
use crate::error::{FilterError, FilterResult};
use crate::filter::{Filter, FilterOutput};
use get_size::GetSize;
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[derive(GetSize)]
struct DeadbandState {
    /// Last emitted reference point. The band is centred on its value.
    base: Sample,
    /// Most recent admitted sample, emitted or not.
    last_point: Sample,
    /// Most recent suppressed sample. Released by a later timeout or by
    /// `flush`, so a long flat run is never silently dropped.
    pending: Option<Sample>,
}

/// Constant-band compressor: a sample is suppressed while its value stays
/// within `threshold` of the last emitted value and the elapsed time since
/// the last emission stays within `max_interval`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[derive(GetSize)]
pub struct DeadbandFilter {
    threshold: f64,
    max_interval: Timestamp,
    state: Option<DeadbandState>,
}

impl DeadbandFilter {
    pub fn new(threshold: f64, max_interval: Timestamp) -> FilterResult<Self> {
        super::validate_params(threshold, max_interval)?;
        Ok(Self::with_params(threshold, max_interval))
    }

    pub(crate) fn with_params(threshold: f64, max_interval: Timestamp) -> Self {
        DeadbandFilter {
            threshold,
            max_interval,
            state: None,
        }
    }
}

impl Filter for DeadbandFilter {
    fn filter_point(&mut self, timestamp: Timestamp, value: f64) -> FilterResult<FilterOutput> {
        let sample = Sample::new(timestamp, value);

        let Some(state) = self.state.as_mut() else {
            // The first sample is always emitted and anchors the band.
            self.state = Some(DeadbandState {
                base: sample,
                last_point: sample,
                pending: None,
            });
            return Ok(smallvec![sample]);
        };

        if timestamp <= state.last_point.timestamp {
            return Err(FilterError::InvalidOrder(
                state.last_point.timestamp,
                timestamp,
            ));
        }

        let mut emitted = FilterOutput::new();

        if timestamp - state.base.timestamp > self.max_interval {
            // Release the suppressed run before it grows older than the
            // permitted gap.
            if let Some(pending) = state.pending.take() {
                emitted.push(pending);
                state.base = pending;
            }
        }

        let outside = (value - state.base.value).abs() > self.threshold;
        if outside || timestamp - state.base.timestamp > self.max_interval {
            emitted.push(sample);
            state.base = sample;
            state.pending = None;
        } else {
            state.pending = Some(sample);
        }

        state.last_point = sample;
        Ok(emitted)
    }

    fn flush(&mut self) -> Option<Sample> {
        let state = self.state.as_mut()?;
        let pending = state.pending.take()?;
        state.base = pending;
        Some(pending)
    }
}
