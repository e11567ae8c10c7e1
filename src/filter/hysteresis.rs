use crate::common::types::{Sample, Timestamp};
use crate::error::{FilterError, FilterResult};
use crate::filter::{Filter, FilterOutput};
use get_size::GetSize;
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[derive(GetSize)]
struct HysteresisState {
    /// Spread of values observed since the last emission.
    min_value: f64,
    max_value: f64,
    /// Timestamp of the last emitted point. The spread window and the
    /// timeout are both anchored here.
    window_start: Timestamp,
    /// Most recent admitted sample, emitted or not.
    last_point: Sample,
}

/// Spread compressor: samples are suppressed while the running max-min
/// spread since the last emission stays within `threshold` and the window
/// is younger than `max_interval`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[derive(GetSize)]
pub struct HysteresisFilter {
    threshold: f64,
    max_interval: Timestamp,
    state: Option<HysteresisState>,
}

impl HysteresisFilter {
    pub fn new(threshold: f64, max_interval: Timestamp) -> FilterResult<Self> {
        super::validate_params(threshold, max_interval)?;
        Ok(Self::with_params(threshold, max_interval))
    }

    pub(crate) fn with_params(threshold: f64, max_interval: Timestamp) -> Self {
        HysteresisFilter {
            threshold,
            max_interval,
            state: None,
        }
    }
}

impl Filter for HysteresisFilter {
    fn filter_point(&mut self, timestamp: Timestamp, value: f64) -> FilterResult<FilterOutput> {
        let sample = Sample::new(timestamp, value);

        let Some(state) = self.state.as_mut() else {
            self.state = Some(HysteresisState {
                min_value: value,
                max_value: value,
                window_start: timestamp,
                last_point: sample,
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

        if timestamp - state.window_start > self.max_interval {
            // Release the last suppressed sample and restart the spread
            // from it. window_start equals last_point.timestamp exactly
            // when nothing was suppressed since the last emission.
            if state.last_point.timestamp > state.window_start {
                emitted.push(state.last_point);
            }
            state.window_start = state.last_point.timestamp;
            state.min_value = state.last_point.value;
            state.max_value = state.last_point.value;
        }

        state.min_value = state.min_value.min(value);
        state.max_value = state.max_value.max(value);

        if state.max_value - state.min_value > self.threshold
            || timestamp - state.window_start > self.max_interval
        {
            emitted.push(sample);
            state.window_start = timestamp;
            state.min_value = value;
            state.max_value = value;
        }

        state.last_point = sample;
        Ok(emitted)
    }

    fn flush(&mut self) -> Option<Sample> {
        let state = self.state.as_mut()?;
        if state.last_point.timestamp <= state.window_start {
            return None;
        }
        state.window_start = state.last_point.timestamp;
        state.min_value = state.last_point.value;
        state.max_value = state.last_point.value;
        Some(state.last_point)
    }
}
