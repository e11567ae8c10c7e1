use crate::common::types::{Sample, Timestamp};
use crate::error::{FilterError, FilterResult};
use crate::filter::{Filter, FilterOutput};
use get_size::GetSize;
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

/// The open parallelogram envelope. The pivots are offset vertically by
/// ±deviation from the last emitted point; the sloping limits are the
/// tightest pair of gradients seen so far. The envelope stays open while
/// `sloping_upper_max <= sloping_lower_min`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[derive(GetSize)]
struct SdtWindow {
    upper_pivot: Sample,
    lower_pivot: Sample,
    sloping_upper_max: f64,
    sloping_lower_min: f64,
}

impl SdtWindow {
    /// A fresh envelope anchored on `anchor` with no gradient constraints.
    fn open(anchor: Sample, deviation: f64) -> Self {
        SdtWindow {
            upper_pivot: anchor + Sample::new(0, deviation),
            lower_pivot: anchor - Sample::new(0, deviation),
            sloping_upper_max: f64::NEG_INFINITY,
            sloping_lower_min: f64::INFINITY,
        }
    }

    /// An envelope anchored on `anchor` whose sloping limits are seeded
    /// from `origin`, guaranteeing the new envelope contains it. `origin`
    /// is the only seen-but-unemitted sample at reset time.
    fn reopen(origin: Sample, anchor: Sample, deviation: f64) -> Self {
        if origin.timestamp == anchor.timestamp {
            return SdtWindow::open(anchor, deviation);
        }
        let upper_pivot = anchor + Sample::new(0, deviation);
        let lower_pivot = anchor - Sample::new(0, deviation);
        SdtWindow {
            upper_pivot,
            lower_pivot,
            sloping_upper_max: slope(upper_pivot, origin),
            sloping_lower_min: slope(lower_pivot, origin),
        }
    }
}

fn slope(pivot: Sample, sample: Sample) -> f64 {
    (sample.value - pivot.value) / (sample.timestamp - pivot.timestamp) as f64
}

/// Intersection of the boundary line through `pivot` with gradient
/// `boundary_slope` and the segment through the last two samples. Returns
/// None when the lines are parallel.
fn intersect(
    pivot: Sample,
    boundary_slope: f64,
    prev: Sample,
    current: Sample,
) -> Option<Sample> {
    let b1 = pivot.value - boundary_slope * pivot.timestamp as f64;
    let segment_slope =
        (current.value - prev.value) / (current.timestamp - prev.timestamp) as f64;
    let b2 = current.value - segment_slope * current.timestamp as f64;
    let t = (b2 - b1) / (boundary_slope - segment_slope);
    let v = boundary_slope * t + b1;
    if !t.is_finite() || !v.is_finite() {
        return None;
    }
    Some(Sample::new(t.round() as Timestamp, v))
}

/// Swinging-door trending compressor. Maintains a parallelogram envelope of
/// acceptable trends around the last emitted point; a sample that collapses
/// the envelope triggers emission of a constructed interior point and
/// re-anchoring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[derive(GetSize)]
pub struct SdtFilter {
    deviation: f64,
    max_interval: Timestamp,
    window: Option<SdtWindow>,
    /// Most recent admitted sample.
    prev: Option<Sample>,
    /// Timestamp of the most recent emission, the anchor of the current
    /// envelope. Timeouts are measured from here.
    last_emitted: Timestamp,
}

impl SdtFilter {
    pub fn new(compression_deviation: f64, max_interval: Timestamp) -> FilterResult<Self> {
        super::validate_params(compression_deviation, max_interval)?;
        Ok(Self::with_params(compression_deviation, max_interval))
    }

    pub(crate) fn with_params(compression_deviation: f64, max_interval: Timestamp) -> Self {
        SdtFilter {
            deviation: compression_deviation,
            max_interval,
            window: None,
            prev: None,
            last_emitted: 0,
        }
    }
}

impl Filter for SdtFilter {
    fn filter_point(&mut self, timestamp: Timestamp, value: f64) -> FilterResult<FilterOutput> {
        let sample = Sample::new(timestamp, value);

        let Some(prev) = self.prev else {
            self.window = Some(SdtWindow::open(sample, self.deviation));
            self.prev = Some(sample);
            self.last_emitted = timestamp;
            return Ok(smallvec![sample]);
        };

        if timestamp <= prev.timestamp {
            return Err(FilterError::InvalidOrder(prev.timestamp, timestamp));
        }

        let mut emitted = FilterOutput::new();

        // Timeouts take priority over envelope checks.
        if timestamp - self.last_emitted > self.max_interval {
            if prev.timestamp > self.last_emitted {
                emitted.push(prev);
                self.last_emitted = prev.timestamp;
                self.window = Some(SdtWindow::open(prev, self.deviation));
            }
            if timestamp - self.last_emitted > self.max_interval {
                emitted.push(sample);
                self.last_emitted = timestamp;
                self.window = Some(SdtWindow::open(sample, self.deviation));
            }
        }

        if self.last_emitted != timestamp {
            if let Some(window) = self.window.as_mut() {
                let upper_slope = slope(window.upper_pivot, sample);
                let lower_slope = slope(window.lower_pivot, sample);
                let mut collapsed = false;

                if upper_slope > window.sloping_upper_max {
                    window.sloping_upper_max = upper_slope;
                    if window.sloping_upper_max > window.sloping_lower_min {
                        // The envelope collapsed against its lower limit.
                        // The latest certifiable point is the intersection
                        // of the upper boundary with the segment through
                        // the last two samples, dropped to the band
                        // centre. A degenerate intersection (parallel
                        // lines, or one that does not advance the clock)
                        // falls back to the sample itself.
                        let point = match intersect(
                            window.upper_pivot,
                            window.sloping_lower_min,
                            prev,
                            sample,
                        ) {
                            Some(point) if point.timestamp > self.last_emitted => {
                                point - Sample::new(0, self.deviation / 2.0)
                            }
                            _ => sample,
                        };
                        emitted.push(point);
                        self.last_emitted = point.timestamp;
                        *window = SdtWindow::reopen(sample, point, self.deviation);
                        collapsed = true;
                    }
                }

                // Both slopes were measured against the pivots as they
                // were when the sample arrived; once a collapse rebuilds
                // the window they no longer describe it, so at most one
                // collapse fires per sample.
                if !collapsed && lower_slope < window.sloping_lower_min {
                    window.sloping_lower_min = lower_slope;
                    if window.sloping_upper_max > window.sloping_lower_min {
                        let point = match intersect(
                            window.lower_pivot,
                            window.sloping_upper_max,
                            prev,
                            sample,
                        ) {
                            Some(point) if point.timestamp > self.last_emitted => point,
                            _ => sample,
                        };
                        emitted.push(point);
                        self.last_emitted = point.timestamp;
                        *window = SdtWindow::reopen(sample, point, self.deviation);
                    }
                }
            }
        }

        self.prev = Some(sample);
        Ok(emitted)
    }

    fn flush(&mut self) -> Option<Sample> {
        let prev = self.prev?;
        if prev.timestamp <= self.last_emitted {
            return None;
        }
        self.last_emitted = prev.timestamp;
        self.window = Some(SdtWindow::open(prev, self.deviation));
        Some(prev)
    }
}
