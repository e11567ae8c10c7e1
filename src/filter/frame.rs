use crate::common::types::{Sample, Timestamp};
use crate::error::{FilterError, FilterResult};
use serde::{Deserialize, Serialize};

/// A two-column ordered table of samples, the batch form accepted by
/// [`super::Filter::filter_frame`]. Column names travel with the data and
/// are preserved on output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleFrame {
    pub time_column: String,
    pub value_column: String,
    pub timestamps: Vec<Timestamp>,
    pub values: Vec<f64>,
}

impl SampleFrame {
    pub fn new(time_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        SampleFrame {
            time_column: time_column.into(),
            value_column: value_column.into(),
            timestamps: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_data(
        time_column: impl Into<String>,
        value_column: impl Into<String>,
        timestamps: Vec<Timestamp>,
        values: Vec<f64>,
    ) -> Self {
        SampleFrame {
            time_column: time_column.into(),
            value_column: value_column.into(),
            timestamps,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn push(&mut self, sample: Sample) {
        self.timestamps.push(sample.timestamp);
        self.values.push(sample.value);
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.timestamps
            .iter()
            .zip(self.values.iter())
            .map(|(timestamp, value)| Sample::new(*timestamp, *value))
    }

    /// Both columns must have the same number of rows.
    pub fn validate_shape(&self) -> FilterResult<()> {
        if self.timestamps.len() != self.values.len() {
            return Err(FilterError::InvalidShape(format!(
                "column {:?} has {} rows, column {:?} has {}",
                self.time_column,
                self.timestamps.len(),
                self.value_column,
                self.values.len()
            )));
        }
        Ok(())
    }
}
