use crate::error::FilterResult;
use crate::filter::FilterConfig;
use serde::{Deserialize, Serialize};

/// Maps one (measurement, field) pair to the compressor configuration its
/// series are filtered with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub measurement: String,
    pub field: String,
    pub filter: FilterConfig,
}

/// Configuration of a [`crate::ingest::FilterPipeline`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// When true the driver flushes every reachable compressor at end of
    /// stream so the last value of each series is never lost.
    #[serde(default)]
    pub emit_last_value: bool,

    #[serde(default)]
    pub rules: Vec<FilterRule>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            emit_last_value: false,
            rules: Vec::new(),
        }
    }
}

impl PipelineSettings {
    pub fn validate(&self) -> FilterResult<()> {
        for rule in &self.rules {
            rule.filter.validate()?;
        }
        Ok(())
    }
}
