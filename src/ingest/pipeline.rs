use crate::common::types::{Labels, Sample, TagPath, Timestamp};
use crate::config::PipelineSettings;
use crate::error::FilterResult;
use crate::filter::{Filter, FilterConfig};
use crate::ingest::line::parse_line;
use crate::tree::{canonical_path, FilterTree};
use ahash::AHashMap;
use tracing::debug;

/// A point released by the pipeline, carrying the series identity it was
/// ingested under.
#[derive(Clone, Debug, PartialEq)]
pub struct FilteredPoint {
    pub measurement: String,
    pub field: String,
    /// Canonical sorted tag path of the series.
    pub tags: TagPath,
    pub sample: Sample,
}

/// Demultiplexes a heterogeneous sample stream into per-(measurement,
/// field, tag path) compressors.
///
/// Each registered (measurement, field) pair owns a [`FilterTree`] whose
/// nodes are created lazily per tag path. Samples for unregistered series
/// pass through verbatim. Not internally synchronised; callers serialize
/// access per series.
#[derive(Debug, Default)]
pub struct FilterPipeline {
    measurements: AHashMap<String, AHashMap<String, FilterTree>>,
    emit_last_value: bool,
}

impl FilterPipeline {
    pub fn new(settings: &PipelineSettings) -> FilterResult<Self> {
        let mut pipeline = FilterPipeline {
            measurements: AHashMap::new(),
            emit_last_value: settings.emit_last_value,
        };
        for rule in &settings.rules {
            pipeline.register(&rule.measurement, &rule.field, rule.filter)?;
        }
        Ok(pipeline)
    }

    /// Compress the given (measurement, field) pair with `config`. Replaces
    /// any previous registration, dropping its accumulated state.
    pub fn register(
        &mut self,
        measurement: &str,
        field: &str,
        config: FilterConfig,
    ) -> FilterResult<()> {
        let tree = FilterTree::new(config)?;
        debug!(measurement, field, kind = %config.kind, "registered series filter");
        self.measurements
            .entry(measurement.to_string())
            .or_default()
            .insert(field.to_string(), tree);
        Ok(())
    }

    /// Admit one sample. Tags are canonicalised internally; producers may
    /// hand them over in any order.
    pub fn push(
        &mut self,
        measurement: &str,
        field: &str,
        tags: &Labels,
        timestamp: Timestamp,
        value: f64,
    ) -> FilterResult<Vec<FilteredPoint>> {
        self.push_sorted(measurement, field, canonical_path(tags), timestamp, value)
    }

    fn push_sorted(
        &mut self,
        measurement: &str,
        field: &str,
        path: TagPath,
        timestamp: Timestamp,
        value: f64,
    ) -> FilterResult<Vec<FilteredPoint>> {
        let Some(tree) = self
            .measurements
            .get_mut(measurement)
            .and_then(|fields| fields.get_mut(field))
        else {
            // No rule covers this series; forward the sample untouched.
            return Ok(vec![FilteredPoint {
                measurement: measurement.to_string(),
                field: field.to_string(),
                tags: path,
                sample: Sample::new(timestamp, value),
            }]);
        };

        let emitted = tree.walk(&path).filter_point(timestamp, value)?;
        Ok(emitted
            .into_iter()
            .map(|sample| FilteredPoint {
                measurement: measurement.to_string(),
                field: field.to_string(),
                tags: path.clone(),
                sample,
            })
            .collect())
    }

    /// Decode one protocol line and admit every field it carries.
    pub fn ingest_line(&mut self, line: &str) -> FilterResult<Vec<FilteredPoint>> {
        let record = parse_line(line)?;
        let mut path = record.tags;
        path.sort();
        let mut released = Vec::new();
        for (field, value) in &record.fields {
            released.extend(self.push_sorted(
                &record.measurement,
                field,
                path.clone(),
                record.timestamp,
                *value,
            )?);
        }
        Ok(released)
    }

    /// End of stream. When configured with `emit_last_value`, flushes every
    /// compressor reachable from every tree and returns the residual
    /// points; otherwise returns nothing. Safe to call repeatedly.
    pub fn finish(&mut self) -> Vec<FilteredPoint> {
        if !self.emit_last_value {
            return Vec::new();
        }
        let mut released = Vec::new();
        for (measurement, fields) in self.measurements.iter_mut() {
            for (field, tree) in fields.iter_mut() {
                for (tags, sample) in tree.flush_all() {
                    released.push(FilteredPoint {
                        measurement: measurement.clone(),
                        field: field.clone(),
                        tags,
                        sample,
                    });
                }
            }
        }
        debug!(count = released.len(), "flushed residual points at end of stream");
        released
    }
}
