//! Streaming lossy compression for numeric time-series data.
//!
//! Each logical series is reduced online to a sparse subsequence whose
//! piecewise-linear reconstruction stays within a configured error
//! envelope, while no output gap ever exceeds a configured maximum
//! interval. Three policies are provided: [`DeadbandFilter`],
//! [`HysteresisFilter`] and [`SdtFilter`] (swinging-door trending), all
//! behind the [`Filter`] trait. A [`FilterTree`] demultiplexes tagged
//! series onto lazily created per-series compressors, and a
//! [`FilterPipeline`] does the same for a whole (measurement, field,
//! tags) keyed stream, including line-protocol ingestion.

mod common;
mod config;
mod error;
mod filter;
mod ingest;
mod tree;

#[cfg(test)]
mod tests;

pub use common::types::{Labels, Sample, TagPath, Timestamp};
pub use config::{FilterRule, PipelineSettings};
pub use error::{FilterError, FilterResult};
pub use filter::{
    DeadbandFilter, Filter, FilterConfig, FilterKind, FilterOutput, HysteresisFilter, SampleFrame,
    SdtFilter, SeriesFilter,
};
pub use ingest::{parse_line, FilterPipeline, FilteredPoint, LineRecord};
pub use tree::{canonical_path, FilterTree};
