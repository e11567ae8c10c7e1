use crate::common::types::{Labels, Sample, TagPath, Timestamp};
use crate::error::FilterResult;
use crate::filter::{Filter, FilterConfig, FilterOutput, SeriesFilter};
use ahash::AHashMap;
use get_size::GetSize;

/// Canonicalise a producer tag map into the sorted path used for tree
/// descent, so the same tag set always maps to the same node regardless of
/// iteration order upstream.
pub fn canonical_path(tags: &Labels) -> TagPath {
    let mut path: TagPath = tags
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    path.sort();
    path
}

/// Tag-indexed tree of lazily created compressor instances.
///
/// Each node owns one compressor plus a two-level `tag name -> tag value ->
/// child` map. The root doubles as the compressor for the empty tag path:
/// the [`Filter`] impl delegates to the node's own compressor, never to the
/// subtree. Nodes are created on first reference and never reclaimed during
/// a run.
#[derive(Clone, Debug)]
pub struct FilterTree {
    config: FilterConfig,
    filter: SeriesFilter,
    children: AHashMap<String, AHashMap<String, FilterTree>>,
}

impl FilterTree {
    pub fn new(config: FilterConfig) -> FilterResult<Self> {
        config.validate()?;
        Ok(Self::create(config))
    }

    fn create(config: FilterConfig) -> Self {
        FilterTree {
            config,
            filter: config.build(),
            children: AHashMap::new(),
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Descend to the node for `tags`, one level per pair in the order
    /// supplied, creating missing nodes along the way. Callers must sort
    /// the tags first to preserve canonicality (see [`canonical_path`]).
    pub fn walk(&mut self, tags: &[(String, String)]) -> &mut FilterTree {
        let mut node = self;
        for (name, value) in tags {
            let config = node.config;
            node = node
                .children
                .entry(name.clone())
                .or_default()
                .entry(value.clone())
                .or_insert_with(|| FilterTree::create(config));
        }
        node
    }

    /// Pre-order enumeration of every descendant with its accumulated tag
    /// path. The root itself is not included. Order within a level is
    /// unspecified.
    pub fn children(&self) -> Vec<(TagPath, &FilterTree)> {
        let mut nodes = Vec::new();
        self.collect_children(&TagPath::new(), &mut nodes);
        nodes
    }

    fn collect_children<'a>(
        &'a self,
        prefix: &TagPath,
        nodes: &mut Vec<(TagPath, &'a FilterTree)>,
    ) {
        for (name, row) in &self.children {
            for (value, child) in row {
                let mut path = prefix.clone();
                path.push((name.clone(), value.clone()));
                nodes.push((path.clone(), child));
                child.collect_children(&path, nodes);
            }
        }
    }

    /// Flush the compressors of this node and every descendant, returning
    /// the released points with their tag paths.
    pub fn flush_all(&mut self) -> Vec<(TagPath, Sample)> {
        let mut flushed = Vec::new();
        if let Some(sample) = self.filter.flush() {
            flushed.push((TagPath::new(), sample));
        }
        self.flush_children(&TagPath::new(), &mut flushed);
        flushed
    }

    fn flush_children(&mut self, prefix: &TagPath, flushed: &mut Vec<(TagPath, Sample)>) {
        for (name, row) in self.children.iter_mut() {
            for (value, child) in row.iter_mut() {
                let mut path = prefix.clone();
                path.push((name.clone(), value.clone()));
                if let Some(sample) = child.filter.flush() {
                    flushed.push((path.clone(), sample));
                }
                child.flush_children(&path, flushed);
            }
        }
    }

    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.heap_size()
    }

    fn heap_size(&self) -> usize {
        let mut size = self.filter.get_heap_size();
        for (name, row) in &self.children {
            size += name.get_heap_size();
            for (value, child) in row {
                size += value.get_heap_size();
                size += std::mem::size_of::<FilterTree>() + child.heap_size();
            }
        }
        size
    }
}

impl Filter for FilterTree {
    fn filter_point(&mut self, timestamp: Timestamp, value: f64) -> FilterResult<FilterOutput> {
        self.filter.filter_point(timestamp, value)
    }

    fn flush(&mut self) -> Option<Sample> {
        self.filter.flush()
    }
}
