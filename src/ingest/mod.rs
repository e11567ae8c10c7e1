mod line;
mod pipeline;

pub use line::{parse_line, LineRecord};
pub use pipeline::{FilterPipeline, FilteredPoint};
