//! Report synthesis: prompt assembly and the pipeline that drives a run.

pub mod pipeline;
pub mod prompt;

pub use pipeline::{DigestSettings, Pipeline};
