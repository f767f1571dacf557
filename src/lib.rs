pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod load;
pub mod pipeline;
pub mod schema;
pub mod utils;
pub mod write;

pub use error::PipelineError;
