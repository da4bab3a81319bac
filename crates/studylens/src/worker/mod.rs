pub mod job;
pub mod pool;

pub use job::{JobResult, PipelineJob};
pub use pool::WorkerPool;
