pub mod backends;
pub mod context;
pub mod error;
pub mod runner;

pub use backends::Backends;
pub use context::{Extracted, Narration, PipelineContext, Summary};
pub use error::{PipelineError, PipelineWarning};
pub use runner::Pipeline;
