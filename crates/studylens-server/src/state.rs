use std::sync::Arc;

use studylens::{Catalog, Pipeline, SubmissionHandler, WorkerPool};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub submissions: Arc<SubmissionHandler>,
    pub catalog: Arc<Catalog>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wires the submission handler and catalog to the pipeline's store and
    /// storage areas, so everything sees the same records and files.
    pub fn new(
        pipeline: &Pipeline,
        pool: Arc<WorkerPool>,
        owner_id: &str,
        max_upload_bytes: usize,
    ) -> Self {
        let submissions = SubmissionHandler::new(
            Arc::clone(pipeline.store()),
            pipeline.uploads().clone(),
            pool,
            owner_id,
            max_upload_bytes,
        );
        let catalog = Catalog::new(
            Arc::clone(pipeline.store()),
            pipeline.artifacts().clone(),
            owner_id,
        );

        Self {
            submissions: Arc::new(submissions),
            catalog: Arc::new(catalog),
            max_upload_bytes,
        }
    }
}
