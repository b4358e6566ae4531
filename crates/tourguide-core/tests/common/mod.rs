use std::path::Path;
use std::sync::Arc;

use tourguide_core::{HeadlessEngineFactory, Orchestrator, OrchestratorBuilder, VirtualDocument};

/// One simulated page view: a fresh document and engine factory around an
/// orchestrator backed by the progress file at `db_path`.
pub struct PageView {
    pub document: Arc<VirtualDocument>,
    pub engines: Arc<HeadlessEngineFactory>,
    pub orchestrator: Orchestrator,
}

/// Helper function to open an orchestrator for `session` over `db_path`
pub async fn open_page(db_path: &Path, session: &str) -> PageView {
    let document = Arc::new(VirtualDocument::new());
    let engines = Arc::new(HeadlessEngineFactory::new(document.clone()));
    let orchestrator = OrchestratorBuilder::new()
        .with_storage_path(Some(db_path))
        .with_session(session)
        .build(document.clone(), engines.clone())
        .await
        .expect("Failed to create orchestrator");
    PageView {
        document,
        engines,
        orchestrator,
    }
}

/// Loads `path` in a new page view and returns it.
pub async fn visit(db_path: &Path, session: &str, path: &str) -> PageView {
    let mut page = open_page(db_path, session).await;
    page.orchestrator.load_page(path);
    page
}
