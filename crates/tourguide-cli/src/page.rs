//! One simulated page view.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use tourguide_core::{
    Document, HeadlessEngineFactory, Orchestrator, OrchestratorBuilder, VirtualDocument,
};

use crate::args::PageArgs;

/// Slack added to the wait timeout so the deadline passes before we stop.
const DEADLINE_SLACK: Duration = Duration::from_millis(20);

/// The document, engine and orchestrator of one page view.
pub struct Page {
    pub document: Arc<VirtualDocument>,
    pub engines: Arc<HeadlessEngineFactory>,
    pub orchestrator: Orchestrator,
}

impl Page {
    pub async fn open(builder: OrchestratorBuilder) -> Result<Self> {
        let document = Arc::new(VirtualDocument::new());
        let engines = Arc::new(HeadlessEngineFactory::new(document.clone()));
        let orchestrator = builder
            .build(document.clone(), engines.clone())
            .await
            .context("Failed to initialize orchestrator")?;
        Ok(Self {
            document,
            engines,
            orchestrator,
        })
    }

    /// Fills the document as described by `args`, then loads the page.
    pub fn load(&mut self, args: &PageArgs) -> Result<()> {
        for element in &args.elements {
            self.document
                .insert(element)
                .with_context(|| format!("Failed to add element '{element}'"))?;
        }
        if args.with_anchors {
            self.insert_anchors(&args.path);
        }
        self.orchestrator.load_page(&args.path);
        Ok(())
    }

    fn insert_anchors(&self, path: &str) {
        let Some(tour) = self
            .orchestrator
            .routes()
            .resolve(path)
            .and_then(|id| self.orchestrator.catalog().get(id))
        else {
            return;
        };
        for selector in tour.steps.iter().flat_map(|step| step.selectors()) {
            if self.document.query_selector(selector).is_none() {
                debug!("Adding {selector}");
                self.document.insert_selector(selector);
            }
        }
    }

    /// Processes queued work. When a step is waiting for its element and a
    /// wait timeout is configured, lets the timeout run out.
    pub async fn finish(&mut self) {
        self.orchestrator.settle();
        let timeout = self.orchestrator.config().wait_policy.timeout();
        if let (Some(_), Some(timeout)) = (self.orchestrator.waiting_for(), timeout) {
            self.orchestrator
                .run_until(tokio::time::sleep(timeout + DEADLINE_SLACK))
                .await;
        }
    }

    /// Markdown describing the page: orchestrator state, a pending wait and
    /// the step on screen.
    pub fn report(&self) -> String {
        let mut out = String::new();
        let path = self.orchestrator.path().unwrap_or("(no page)");
        let _ = writeln!(out, "# {path}");
        let _ = writeln!(out);
        let _ = write!(out, "{}", self.orchestrator.state());
        if let Some(selector) = self.orchestrator.waiting_for() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Waiting for `{selector}` to appear.");
        }
        if let Some(step) = self.engines.screen() {
            let _ = writeln!(out);
            let _ = write!(out, "{step}");
        }
        out
    }
}
