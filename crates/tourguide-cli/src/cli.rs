//! Command handlers.
//!
//! Page commands follow one shape:
//!
//! ```text
//! PageArgs → Page::load → action → Page::finish → Page::report → renderer
//! ```
//!
//! Progress commands work on the orchestrator's stores directly and print a
//! display wrapper from the core crate.

use anyhow::{bail, Result};
use tourguide_core::{
    display::{ProgressCleared, ProgressReport, TourSummaries},
    ActiveTourSession, Document,
};

use crate::args::{
    CatalogCommands, Commands, KeyArgs, PageArgs, PressArgs, ResetArgs, TriggerArgs,
};
use crate::page::Page;
use crate::renderer::TerminalRenderer;

pub struct Cli {
    page: Page,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(page: Page, renderer: TerminalRenderer) -> Self {
        Self { page, renderer }
    }

    pub async fn handle(mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Visit(args) => self.visit(&args).await,
            Commands::Next(args) => self.next(&args).await,
            Commands::Complete(args) => self.complete(&args).await,
            Commands::Press(args) => self.press(&args).await,
            Commands::Trigger(args) => self.trigger(&args).await,
            Commands::Key(args) => self.key(&args).await,
            Commands::Reset(args) => self.reset(&args),
            Commands::Status => self.status(),
            Commands::Resolve { path } => self.resolve(&path),
            Commands::Catalog { command } => self.catalog(&command),
            Commands::EndSession => self.end_session(),
        }
    }

    async fn visit(&mut self, args: &PageArgs) -> Result<()> {
        self.page.load(args)?;
        self.show_page().await
    }

    async fn next(&mut self, args: &PageArgs) -> Result<()> {
        self.page.load(args)?;
        self.running(args)?.handle().next();
        self.show_page().await
    }

    async fn complete(&mut self, args: &PageArgs) -> Result<()> {
        self.page.load(args)?;
        self.running(args)?.handle().complete();
        self.show_page().await
    }

    async fn press(&mut self, args: &PressArgs) -> Result<()> {
        self.page.load(&args.page)?;
        if !self.running(&args.page)?.press(&args.button) {
            bail!("No button '{}' on the displayed step", args.button);
        }
        self.show_page().await
    }

    async fn trigger(&mut self, args: &TriggerArgs) -> Result<()> {
        self.page.load(&args.page)?;
        if !self.page.document.dispatch(&args.selector, &args.event) {
            bail!(
                "No element matches '{}'; add it with --element",
                args.selector
            );
        }
        self.show_page().await
    }

    async fn key(&mut self, args: &KeyArgs) -> Result<()> {
        self.page.load(&args.page)?;
        self.page.orchestrator.handle_key(args.combo.to_event());
        self.show_page().await
    }

    fn reset(&mut self, args: &ResetArgs) -> Result<()> {
        let cleared = match &args.tour {
            Some(tour) => {
                let tour = self.page.orchestrator.catalog().require(tour)?;
                self.page.orchestrator.progress().reset(&tour.id);
                ProgressCleared::Tour(tour.id.clone())
            }
            None => {
                self.page.orchestrator.reset();
                ProgressCleared::AllTours
            }
        };
        self.renderer.render(&cleared.to_string())
    }

    fn status(&self) -> Result<()> {
        let orchestrator = &self.page.orchestrator;
        let report = ProgressReport(
            orchestrator
                .catalog()
                .tour_ids()
                .iter()
                .map(|id| orchestrator.progress().record(id))
                .collect(),
        );
        self.renderer.render(&format!("# Tour progress\n\n{report}"))
    }

    fn resolve(&self, path: &str) -> Result<()> {
        let output = match self.page.orchestrator.routes().resolve(path) {
            Some(tour) => format!("`{path}` shows **{tour}**\n"),
            None => format!("No tour for `{path}`.\n"),
        };
        self.renderer.render(&output)
    }

    fn catalog(&self, command: &CatalogCommands) -> Result<()> {
        let catalog = self.page.orchestrator.catalog();
        let output = match command {
            CatalogCommands::List => {
                let tours = TourSummaries(catalog.tours().cloned().collect());
                format!("# Tours ({})\n\n{tours}", tours.len())
            }
            CatalogCommands::Show { tour } => catalog.require(tour)?.to_string(),
        };
        self.renderer.render(&output)
    }

    fn end_session(&self) -> Result<()> {
        self.page.orchestrator.progress().end_session();
        self.renderer.render(&ProgressCleared::Session.to_string())
    }

    /// The running tour, or an error naming why nothing runs on the page.
    fn running(&self, args: &PageArgs) -> Result<&ActiveTourSession> {
        match self.page.orchestrator.session() {
            Some(session) => Ok(session),
            None => bail!(
                "No tour is running on {}: {}",
                args.path,
                self.page.orchestrator.state().to_string().trim_end()
            ),
        }
    }

    async fn show_page(&mut self) -> Result<()> {
        self.page.finish().await;
        self.renderer.render(&self.page.report())
    }
}
