use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tourguide_core::{orchestrator::builder::DEFAULT_SESSION, KeyCombo, Selector};

/// Simulate page loads against the guided-tour orchestrator
///
/// Every invocation is one page view in a browsing session: the page's tour is
/// resolved, gated on completion and started or resumed, and the step it
/// displays is printed. Progress is kept in a SQLite file between invocations;
/// completion flags are shared by all sessions, resume cursors are not.
#[derive(Parser)]
#[command(version, about, name = "tourguide")]
pub struct Args {
    /// Path to the SQLite progress file. Defaults to
    /// $XDG_DATA_HOME/tourguide/progress.db
    #[arg(long, global = true)]
    pub storage_file: Option<PathBuf>,

    /// Browsing session whose resume cursors are used
    #[arg(long, global = true, env = "TOURGUIDE_SESSION", default_value = DEFAULT_SESSION)]
    pub session: String,

    /// Tour catalog JSON file to use instead of the built-in tours
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Route table JSON file to use instead of the built-in routes
    #[arg(long, global = true)]
    pub routes: Option<PathBuf>,

    /// Give up waiting for a step's element after this many milliseconds
    /// (0 waits indefinitely)
    #[arg(long, global = true, value_name = "MS")]
    pub wait_timeout_ms: Option<u64>,

    /// Key combination that resets all tours, e.g. ctrl+alt+r
    #[arg(long, global = true, value_name = "COMBO")]
    pub reset_shortcut: Option<KeyCombo>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the tourguide CLI
///
/// Page commands (`visit`, `next`, `complete`, `press`, `trigger`, `key`) load
/// a page first and print what it shows afterwards. The remaining commands
/// inspect or clear progress and data without loading a page.
#[derive(Subcommand)]
pub enum Commands {
    /// Load a page and show its tour step
    #[command(alias = "v")]
    Visit(PageArgs),
    /// Load a page and advance its tour
    #[command(alias = "n")]
    Next(PageArgs),
    /// Load a page and complete its tour
    Complete(PageArgs),
    /// Load a page and press a button of the displayed step
    #[command(alias = "p")]
    Press(PressArgs),
    /// Load a page and perform a user action on an element
    #[command(alias = "t")]
    Trigger(TriggerArgs),
    /// Load a page and press a key combination
    Key(KeyArgs),
    /// Clear progress for one tour or all of them
    Reset(ResetArgs),
    /// Show the progress of every tour
    #[command(alias = "s")]
    Status,
    /// Show which tour a path maps to
    #[command(alias = "r")]
    Resolve {
        /// Path to resolve, query string and fragment allowed
        path: String,
    },
    /// Inspect the tour catalog
    #[command(alias = "c")]
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Forget the session's resume cursors, as closing the browser does
    EndSession,
}

/// The page to load and what it contains.
#[derive(ClapArgs, Clone)]
pub struct PageArgs {
    /// Path of the page, e.g. /s/dashboard
    pub path: String,

    /// Element present on the page, as a selector path; `#tab pre` creates
    /// nested elements. Repeatable.
    #[arg(short = 'e', long = "element", value_name = "SELECTOR")]
    pub elements: Vec<String>,

    /// Add every element the page's tour refers to
    #[arg(long)]
    pub with_anchors: bool,
}

#[derive(ClapArgs)]
pub struct PressArgs {
    #[command(flatten)]
    pub page: PageArgs,
    /// Label of the button, matched ignoring case
    pub button: String,
}

#[derive(ClapArgs)]
pub struct TriggerArgs {
    #[command(flatten)]
    pub page: PageArgs,
    /// Element the action is performed on
    pub selector: Selector,
    /// Event name
    #[arg(long, default_value = "click")]
    pub event: String,
}

#[derive(ClapArgs)]
pub struct KeyArgs {
    #[command(flatten)]
    pub page: PageArgs,
    /// Key combination, e.g. ctrl+alt+r
    pub combo: KeyCombo,
}

#[derive(ClapArgs)]
pub struct ResetArgs {
    /// Only clear the progress of this tour
    #[arg(long)]
    pub tour: Option<String>,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List every tour
    #[command(alias = "ls")]
    List,
    /// Show the steps of a tour
    Show {
        /// Tour id, e.g. dashboardTour
        tour: String,
    },
}
