//! Display implementations for domain models.
//!
//! Kept apart from the model definitions. Every implementation writes
//! markdown: headings for tours and steps, bullet lists for metadata and
//! status icons for progress.

use std::fmt;

use crate::engine::RenderedStep;
use crate::models::{
    Anchor, ButtonAction, ProgressRecord, Side, StepButton, StepDescriptor, TourDefinition,
    TourStatus,
};
use crate::orchestrator::OrchestratorState;

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TourStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selector() {
            Some(selector) => write!(f, "`{selector}`"),
            None => write!(f, "(resolved at render time)"),
        }
    }
}

impl fmt::Display for StepButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            ButtonAction::Next => write!(f, "[{}] next", self.text),
            ButtonAction::Complete => write!(f, "[{}] complete", self.text),
            ButtonAction::Follow {
                selector,
                complete: true,
            } => write!(f, "[{}] complete, then click `{selector}`", self.text),
            ButtonAction::Follow { selector, .. } => {
                write!(f, "[{}] click `{selector}`", self.text)
            }
        }
    }
}

impl fmt::Display for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}: {}", self.id, self.title)?;
        writeln!(f)?;
        writeln!(f, "- Anchor: {} ({})", self.anchor, self.side)?;
        if let Some(wait) = &self.ready_wait {
            writeln!(f, "- Waits for: `{wait}`")?;
        }
        if let Some(trigger) = &self.advance_on {
            writeln!(
                f,
                "- Advances on: {} `{}`",
                trigger.event, trigger.selector
            )?;
        }
        for button in &self.buttons {
            writeln!(f, "- Button: {button}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)?;
        Ok(())
    }
}

impl fmt::Display for TourDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.id)?;
        writeln!(f)?;

        if self.steps.is_empty() {
            return writeln!(f, "No steps in this tour.");
        }

        writeln!(f, "## Steps ({})", self.steps.len())?;
        writeln!(f)?;
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ProgressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- **{}**: {}", self.tour_id, self.status().with_icon())?;
        match &self.last_shown_step {
            Some(step) if !self.completed => writeln!(f, " (at {step})"),
            _ => writeln!(f),
        }
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorState::Idle => writeln!(f, "No tour for this page."),
            OrchestratorState::Resolved(tour) => {
                writeln!(f, "Tour **{tour}** is mapped here but cannot run.")
            }
            OrchestratorState::CompletedSkip(tour) => {
                writeln!(f, "Tour **{tour}** was already completed.")
            }
            OrchestratorState::Active {
                tour_id,
                step_id: Some(step),
            } => writeln!(f, "Tour **{tour_id}** is running at {step}."),
            OrchestratorState::Active {
                tour_id,
                step_id: None,
            } => writeln!(f, "Tour **{tour_id}** is waiting for its step."),
            OrchestratorState::Finished(tour) => writeln!(f, "Tour **{tour}** completed."),
        }
    }
}

impl fmt::Display for RenderedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {}", self.title)?;
        writeln!(f)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)?;
        match &self.anchor {
            Some(element) => writeln!(f, "- Attached to: `{element}` ({})", self.side)?,
            None => writeln!(f, "- Attached to: nothing (anchor not on page)")?,
        }
        if !self.buttons.is_empty() {
            let buttons: Vec<String> = self.buttons.iter().map(|b| format!("[{b}]")).collect();
            writeln!(f, "- Buttons: {}", buttons.join(" "))?;
        }
        writeln!(f, "- Step: {}", self.step_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Selector;
    use crate::models::{StepId, TourId};

    fn step() -> StepDescriptor {
        StepDescriptor::new(
            "config2",
            "Tracking",
            "Open the tracking tab.",
            Selector::parse("a[href=\"#trackingconfig\"]").unwrap(),
            Side::Bottom,
        )
        .with_ready_wait(Selector::parse("#trackingconfig").unwrap())
        .with_advance_on(Selector::parse("a[href=\"#trackingconfig\"]").unwrap(), "click")
        .with_button(
            "Settings",
            ButtonAction::Follow {
                selector: Selector::parse("a#mautic_config_index").unwrap(),
                complete: true,
            },
        )
    }

    #[test]
    fn test_step_display() {
        let output = format!("{}", step());
        assert!(output.starts_with("### config2: Tracking\n"));
        assert!(output.contains("- Waits for: `#trackingconfig`"));
        assert!(output.contains("- Advances on: click"));
        assert!(output.contains("[Settings] complete, then click `a#mautic_config_index`"));
        assert!(output.contains("Open the tracking tab."));
    }

    #[test]
    fn test_tour_display() {
        let tour = TourDefinition::new("configTour", vec![step()]);
        let output = format!("{tour}");
        assert!(output.starts_with("# configTour\n"));
        assert!(output.contains("## Steps (1)"));

        let empty = TourDefinition::new("emptyTour", vec![]);
        assert!(format!("{empty}").contains("No steps in this tour."));
    }

    #[test]
    fn test_progress_record_display() {
        let in_progress = ProgressRecord {
            tour_id: TourId::new("segmentsTour"),
            last_shown_step: Some(StepId::new("segments4")),
            completed: false,
        };
        assert_eq!(
            format!("{in_progress}"),
            "- **segmentsTour**: ➤ In Progress (at segments4)\n"
        );

        let done = ProgressRecord {
            completed: true,
            ..in_progress
        };
        assert_eq!(format!("{done}"), "- **segmentsTour**: ✓ Completed\n");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(
            format!("{}", OrchestratorState::Idle),
            "No tour for this page.\n"
        );
        let active = OrchestratorState::Active {
            tour_id: TourId::new("dashboardTour"),
            step_id: Some(StepId::new("dashboard2")),
        };
        assert!(format!("{active}").contains("running at dashboard2"));
    }

    #[test]
    fn test_rendered_step_display() {
        let rendered = RenderedStep {
            step_id: StepId::new("config2"),
            title: "Tracking".to_string(),
            text: "Open the tracking tab.".to_string(),
            side: Side::Bottom,
            anchor: None,
            buttons: vec!["Settings".to_string()],
        };
        let output = format!("{rendered}");
        assert!(output.contains("anchor not on page"));
        assert!(output.contains("- Buttons: [Settings]"));
    }
}
