//! Step descriptor and its parts.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use super::StepId;
use crate::dom::{Document, Element, Selector};
use crate::error::TourError;

/// Side of the anchor element the step attaches to.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Side::Top),
            "bottom" => Ok(Side::Bottom),
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            _ => Err(format!("Invalid side: {s}")),
        }
    }
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

type ResolveFn = dyn Fn(&dyn Document) -> Option<Element> + Send + Sync;

/// A closure that locates an anchor element at render time.
#[derive(Clone)]
pub struct AnchorResolver(Arc<ResolveFn>);

impl fmt::Debug for AnchorResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnchorResolver(..)")
    }
}

/// Where a step attaches: a selector, or a resolver evaluated when the step
/// is rendered.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub enum Anchor {
    Selector(Selector),
    Resolver(AnchorResolver),
}

impl Anchor {
    /// Builds a resolver anchor.
    pub fn resolver<F>(resolve: F) -> Self
    where
        F: Fn(&dyn Document) -> Option<Element> + Send + Sync + 'static,
    {
        Anchor::Resolver(AnchorResolver(Arc::new(resolve)))
    }

    /// Finds the anchor element in `document`, if it is currently present.
    pub fn resolve(&self, document: &dyn Document) -> Option<Element> {
        match self {
            Anchor::Selector(selector) => document.query_selector(selector),
            Anchor::Resolver(AnchorResolver(resolve)) => resolve(document),
        }
    }

    /// The selector, when the anchor is selector-based.
    pub fn selector(&self) -> Option<&Selector> {
        match self {
            Anchor::Selector(selector) => Some(selector),
            Anchor::Resolver(_) => None,
        }
    }
}

impl From<Selector> for Anchor {
    fn from(selector: Selector) -> Self {
        Anchor::Selector(selector)
    }
}

impl TryFrom<String> for Anchor {
    type Error = TourError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Selector::parse(&value).map(Anchor::Selector)
    }
}

/// Auto-advance the tour when the user performs `event` on an element
/// matching `selector`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NavigationTrigger {
    pub selector: Selector,
    pub event: String,
}

/// What a step button does when pressed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ButtonAction {
    /// Advance to the next step (completes the tour on the last step).
    Next,
    /// Complete the tour.
    Complete,
    /// Click `selector` on the page, completing the tour first when
    /// `complete` is set, otherwise advancing.
    Follow {
        selector: Selector,
        #[serde(default)]
        complete: bool,
    },
}

/// A button rendered with a step.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StepButton {
    pub text: String,
    #[serde(flatten)]
    pub action: ButtonAction,
}

impl StepButton {
    pub fn new(text: impl Into<String>, action: ButtonAction) -> Self {
        Self {
            text: text.into(),
            action,
        }
    }
}

/// One step of a tour. Immutable once loaded into a catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct StepDescriptor {
    pub id: StepId,
    pub title: String,
    pub text: String,
    pub anchor: Anchor,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub buttons: Vec<StepButton>,
    /// Advances the tour when the user performs the expected action.
    #[serde(default)]
    pub advance_on: Option<NavigationTrigger>,
    /// The step is not rendered before an element matching this exists.
    #[serde(default)]
    pub ready_wait: Option<Selector>,
}

impl StepDescriptor {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        anchor: impl Into<Anchor>,
        side: Side,
    ) -> Self {
        Self {
            id: StepId::new(id),
            title: title.into(),
            text: text.into(),
            anchor: anchor.into(),
            side,
            buttons: Vec::new(),
            advance_on: None,
            ready_wait: None,
        }
    }

    pub fn with_button(mut self, text: impl Into<String>, action: ButtonAction) -> Self {
        self.buttons.push(StepButton::new(text, action));
        self
    }

    pub fn with_advance_on(mut self, selector: Selector, event: impl Into<String>) -> Self {
        self.advance_on = Some(NavigationTrigger {
            selector,
            event: event.into(),
        });
        self
    }

    pub fn with_ready_wait(mut self, selector: Selector) -> Self {
        self.ready_wait = Some(selector);
        self
    }

    /// Looks up a button by its label, ignoring case.
    pub fn button(&self, text: &str) -> Option<&StepButton> {
        self.buttons
            .iter()
            .find(|b| b.text.eq_ignore_ascii_case(text))
    }

    /// Every selector this step references, in a stable order.
    pub fn selectors(&self) -> Vec<&Selector> {
        let mut selectors: Vec<&Selector> = self.anchor.selector().into_iter().collect();
        selectors.extend(self.ready_wait.iter());
        selectors.extend(self.advance_on.iter().map(|t| &t.selector));
        selectors.extend(self.buttons.iter().filter_map(|b| match &b.action {
            ButtonAction::Follow { selector, .. } => Some(selector),
            _ => None,
        }));
        selectors
    }
}
