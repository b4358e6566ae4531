//! Element snapshots handed out by a [`Document`](super::Document).

use std::collections::BTreeMap;
use std::fmt;

use super::selector::Compound;

/// Identifier of a node within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

/// A snapshot of an element: its node identity, tag and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    node: Option<NodeId>,
    tag: String,
    attributes: BTreeMap<String, String>,
}

impl Element {
    /// Creates an element that does not belong to any document.
    pub fn detached(tag: &str, attributes: &[(&str, &str)]) -> Self {
        Self {
            node: None,
            tag: tag.to_ascii_lowercase(),
            attributes: attributes
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Builds the simplest element a compound selector would match. Elements
    /// without a type selector become `div`s.
    pub fn from_compound(compound: &Compound) -> Self {
        let mut attributes: BTreeMap<String, String> = compound
            .attributes
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.clone().unwrap_or_default()))
            .collect();
        if let Some(id) = &compound.id {
            attributes.insert("id".to_string(), id.clone());
        }
        if !compound.classes.is_empty() {
            attributes.insert("class".to_string(), compound.classes.join(" "));
        }

        Self {
            node: None,
            tag: compound.tag.clone().unwrap_or_else(|| "div".to_string()),
            attributes,
        }
    }

    pub(crate) fn attached(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// The node this snapshot was taken from, if attached.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class").unwrap_or_default().split_whitespace()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {name}=\"{value}\"")?;
        }
        write!(f, ">")
    }
}
