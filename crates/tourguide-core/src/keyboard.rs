//! Keyboard shortcuts.

use std::fmt;
use std::str::FromStr;

use crate::error::TourError;

/// A key press as delivered by the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

/// A modifier set plus a key, written like `ctrl+alt+r`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub key: String,
}

impl Default for KeyCombo {
    /// `Ctrl+Alt+R`, the reset shortcut.
    fn default() -> Self {
        Self {
            ctrl: true,
            alt: true,
            shift: false,
            meta: false,
            key: "r".to_string(),
        }
    }
}

impl KeyCombo {
    /// Modifiers must match exactly; the key is compared ignoring case.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.ctrl == event.ctrl
            && self.alt == event.alt
            && self.shift == event.shift
            && self.meta == event.meta
            && self.key.eq_ignore_ascii_case(&event.key)
    }

    /// The key event this combination describes.
    pub fn to_event(&self) -> KeyEvent {
        KeyEvent {
            ctrl: self.ctrl,
            alt: self.alt,
            shift: self.shift,
            meta: self.meta,
            key: self.key.clone(),
        }
    }
}

/// Names accepted as modifiers; none of them can be the final key.
const MODIFIER_NAMES: &[&str] = &[
    "ctrl", "control", "alt", "option", "shift", "meta", "cmd", "super",
];

impl FromStr for KeyCombo {
    type Err = TourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TourError::InvalidKeyCombo {
            combo: s.to_string(),
            reason: reason.to_string(),
        };

        let mut combo = KeyCombo {
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
            key: String::new(),
        };
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, modifiers)) = parts.split_last() else {
            return Err(invalid("empty combination"));
        };

        for modifier in modifiers {
            let flag = match modifier.to_lowercase().as_str() {
                "ctrl" | "control" => &mut combo.ctrl,
                "alt" | "option" => &mut combo.alt,
                "shift" => &mut combo.shift,
                "meta" | "cmd" | "super" => &mut combo.meta,
                _ => return Err(invalid(&format!("unknown modifier '{modifier}'"))),
            };
            if *flag {
                return Err(invalid(&format!("modifier '{modifier}' repeated")));
            }
            *flag = true;
        }

        let key = key.to_lowercase();
        if key.is_empty() {
            return Err(invalid("missing key"));
        }
        if MODIFIER_NAMES.contains(&key.as_str()) {
            return Err(invalid(&format!("'{key}' is a modifier, not a key")));
        }
        combo.key = key;
        Ok(combo)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = [
            (self.ctrl, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
        ];
        for (_, name) in modifiers.iter().filter(|(on, _)| *on) {
            write!(f, "{name}+")?;
        }
        write!(f, "{}", self.key.to_uppercase())
    }
}
