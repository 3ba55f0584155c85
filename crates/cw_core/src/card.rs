//! Board cards and their per-viewer classification

use cw_common::Group;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a card should be presented to the local viewer.
///
/// Serialized as a flag map such as `{"red": true, "spy": false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct CardClass {
    /// Group shown on the card face, `None` while hidden
    pub group: Option<Group>,
    /// Shown only because the viewer is a spymaster
    pub spy: bool,
    pub blank: bool,
}

impl CardClass {
    pub fn derive(group: Group, revealed: bool, viewer_is_spy: bool) -> Self {
        if revealed {
            Self {
                group: Some(group),
                spy: false,
                blank: false,
            }
        } else if viewer_is_spy {
            Self {
                group: Some(group),
                spy: true,
                blank: false,
            }
        } else {
            Self {
                group: None,
                spy: false,
                blank: true,
            }
        }
    }
}

impl From<BTreeMap<String, bool>> for CardClass {
    fn from(flags: BTreeMap<String, bool>) -> Self {
        let group = flags
            .iter()
            .filter(|(_, on)| **on)
            .find_map(|(key, _)| key.parse::<Group>().ok());

        Self {
            group,
            spy: flags.get("spy").copied().unwrap_or(false),
            blank: flags.get("blank").copied().unwrap_or(false),
        }
    }
}

impl From<CardClass> for BTreeMap<String, bool> {
    fn from(class: CardClass) -> Self {
        let mut flags = BTreeMap::new();
        flags.insert("spy".to_string(), class.spy);
        if let Some(group) = class.group {
            flags.insert(group.as_str().to_string(), true);
        }
        if class.blank {
            flags.insert("blank".to_string(), true);
        }
        flags
    }
}

/// A word on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub name: String,
    pub group: Group,
    pub revealed: bool,
    /// Hold-to-reveal progress in `[0, 1]`
    pub reveal_progress: f64,
    pub visual_class: CardClass,
}

impl Card {
    pub fn new(name: impl Into<String>, group: Group) -> Self {
        Self {
            name: name.into(),
            group,
            revealed: false,
            reveal_progress: 0.0,
            visual_class: CardClass::derive(group, false, false),
        }
    }

    /// Set the revealed flag; progress always drops back to zero
    pub fn set_revealed(&mut self, revealed: bool, viewer_is_spy: bool) {
        self.revealed = revealed;
        self.reveal_progress = 0.0;
        self.refresh_class(viewer_is_spy);
    }

    pub fn refresh_class(&mut self, viewer_is_spy: bool) {
        self.visual_class = CardClass::derive(self.group, self.revealed, viewer_is_spy);
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.reveal_progress = progress.clamp(0.0, 1.0);
    }
}
