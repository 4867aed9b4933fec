//! Action resolution - maps free text onto a catalog action
//!
//! Used for operator prompts and for the action named in an oracle reply.
//! Matching is case-insensitive: an exact name wins, then the longest catalog
//! name found inside the text, then the first catalog name that contains the
//! text.

use crate::actions::catalog::{Action, ActionCatalog};

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Exact(Action),
    Substring(Action),
    Unresolved,
}

impl Resolution {
    pub fn action(&self) -> Option<&Action> {
        match self {
            Resolution::Exact(action) | Resolution::Substring(action) => Some(action),
            Resolution::Unresolved => None,
        }
    }

    pub fn into_action(self) -> Option<Action> {
        match self {
            Resolution::Exact(action) | Resolution::Substring(action) => Some(action),
            Resolution::Unresolved => None,
        }
    }
}

/// Phrases that explicitly mean "do nothing"
const NO_ACTION: [&str; 3] = ["no action", "none", "nothing"];

pub fn resolve(catalog: &ActionCatalog, text: &str) -> Resolution {
    let wanted = text.trim().to_lowercase();
    if wanted.is_empty() || NO_ACTION.contains(&wanted.as_str()) {
        return Resolution::Unresolved;
    }

    if let Some(action) = catalog.get(&wanted) {
        return Resolution::Exact(action.clone());
    }

    let contained = catalog
        .iter()
        .filter(|a| wanted.contains(&a.name.to_lowercase()))
        .fold(None, |best: Option<&Action>, a| match best {
            Some(b) if b.name.len() >= a.name.len() => Some(b),
            _ => Some(a),
        });
    if let Some(action) = contained {
        return Resolution::Substring(action.clone());
    }

    catalog
        .iter()
        .find(|a| a.name.to_lowercase().contains(&wanted))
        .map(|a| Resolution::Substring(a.clone()))
        .unwrap_or(Resolution::Unresolved)
}
