use super::area::{Hotspot, HotspotKind};
use super::inventory::Inventory;

/// One paragraph of a prompt body
#[derive(Debug, Clone, PartialEq)]
pub enum PromptLine {
    Text(String),
    /// "Requires: <item>", the item name is emphasized
    Requirement(String),
}

/// What the primary button does
#[derive(Debug, Clone, PartialEq)]
pub enum PromptAction {
    Take { hotspot_id: String, item: String },
    EnterNext,
    Close,
}

/// A modal question. While one is open the world does not step
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub title: String,
    pub body: Vec<PromptLine>,
    pub primary_label: &'static str,
    pub action: PromptAction,
}

fn text_or(text: &Option<String>, fallback: &str) -> PromptLine {
    PromptLine::Text(text.clone().unwrap_or_else(|| fallback.to_string()))
}

/// Builds the prompt for interacting with `hotspot`
pub fn resolve(hotspot: &Hotspot, inventory: &Inventory) -> Prompt {
    let title = hotspot.label.clone();
    match hotspot.kind {
        HotspotKind::Pickup => Prompt {
            title,
            body: vec![
                text_or(&hotspot.text, "You pick it up."),
                PromptLine::Text("Add to inventory?".into()),
            ],
            primary_label: "Take",
            action: PromptAction::Take {
                hotspot_id: hotspot.id.clone(),
                item: hotspot.item.clone().unwrap_or_else(|| hotspot.label.clone()),
            },
        },
        HotspotKind::Door if !hotspot.is_locked(inventory) => Prompt {
            title,
            body: vec![text_or(&hotspot.success_text, "The door opens.")],
            primary_label: "Enter",
            action: PromptAction::EnterNext,
        },
        HotspotKind::Door => {
            let mut body = vec![text_or(&hotspot.fail_text, "It is locked.")];
            body.extend(hotspot.requires.clone().map(PromptLine::Requirement));
            Prompt {
                title,
                body,
                primary_label: "OK",
                action: PromptAction::Close,
            }
        }
        HotspotKind::Inspect => Prompt {
            title,
            body: vec![text_or(&hotspot.text, "You take a closer look.")],
            primary_label: "Close",
            action: PromptAction::Close,
        },
    }
}
