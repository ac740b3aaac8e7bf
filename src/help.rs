//! Dynamic help text generation from keymaps.

use crate::app::Message;
use crate::keys::{Keymap, format_key};

/// A single help item representing one or more related actions.
pub struct HelpItem {
    /// Messages to look up keys for. Keys are joined with "/".
    messages: Vec<Message>,
    label: &'static str,
}

impl HelpItem {
    pub fn new(message: Message, label: &'static str) -> Self {
        Self {
            messages: vec![message],
            label,
        }
    }

    /// Create a help item for paired actions (e.g., j/k for next/prev).
    pub fn pair(first: Message, second: Message, label: &'static str) -> Self {
        Self {
            messages: vec![first, second],
            label,
        }
    }

    /// Format this help item using the given keymap.
    /// Returns None if no keys are bound for any of the messages.
    pub fn format(&self, keymap: &Keymap) -> Option<String> {
        let keys: Vec<String> = self
            .messages
            .iter()
            .filter_map(|msg| {
                keymap
                    .find_key(msg)
                    .map(|(code, mods)| format_key(code, mods))
            })
            .collect();
        if keys.is_empty() {
            return None;
        }
        Some(format!("{}:{}", keys.join("/"), self.label))
    }
}

/// A collection of help items for a specific context.
pub struct HelpConfig {
    /// Items to show in expanded (full help) mode.
    pub expanded: Vec<HelpItem>,
    /// Items to show in compact (minimal) mode.
    pub compact: Vec<HelpItem>,
}

impl HelpConfig {
    /// Format help text for the given mode.
    pub fn format(&self, keymap: &Keymap, show_expanded: bool) -> String {
        let items = if show_expanded {
            &self.expanded
        } else {
            &self.compact
        };
        items
            .iter()
            .filter_map(|item| item.format(keymap))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

pub fn feed_help() -> HelpConfig {
    use Message::{
        ActivateMedia, DeleteComment, NextComment, OpenOwner, OpenPost, PrevComment, Quit,
        Refresh, SelectFirst, SelectLast, SelectNext, SelectPrev, StartCompose, ToggleDebug,
        ToggleHelp, ToggleLike,
    };
    HelpConfig {
        expanded: vec![
            HelpItem::pair(SelectNext, SelectPrev, "nav"),
            HelpItem::pair(SelectFirst, SelectLast, "top/bottom"),
            HelpItem::pair(NextComment, PrevComment, "comments"),
            HelpItem::new(ToggleLike, "like"),
            HelpItem::new(ActivateMedia, "double-tap"),
            HelpItem::new(StartCompose, "comment"),
            HelpItem::new(DeleteComment, "delete"),
            HelpItem::pair(OpenPost, OpenOwner, "open post/owner"),
            HelpItem::new(Refresh, "refresh"),
            HelpItem::new(ToggleDebug, "debug"),
            HelpItem::new(Quit, "quit"),
            HelpItem::new(ToggleHelp, "hide"),
        ],
        compact: vec![
            HelpItem::new(ToggleLike, "like"),
            HelpItem::new(StartCompose, "comment"),
            HelpItem::new(ToggleHelp, "help"),
            HelpItem::new(Quit, "quit"),
        ],
    }
}

pub fn compose_help() -> HelpConfig {
    use Message::{CancelCompose, SubmitComment};
    HelpConfig {
        expanded: vec![
            HelpItem::new(SubmitComment, "post"),
            HelpItem::new(CancelCompose, "cancel"),
        ],
        compact: vec![
            HelpItem::new(SubmitComment, "post"),
            HelpItem::new(CancelCompose, "cancel"),
        ],
    }
}
