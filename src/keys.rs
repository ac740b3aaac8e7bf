use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Message, Mode};

/// A declarative keybinding map that can be composed and extended.
#[derive(Clone)]
pub struct Keymap {
    bindings: Vec<(KeyCode, KeyModifiers, Message)>,
}

impl Keymap {
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Add a key binding with no modifiers.
    pub fn bind(mut self, code: KeyCode, message: Message) -> Self {
        self.bindings.push((code, KeyModifiers::NONE, message));
        self
    }

    /// Add a key binding with Ctrl modifier.
    pub fn bind_ctrl(mut self, code: KeyCode, message: Message) -> Self {
        self.bindings.push((code, KeyModifiers::CONTROL, message));
        self
    }

    /// Look up a message for a key event.
    /// Later bindings take precedence over earlier ones.
    pub fn get(&self, event: &KeyEvent) -> Option<Message> {
        self.bindings
            .iter()
            .rev()
            .find(|(code, mods, _)| *code == event.code && event.modifiers.contains(*mods))
            .map(|(_, _, msg)| msg.clone())
    }

    /// Extend this keymap with another. The other keymap's bindings take precedence.
    pub fn extend(mut self, other: Self) -> Self {
        self.bindings.extend(other.bindings);
        self
    }

    /// Find the first key bound to a specific message.
    pub fn find_key(&self, message: &Message) -> Option<(KeyCode, KeyModifiers)> {
        self.bindings
            .iter()
            .find(|(_, _, msg)| msg == message)
            .map(|(code, mods, _)| (*code, *mods))
    }
}

/// Format a key binding for display in help text.
pub fn format_key(code: KeyCode, mods: KeyModifiers) -> String {
    let key_str = match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        _ => "?".to_string(),
    };
    if mods.contains(KeyModifiers::CONTROL) {
        format!("C-{key_str}")
    } else {
        key_str
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys that work whenever the viewer is not typing.
pub fn global_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('q'), Message::Quit)
        .bind_ctrl(KeyCode::Char('c'), Message::Quit)
        .bind(KeyCode::Char('`'), Message::ToggleDebug)
        .bind(KeyCode::Char('?'), Message::ToggleHelp)
}

/// Browsing the feed.
pub fn feed_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('j'), Message::SelectNext)
        .bind(KeyCode::Down, Message::SelectNext)
        .bind(KeyCode::Char('k'), Message::SelectPrev)
        .bind(KeyCode::Up, Message::SelectPrev)
        .bind(KeyCode::Char('g'), Message::SelectFirst)
        .bind(KeyCode::Char('G'), Message::SelectLast)
        .bind_ctrl(KeyCode::Char('d'), Message::PageDown)
        .bind_ctrl(KeyCode::Char('u'), Message::PageUp)
        .bind(KeyCode::Char('n'), Message::NextComment)
        .bind(KeyCode::Char('p'), Message::PrevComment)
        .bind(KeyCode::Char('l'), Message::ToggleLike)
        .bind(KeyCode::Enter, Message::ActivateMedia)
        .bind(KeyCode::Char('c'), Message::StartCompose)
        .bind(KeyCode::Char('x'), Message::DeleteComment)
        .bind(KeyCode::Char('o'), Message::OpenPost)
        .bind(KeyCode::Char('O'), Message::OpenOwner)
        .bind(KeyCode::Char('r'), Message::Refresh)
}

/// Typing a comment. Unbound characters become draft input.
pub fn compose_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Enter, Message::SubmitComment)
        .bind(KeyCode::Esc, Message::CancelCompose)
        .bind_ctrl(KeyCode::Char('c'), Message::CancelCompose)
        .bind(KeyCode::Backspace, Message::ComposeBackspace)
}

pub fn keymap_for(mode: Mode) -> Keymap {
    match mode {
        Mode::Browse => feed_keymap().extend(global_keymap()),
        Mode::Compose => compose_keymap(),
    }
}

pub fn handle_key(key: KeyEvent, app: &App) -> Option<Message> {
    if let Some(msg) = keymap_for(app.mode).get(&key) {
        return Some(msg);
    }
    match (app.mode, key.code) {
        (Mode::Compose, KeyCode::Char(c))
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(Message::ComposeInput(c))
        }
        _ => None,
    }
}
