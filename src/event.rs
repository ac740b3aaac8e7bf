use crossterm::event::KeyEvent;

/// Terminal input, flattened to what the app reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Periodic wakeup so spinners advance while requests are outstanding.
    Tick,
    Resize,
}
