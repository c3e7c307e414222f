use crate::task::Quadrant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyHandleResult {
    Consumed,
    Ignored,
    /// Board was mutated and needs saving.
    Changed,
    Edit(String),
    AddTask(Quadrant),
}

/// Key binding listed in the help overlay.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub description: &'static str,
}
