//! Confirmation capability used before destructive operations.

/// Asks the user to confirm an action.
pub trait Confirm {
    /// Return `true` to proceed.
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// A fixed answer, for callers that already asked (e.g. through a dialog).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer(pub bool);

impl Confirm for Answer {
    fn confirm(&mut self, _message: &str) -> bool {
        self.0
    }
}
