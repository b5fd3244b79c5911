//! Animated spinner shown while a request is in flight.

/// Spinner animation frames.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A status-bar spinner that only animates while active.
#[derive(Debug, Clone, Default)]
pub struct Spinner {
    frame: usize,
    active: bool,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the spinner on or off. Turning it on restarts the animation.
    pub fn set_active(&mut self, active: bool) {
        if active && !self.active {
            self.frame = 0;
        }
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the animation. Called on each tick.
    pub fn tick(&mut self) {
        if self.active {
            self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
        }
    }

    /// The current frame, or a blank when idle.
    pub fn frame(&self) -> &'static str {
        if self.active {
            SPINNER_FRAMES[self.frame]
        } else {
            " "
        }
    }

    /// `message` prefixed with the current frame.
    pub fn label(&self, message: &str) -> String {
        format!("{} {}", self.frame(), message)
    }
}
