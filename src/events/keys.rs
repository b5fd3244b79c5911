//! Key hint definitions per input context.

/// The input context that determines which shortcuts apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    /// Browsing the table.
    Viewing,
    /// A row is in edit mode.
    Editing,
    /// A write is waiting for the server.
    Busy,
    /// The entity picker is open.
    EntityPicker,
    /// A confirmation dialog is open.
    Confirm,
    /// The help screen is open.
    Help,
}

/// The one-line shortcut hints for a context.
///
/// Keys are wrapped in brackets so the help bar can style them.
pub fn get_context_hints(context: KeyContext) -> &'static str {
    match context {
        KeyContext::Viewing => {
            "[j/k] move  [e] edit  [d] delete  [r] reload  [t] tables  [?] help  [q] quit"
        }
        KeyContext::Editing => "[Tab] next field  [S-Tab] prev field  [Enter] save  [Esc] cancel",
        KeyContext::Busy => "Saving...  [Esc] stop editing",
        KeyContext::EntityPicker => "[j/k] move  [Enter] open  [Esc] close",
        KeyContext::Confirm => "[y] yes  [n/Esc] no",
        KeyContext::Help => "[Esc/q] close help",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_context_has_hints() {
        for ctx in [
            KeyContext::Viewing,
            KeyContext::Editing,
            KeyContext::Busy,
            KeyContext::EntityPicker,
            KeyContext::Confirm,
            KeyContext::Help,
        ] {
            assert!(!get_context_hints(ctx).is_empty());
        }
    }

    #[test]
    fn test_editing_hints_mention_save_and_cancel() {
        let hints = get_context_hints(KeyContext::Editing);
        assert!(hints.contains("save"));
        assert!(hints.contains("cancel"));
    }
}
