use shared::ObjectName;

/// Whatever widget owns the current selection. Manipulation reads it, never writes it.
pub trait SelectionProvider {
    fn selected_name(&self) -> Option<&str>;
}

/// Single-object selection, as kept by the object list
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    selected: Option<ObjectName>,
}

impl SelectionState {
    /// Select a single object (replaces the previous selection)
    pub fn select(&mut self, name: impl Into<ObjectName>) {
        self.selected = Some(name.into());
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.as_deref() == Some(name)
    }

    /// Drop the selection if it points at `name` (used when an object is removed)
    pub fn forget(&mut self, name: &str) {
        if self.is_selected(name) {
            self.selected = None;
        }
    }
}

impl SelectionProvider for SelectionState {
    fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_empty() {
        let s = SelectionState::default();
        assert!(s.selected_name().is_none());
    }

    #[test]
    fn test_select_replaces_previous() {
        let mut s = SelectionState::default();
        s.select("a");
        s.select("b");
        assert_eq!(s.selected_name(), Some("b"));
        assert!(!s.is_selected("a"));
    }

    #[test]
    fn test_forget_only_matching() {
        let mut s = SelectionState::default();
        s.select("a");
        s.forget("b");
        assert!(s.is_selected("a"));
        s.forget("a");
        assert!(s.selected_name().is_none());
    }

    #[test]
    fn test_clear() {
        let mut s = SelectionState::default();
        s.select("a");
        s.clear();
        assert!(s.selected_name().is_none());
    }
}
