//! Focus trapping for modal widgets.

/// Cycles keyboard focus through a fixed list of element ids and remembers
/// which element to refocus when the modal closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTrap {
    elements: Vec<String>,
    current: usize,
    return_to: Option<String>,
}

impl FocusTrap {
    /// Trap focus within `elements`, starting on the first one.
    pub fn new<I, S>(elements: I, return_to: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
            current: 0,
            return_to,
        }
    }

    /// Currently focused element.
    pub fn current(&self) -> Option<&str> {
        self.elements.get(self.current).map(String::as_str)
    }

    /// Tab (or Shift+Tab when `backwards`), wrapping at either end.
    pub fn tab(&mut self, backwards: bool) -> Option<&str> {
        let len = self.elements.len();
        if len == 0 {
            return None;
        }
        self.current = if backwards {
            (self.current + len - 1) % len
        } else {
            (self.current + 1) % len
        };
        self.current()
    }

    /// Move focus to a specific element, if it belongs to the trap.
    pub fn focus(&mut self, id: &str) -> bool {
        match self.elements.iter().position(|e| e == id) {
            Some(pos) => {
                self.current = pos;
                true
            }
            None => false,
        }
    }

    /// Replace the focusable elements, keeping the return target.
    pub fn set_elements<I, S>(&mut self, elements: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements = elements.into_iter().map(Into::into).collect();
        self.current = self.current.min(self.elements.len().saturating_sub(1));
    }

    /// Release the trap, yielding the element that should get focus back.
    pub fn release(self) -> Option<String> {
        self.return_to
    }
}
