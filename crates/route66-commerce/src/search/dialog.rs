//! Keyboard-driven search dialog.

use crate::catalog::{category_name, category_slug, Product};
use crate::events::{EventBus, SelectCategory, StoreEvent};
use crate::focus::FocusTrap;
use crate::search::{LoadState, SearchIndex, MIN_QUERY_LEN};

/// Id of the search text input.
pub const SEARCH_INPUT_ID: &str = "search-input";
/// Id of the close button.
pub const SEARCH_CLOSE_ID: &str = "search-close";

/// Keys the dialog reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Tab { shift: bool },
    Other,
}

/// What a key press did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// Nothing outside the dialog changed.
    None,
    /// Closed without a selection.
    Closed,
    /// A result was chosen and the dialog closed.
    Selected(SelectCategory),
}

/// Element id of a result row.
pub fn result_element_id(product: &Product) -> String {
    format!("search-result-{}", product.id())
}

/// Search overlay with arrow-key navigation and a live region.
pub struct SearchDialog<B> {
    bus: B,
    open: bool,
    query: String,
    results: Vec<Product>,
    active: Option<usize>,
    announcement: String,
    focus: Option<FocusTrap>,
    restore_focus: Option<String>,
}

impl<B: EventBus> SearchDialog<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            open: false,
            query: String::new(),
            results: Vec::new(),
            active: None,
            announcement: String::new(),
            focus: None,
            restore_focus: None,
        }
    }

    /// Open with focus on the input. `trigger` gets focus back on close.
    pub fn open(&mut self, trigger: Option<&str>) {
        if self.open {
            return;
        }
        self.open = true;
        self.query.clear();
        self.results.clear();
        self.active = None;
        self.announcement.clear();
        self.focus = Some(FocusTrap::new(
            [SEARCH_INPUT_ID, SEARCH_CLOSE_ID],
            trigger.map(str::to_string),
        ));
    }

    /// Close without selecting anything.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.active = None;
        self.restore_focus = self.focus.take().and_then(FocusTrap::release);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Product] {
        &self.results
    }

    /// Index of the highlighted result.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Current live-region text.
    pub fn announcement(&self) -> &str {
        &self.announcement
    }

    /// Element holding focus inside the dialog.
    pub fn focused_element(&self) -> Option<&str> {
        self.focus.as_ref().and_then(FocusTrap::current)
    }

    /// Element to refocus after closing, consumed once.
    pub fn take_restore_focus(&mut self) -> Option<String> {
        self.restore_focus.take()
    }

    /// Update the query and recompute results from `index`.
    pub fn set_query(&mut self, index: &SearchIndex, query: &str) {
        self.query = query.to_string();
        self.results = index.search(query).into_iter().cloned().collect();
        self.active = None;

        let mut elements = vec![SEARCH_INPUT_ID.to_string()];
        elements.extend(self.results.iter().map(result_element_id));
        elements.push(SEARCH_CLOSE_ID.to_string());
        if let Some(trap) = self.focus.as_mut() {
            trap.set_elements(elements);
            trap.focus(SEARCH_INPUT_ID);
        }

        self.announcement = match index.state() {
            LoadState::Idle | LoadState::Fetching => "Loading products…".to_string(),
            LoadState::Failed(_) => index.error_message().unwrap_or_default().to_string(),
            LoadState::Ready if query.trim().chars().count() < MIN_QUERY_LEN => String::new(),
            LoadState::Ready => match self.results.len() {
                0 => format!("No products found for \"{}\"", query.trim()),
                1 => "1 result".to_string(),
                n => format!("{} results", n),
            },
        };
    }

    /// Handle a key press while open.
    pub fn handle_key(&mut self, key: Key) -> DialogOutcome {
        if !self.open {
            return DialogOutcome::None;
        }

        match key {
            Key::ArrowDown => {
                self.move_active(true);
                DialogOutcome::None
            }
            Key::ArrowUp => {
                self.move_active(false);
                DialogOutcome::None
            }
            Key::Enter => match self.focused_result().or(self.active) {
                Some(index) => self.select(index),
                None => DialogOutcome::None,
            },
            Key::Escape => {
                self.close();
                DialogOutcome::Closed
            }
            Key::Tab { shift } => {
                if let Some(trap) = self.focus.as_mut() {
                    trap.tab(shift);
                }
                self.active = self.focused_result();
                DialogOutcome::None
            }
            Key::Other => DialogOutcome::None,
        }
    }

    /// Choose a result directly (click).
    pub fn select(&mut self, index: usize) -> DialogOutcome {
        let Some(product) = self.results.get(index) else {
            return DialogOutcome::None;
        };

        let category = category_name(product).to_string();
        let detail = SelectCategory {
            category_slug: Some(category_slug(&category)),
            category_name: Some(category.clone()),
            product_id: Some(product.id()),
        };
        self.announcement = format!("Showing {} in {}", product.name, category);

        self.close();
        self.bus.publish(StoreEvent::SelectCategory(detail.clone()));
        DialogOutcome::Selected(detail)
    }

    /// Result row holding focus, if any.
    fn focused_result(&self) -> Option<usize> {
        let focused = self.focused_element()?;
        self.results
            .iter()
            .position(|product| result_element_id(product) == focused)
    }

    fn move_active(&mut self, down: bool) {
        let len = self.results.len();
        if len == 0 {
            return;
        }
        let next = match (self.active, down) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.active = Some(next);
        let element = result_element_id(&self.results[next]);
        if let Some(trap) = self.focus.as_mut() {
            trap.focus(&element);
        }
        self.announcement = self.results[next].name.clone();
    }
}
