//! Hover and click handling for the anomaly layers.
//!
//! Renderers report picks by record id; [`crate::AnomalyLayers`] resolves
//! the id to the underlying record and hands it to [`LayerCallbacks`].
//! [`AnomalyInspector`] is the stock consumer: hover updates the
//! "currently inspected" record, click opens the details view.

use std::{cell::RefCell, rc::Rc};

type HoverFn<T> = Box<dyn FnMut(Option<&T>)>;
type ClickFn<T> = Box<dyn FnMut(&T)>;

/// Optional hover and click handlers.
pub struct LayerCallbacks<T> {
    on_hover: Option<HoverFn<T>>,
    on_click: Option<ClickFn<T>>,
}

impl<T> Default for LayerCallbacks<T> {
    fn default() -> Self {
        Self {
            on_hover: None,
            on_click: None,
        }
    }
}

impl<T> LayerCallbacks<T> {
    /// Sets the hover handler. It receives `None` when the pointer leaves
    /// every marker.
    #[must_use]
    pub fn on_hover(mut self, f: impl FnMut(Option<&T>) + 'static) -> Self {
        self.on_hover = Some(Box::new(f));
        self
    }

    /// Sets the click handler.
    #[must_use]
    pub fn on_click(mut self, f: impl FnMut(&T) + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }

    pub(crate) fn hovered(&mut self, record: Option<&T>) {
        if let Some(f) = &mut self.on_hover {
            f(record);
        }
    }

    pub(crate) fn clicked(&mut self, record: &T) {
        if let Some(f) = &mut self.on_click {
            f(record);
        }
    }
}

impl<T: Clone + 'static> LayerCallbacks<T> {
    /// Routes hover and click into a shared [`AnomalyInspector`].
    #[must_use]
    pub fn inspecting(inspector: &Rc<RefCell<AnomalyInspector<T>>>) -> Self {
        let hover_target = Rc::clone(inspector);
        let click_target = Rc::clone(inspector);

        Self::default()
            .on_hover(move |record| hover_target.borrow_mut().hover(record))
            .on_click(move |record| click_target.borrow_mut().open_details(record))
    }
}

/// Hover and details-panel state for one view.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyInspector<T> {
    hovered: Option<T>,
    details: Option<T>,
}

impl<T> Default for AnomalyInspector<T> {
    fn default() -> Self {
        Self {
            hovered: None,
            details: None,
        }
    }
}

impl<T: Clone> AnomalyInspector<T> {
    /// Creates an inspector with nothing hovered and the details view closed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an inspector behind `Rc<RefCell<_>>` for use with
    /// [`LayerCallbacks::inspecting`].
    #[must_use]
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Sets (or clears) the currently inspected record.
    pub fn hover(&mut self, record: Option<&T>) {
        self.hovered = record.cloned();
    }

    /// Opens the details view for `record`.
    pub fn open_details(&mut self, record: &T) {
        self.details = Some(record.clone());
    }

    /// Closes the details view.
    pub fn close_details(&mut self) {
        self.details = None;
    }

    /// Currently inspected record.
    #[must_use]
    pub const fn hovered(&self) -> Option<&T> {
        self.hovered.as_ref()
    }

    /// Record shown in the details view, if open.
    #[must_use]
    pub const fn details(&self) -> Option<&T> {
        self.details.as_ref()
    }

    /// Whether the details view is open.
    #[must_use]
    pub const fn is_details_open(&self) -> bool {
        self.details.is_some()
    }
}
