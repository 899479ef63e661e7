// File: src/bind.rs
// Purpose: Project an error report onto error slots of a view

use std::collections::HashMap;

use crate::report::ErrorReport;

pub const DEFAULT_SEPARATOR: &str = "\n";

/// A node that displays the errors of one field (or one element of it).
pub trait ErrorSlot {
    fn set_active(&mut self, active: bool);
    fn set_text(&mut self, text: &str);
}

/// The error namespace of a view: one slot per field, optionally one per
/// element index. The report never creates slots, it only fills the ones
/// the view already has.
pub trait ErrorView {
    /// The slot for `field`, or for its element `index` when given.
    fn slot_mut(&mut self, field: &str, index: Option<usize>) -> Option<&mut dyn ErrorSlot>;
}

/// What [`ErrorReport::bind`] should touch
#[derive(Debug, Clone, Copy, Default)]
pub struct BindOptions<'a> {
    /// Only this field. All declared fields when `None`.
    pub field: Option<&'a str>,
    /// Only this element of `field`
    pub index: Option<usize>,
    /// Joins multiple messages, `"\n"` by default
    pub separator: Option<&'a str>,
}

impl<'a> BindOptions<'a> {
    pub fn field(field: &'a str) -> Self {
        Self {
            field: Some(field),
            ..Self::default()
        }
    }

    pub fn element(field: &'a str, index: usize) -> Self {
        Self {
            field: Some(field),
            index: Some(index),
            ..Self::default()
        }
    }

    pub fn separator(mut self, separator: &'a str) -> Self {
        self.separator = Some(separator);
        self
    }
}

impl ErrorReport {
    /// Write messages into the view's error slots.
    ///
    /// A slot with messages gets their joined text and becomes active; a slot
    /// without gets empty text and becomes inactive. Slots the view does not
    /// have are skipped.
    pub fn bind(&self, view: &mut dyn ErrorView, options: &BindOptions<'_>) {
        let separator = options.separator.unwrap_or(DEFAULT_SEPARATOR);

        match options.field {
            Some(field) => {
                self.bind_field(view, field, options.index, separator);
            }
            None => {
                for field in self.fields() {
                    match self.element_count(field) {
                        Some(count) if count > 0 => {
                            let mut fell_back = false;
                            for index in 0..count {
                                fell_back |= self.bind_field(view, field, Some(index), separator);
                            }
                            // Whole-collection violations carry no index and
                            // belong on the field slot.
                            if !fell_back {
                                let messages = self.collection_messages(field);
                                write_slot(view, field, None, messages, separator);
                            }
                        }
                        _ => {
                            self.bind_field(view, field, None, separator);
                        }
                    }
                }
            }
        }
    }

    /// Returns true when an element was bound to the field slot instead.
    fn bind_field(&self, view: &mut dyn ErrorView, field: &str, index: Option<usize>, separator: &str) -> bool {
        // Fall back to the field slot with all of its messages when the view
        // has no slot for the element.
        let target = index.filter(|&i| view.slot_mut(field, Some(i)).is_some());
        let messages = self.messages(field, target);
        let written = write_slot(view, field, target, messages, separator);
        written && index.is_some() && target.is_none()
    }
}

fn write_slot(
    view: &mut dyn ErrorView,
    field: &str,
    index: Option<usize>,
    messages: Option<Vec<String>>,
    separator: &str,
) -> bool {
    let Some(slot) = view.slot_mut(field, index) else {
        return false;
    };

    match messages {
        Some(messages) => {
            slot.set_text(&messages.join(separator));
            slot.set_active(true);
        }
        None => {
            slot.set_text("");
            slot.set_active(false);
        }
    }
    true
}

/// State of one in-memory slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySlot {
    pub active: bool,
    pub text: String,
}

impl ErrorSlot for MemorySlot {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

/// An [`ErrorView`] backed by a map, for hosts that render errors
/// themselves (JSON responses, templates).
#[derive(Debug, Clone, Default)]
pub struct MemoryView {
    slots: HashMap<(String, Option<usize>), MemorySlot>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, field: impl Into<String>, index: Option<usize>) -> Self {
        self.add_slot(field, index);
        self
    }

    pub fn add_slot(&mut self, field: impl Into<String>, index: Option<usize>) {
        self.slots.entry((field.into(), index)).or_default();
    }

    pub fn slot(&self, field: &str, index: Option<usize>) -> Option<&MemorySlot> {
        self.slots.get(&(field.to_string(), index))
    }
}

impl ErrorView for MemoryView {
    fn slot_mut(&mut self, field: &str, index: Option<usize>) -> Option<&mut dyn ErrorSlot> {
        self.slots
            .get_mut(&(field.to_string(), index))
            .map(|slot| slot as &mut dyn ErrorSlot)
    }
}
