//! Headless element registry
//!
//! Stands in for the document: every animated element gets an [`ElementId`]
//! and a rect in document coordinates. Controllers read rects on every tick
//! rather than caching them, so a relayout (orientation change, content
//! growing) is picked up on the next scroll or resize.

use crate::geometry::{Point, Rect};
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::Rc;

new_key_type! {
    /// Handle to an element in the layout
    pub struct ElementId;
}

/// What an element is, as far as hover behavior is concerned
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ElementKind {
    /// Plain box
    #[default]
    Block,
    /// Anchor element
    Link,
    /// Button element
    Button,
    /// Element explicitly marked interactive
    Interactive,
}

impl ElementKind {
    pub fn is_interactive(&self) -> bool {
        !matches!(self, ElementKind::Block)
    }
}

#[derive(Clone, Debug)]
struct Node {
    name: String,
    kind: ElementKind,
    rect: Rect,
}

/// Shared element registry
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct Layout {
    nodes: Rc<RefCell<SlotMap<ElementId, Node>>>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block element
    pub fn insert(&self, name: impl Into<String>, rect: Rect) -> ElementId {
        self.insert_kind(name, ElementKind::Block, rect)
    }

    /// Add an element of a specific kind
    pub fn insert_kind(&self, name: impl Into<String>, kind: ElementKind, rect: Rect) -> ElementId {
        self.nodes.borrow_mut().insert(Node {
            name: name.into(),
            kind,
            rect,
        })
    }

    pub fn remove(&self, id: ElementId) -> bool {
        self.nodes.borrow_mut().remove(id).is_some()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.borrow().contains_key(id)
    }

    pub fn rect(&self, id: ElementId) -> Option<Rect> {
        self.nodes.borrow().get(id).map(|n| n.rect)
    }

    pub fn set_rect(&self, id: ElementId, rect: Rect) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(id) {
            node.rect = rect;
        }
    }

    pub fn name(&self, id: ElementId) -> Option<String> {
        self.nodes.borrow().get(id).map(|n| n.name.clone())
    }

    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.nodes.borrow().get(id).map(|n| n.kind)
    }

    /// Every interactive element currently in the layout
    pub fn interactive_elements(&self) -> Vec<ElementId> {
        self.nodes
            .borrow()
            .iter()
            .filter(|(_, n)| n.kind.is_interactive())
            .map(|(id, _)| id)
            .collect()
    }

    /// Whether `point` (document space) lies inside element `id`
    pub fn hit(&self, id: ElementId, point: Point) -> bool {
        self.rect(id).map(|r| r.contains(point)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interactive_snapshot() {
        let layout = Layout::new();
        layout.insert("hero", Rect::new(0.0, 0.0, 100.0, 100.0));
        let link = layout.insert_kind("cta", ElementKind::Link, Rect::new(0.0, 0.0, 10.0, 10.0));
        let button = layout.insert_kind("send", ElementKind::Button, Rect::new(0.0, 0.0, 10.0, 10.0));

        let interactive = layout.interactive_elements();
        assert_eq!(interactive.len(), 2);
        assert!(interactive.contains(&link));
        assert!(interactive.contains(&button));
    }

    #[test]
    fn test_rect_updates_are_visible_through_clones() {
        let layout = Layout::new();
        let other = layout.clone();
        let id = layout.insert("about", Rect::new(0.0, 900.0, 1440.0, 800.0));

        other.set_rect(id, Rect::new(0.0, 1200.0, 1440.0, 800.0));
        assert_eq!(layout.rect(id).map(|r| r.y), Some(1200.0));
        assert!(layout.hit(id, Point::new(10.0, 1300.0)));
    }
}
