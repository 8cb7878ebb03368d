//! Broadcast channels
//!
//! One `Broadcast<T>` per global event source (pointer, scroll, resize,
//! frame). Any number of controllers subscribe; each gets a [`Subscription`]
//! that removes its listener when dropped or explicitly unsubscribed.
//!
//! Publishing snapshots the listener set first, so a listener may subscribe
//! or unsubscribe (itself or others) while the event is being delivered. A
//! listener removed mid-delivery is not called afterwards.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

type Listener<T> = Rc<dyn Fn(&T)>;

/// Fan-out channel for a single event type
pub struct Broadcast<T: 'static> {
    listeners: Rc<RefCell<SlotMap<ListenerId, Listener<T>>>>,
}

impl<T: 'static> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<T: 'static> Broadcast<T> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(SlotMap::with_key())),
        }
    }

    /// Register a listener
    ///
    /// The listener stays registered for as long as the returned
    /// [`Subscription`] is alive.
    #[must_use = "dropping the subscription immediately unsubscribes"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self.listeners.borrow_mut().insert(Rc::new(listener));
        let weak: Weak<RefCell<SlotMap<ListenerId, Listener<T>>>> = Rc::downgrade(&self.listeners);

        Subscription {
            id,
            remove: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Deliver `value` to every listener registered at the time of the call
    pub fn publish(&self, value: &T) {
        let snapshot: SmallVec<[(ListenerId, Listener<T>); 8]> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, l)| (id, Rc::clone(l)))
            .collect();

        for (id, listener) in snapshot {
            if !self.listeners.borrow().contains_key(id) {
                continue;
            }
            listener(value);
        }
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl<T: 'static> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration handle returned by [`Broadcast::subscribe`]
///
/// Unsubscribes on drop. Calling [`Subscription::unsubscribe`] more than
/// once, or after the channel itself is gone, does nothing.
pub struct Subscription {
    id: ListenerId,
    remove: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// The listener this subscription owns
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the listener now
    pub fn unsubscribe(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }

    /// Whether the listener has not been removed through this handle yet
    pub fn is_active(&self) -> bool {
        self.remove.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
