//! Vitrine Core
//!
//! Host primitives shared by every controller on the site:
//!
//! - **Timers**: a virtual-clock timeout queue with idempotent cancellation
//! - **Broadcast channels**: one fan-out point per global event source, with
//!   unsubscribe handles returned at registration time
//! - **Input**: pointer, touch, scroll and resize events
//! - **Layout**: headless element registry holding document-space rects
//! - **Color / math**: the small amount of shading maths the site needs
//!
//! Everything here is single-threaded. Shared state lives behind `Rc` and
//! `RefCell`; no callback runs while the structure that invoked it is borrowed.
//!
//! # Example
//!
//! ```rust
//! use vitrine_core::{Broadcast, TimerQueue};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let timers = TimerQueue::new();
//! let fired = Rc::new(Cell::new(false));
//! let flag = fired.clone();
//! timers.set_timeout(3000.0, move || flag.set(true));
//!
//! timers.advance_to(2999.0);
//! assert!(!fired.get());
//! timers.advance_to(3000.0);
//! assert!(fired.get());
//!
//! let scroll: Broadcast<f32> = Broadcast::new();
//! let sub = scroll.subscribe(|y| println!("scrolled to {y}"));
//! scroll.publish(&120.0);
//! drop(sub);
//! assert_eq!(scroll.listener_count(), 0);
//! ```

pub mod bus;
pub mod color;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod math;
pub mod timer;

pub use bus::{Broadcast, ListenerId, Subscription};
pub use color::Color;
pub use geometry::{Point, Rect, Size, Viewport};
pub use input::{Capabilities, InputEvent, PointerEvent, TouchEvent};
pub use layout::{ElementId, ElementKind, Layout};
pub use timer::{TimerId, TimerQueue};
