#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! # wlmtk: the toolkit layer of a wayland window manager
//!
//! This crate provides the widget hierarchy a window manager builds its user
//! interface from: [`Element`](element::Element)s arranged in
//! [`Container`](container::Container)s, each backed by a node of a retained
//! [`scene`] graph, plus the logic routing pointer and keyboard input through
//! that tree.
//!
//! ## Structure of the crate
//!
//! - [`element`] defines the abstract unit of the tree and its capability set,
//!   [`ElementImpl`](element::ElementImpl).
//! - [`container`] composes elements and implements pointer focus, pointer
//!   grabs, keyboard focus and layout propagation.
//! - [`widgets`] holds thin element specialisations (buffers, buttons,
//!   rectangles and a box layout).
//! - [`scene`] is the scene graph the elements attach their visual nodes to.
//! - [`input`] contains the event records that are routed through the tree.
//!
//! ## Input routing
//!
//! Input enters at a root container, created with
//! [`Container::new_attached`](container::Container::new_attached). Motion is
//! offered to the children in z-order, topmost first, with coordinates
//! translated into each child's space; the first child accepting it gains
//! pointer focus. Button and axis events follow the pointer focus, unless an
//! element holds a pointer grab, in which case every pointer event goes to it.
//!
//! Everything runs on the thread owning the event loop. The types are neither
//! `Send` nor `Sync`.
//!
//! ### Logging
//!
//! wlmtk logs through [`tracing`]. It never installs a subscriber on its own;
//! dispatch decisions are logged at `trace` level, tree mutations at `debug`.

pub mod container;
pub mod element;
pub mod input;
pub mod scene;
pub mod utils;
pub mod widgets;

#[cfg(any(test, feature = "test_fakes"))]
pub mod testing;
