//! A retained-mode view layer for the DOM.
//!
//! Views render [`Node`] trees, the [`Engine`] applies them to a document by whole-subtree replacement, and
//! delegated events are routed from one native listener per event type to the closest matching rule.
//!
//! The document is abstracted by [`Dom`]. [`MemoryDom`] runs anywhere and is what the tests use; on `wasm32`,
//! `web::WebDom` drives the browser's document.

#![doc(html_root_url = "https://docs.rs/retain-dom/0.1.0")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod delegate;
mod dom;
mod engine;
mod error;
mod form;
pub mod header;
pub mod load;
mod memory;
mod node;
mod parse;
mod rc_hash_map;
mod selector;
pub mod storage;
mod view;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use delegate::{Delegate, Delegated, Handler, Scope};
pub use dom::{ChildNode, Dom};
pub use engine::Engine;
pub use error::Error;
pub use form::{Form, FormLabels, FormRegions};
pub use memory::{MemoryDom, MemoryEvent, MemoryListener, NodeId};
pub use node::{Attributes, Content, Node};
pub use selector::Selector;
pub use storage::{flag, KeyValueStore, MemoryStore};
pub use view::{Lifecycle, Slot, View, ViewBase};
