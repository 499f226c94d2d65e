//! The browser backend.
//!
//! Native listeners can't borrow an engine, so the engine they dispatch into lives in a thread-local "page" slot:
//! [`install`] it once, then reach it through [`with_page`]. Events that arrive while the page engine is borrowed
//! (for example because a handler synchronously triggered another event) are dropped with a warning.

use crate::{dom::ChildNode, Dom, Engine, Selector};
use core::cell::RefCell;
use wasm_bindgen::{closure::Closure, JsCast, UnwrapThrowExt};
use web_sys::{Attr, Document, Element, Event, NamedNodeMap, Node as wNode, Text};
use tracing::{error, trace, warn};

thread_local! {
	static PAGE: RefCell<Option<Engine<WebDom>>> = RefCell::new(None);
}

/// Makes `engine` the page engine, returning the previous one.
pub fn install(engine: Engine<WebDom>) -> Option<Engine<WebDom>> {
	PAGE.with(|page| page.borrow_mut().replace(engine))
}

/// Runs `f` on the page engine. Returns `None` if none is installed or it's already in use.
pub fn with_page<R>(f: impl FnOnce(&mut Engine<WebDom>) -> R) -> Option<R> {
	PAGE.with(|page| match page.try_borrow_mut() {
		Ok(mut page) => page.as_mut().map(f),
		Err(_) => {
			error!("The page engine is already in use.");
			None
		}
	})
}

#[derive(Debug, Clone)]
pub struct WebDom {
	document: Document,
}

/// Keeps a document-level listener's closure alive.
pub struct WebListener(Closure<dyn Fn(Event)>);

impl WebDom {
	#[must_use]
	pub fn new(document: Document) -> Self {
		Self { document }
	}

	/// The current window's document, if there is one.
	#[must_use]
	pub fn from_window() -> Option<Self> {
		web_sys::window()?.document().map(Self::new)
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}
}

fn dispatch_native(event_type: &str, event: &Event) {
	let target = match event.target().and_then(|target| target.dyn_into::<wNode>().ok()) {
		Some(target) => target,
		None => return trace!("Event target is not a node. Ignoring."),
	};
	// Text nodes can't match selectors, so events on them start at their element.
	let target = match target.dyn_into::<Element>() {
		Ok(element) => element,
		Err(node) => match node.parent_element() {
			Some(element) => element,
			None => return trace!("Event target has no element. Ignoring."),
		},
	};

	PAGE.with(|page| match page.try_borrow_mut() {
		Ok(mut page) => match page.as_mut() {
			Some(engine) => {
				engine.dispatch(event_type, &target, event);
			}
			None => warn!("No page engine is installed."),
		},
		Err(_) => warn!("Received {:?} while the page engine was in use. Ignoring.", event_type),
	});
}

impl Dom for WebDom {
	type Element = Element;
	type Event = Event;
	type Listener = WebListener;

	fn element_by_id(&self, id: &str) -> Option<Element> {
		self.document.get_element_by_id(id)
	}

	fn create_element(&mut self, tag: &str) -> Element {
		self.document.create_element(tag).expect_throw("Failed to create element.")
	}

	fn set_attribute(&mut self, element: &Element, name: &str, value: &str) {
		if let Err(error) = element.set_attribute(name, value) {
			error!(?error, "Failed to set attribute {:?}.", name);
		}
	}

	fn set_text_content(&mut self, element: &Element, text: &str) {
		element.set_text_content((!text.is_empty()).then(|| text));
	}

	fn set_inner_html(&mut self, element: &Element, html: &str) {
		element.set_inner_html(html);
	}

	fn append_child(&mut self, parent: &Element, child: &Element) {
		if let Err(error) = parent.append_child(child) {
			error!(?error, "Failed to append child.");
		}
	}

	fn replace_with(&mut self, old: &Element, new: &Element) {
		let parent = match old.parent_node() {
			Some(parent) => parent,
			None => return warn!("Tried to replace an element without parent. Ignoring."),
		};
		if let Err(error) = parent.replace_child(new, old) {
			error!(?error, "Failed to replace element.");
		}
	}

	fn remove(&mut self, element: &Element) {
		element.remove();
	}

	fn parent_element(&self, element: &Element) -> Option<Element> {
		element.parent_element()
	}

	fn is_connected(&self, element: &Element) -> bool {
		element.is_connected()
	}

	fn tag_name(&self, element: &Element) -> String {
		element.local_name()
	}

	fn attributes(&self, element: &Element) -> Vec<(String, String)> {
		load_attributes(&element.attributes())
	}

	fn child_nodes(&self, element: &Element) -> Vec<ChildNode<Element>> {
		let child_nodes = element.child_nodes();
		(0..child_nodes.length())
			.filter_map(|i| child_nodes.item(i))
			.filter_map(|child| {
				if let Some(element) = child.dyn_ref::<Element>() {
					Some(ChildNode::Element(element.clone()))
				} else {
					child.dyn_ref::<Text>().map(|text| ChildNode::Text(text.data()))
				}
			})
			.collect()
	}

	fn attribute(&self, element: &Element, name: &str) -> Option<String> {
		element.get_attribute(name)
	}

	fn matches(&self, element: &Element, selector: &Selector) -> bool {
		element.matches(selector.as_str()).unwrap_or_else(|error| {
			warn!(?error, "Native matching failed for {:?}. Falling back.", selector.as_str());
			selector.matches(self, element)
		})
	}

	fn listen(&mut self, event_type: &str) -> WebListener {
		let owned_event_type = event_type.to_owned();
		let closure = Closure::wrap(Box::new(move |event: Event| dispatch_native(&owned_event_type, &event)) as Box<dyn Fn(Event)>);
		if let Err(error) = self.document.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref::<js_sys::Function>()) {
			error!(?error, "Failed to install native listener for {:?}.", event_type);
		}
		trace!("Installed native listener for {:?}.", event_type);
		WebListener(closure)
	}

	fn unlisten(&mut self, event_type: &str, listener: WebListener) {
		if let Err(error) = self.document.remove_event_listener_with_callback(event_type, listener.0.as_ref().unchecked_ref::<js_sys::Function>()) {
			error!(?error, "Failed to remove native listener for {:?}.", event_type);
		}
		trace!("Removed native listener for {:?}.", event_type);
	}

	fn prevent_default(&self, event: &Event) {
		event.prevent_default();
	}
}

fn load_attributes(attributes: &NamedNodeMap) -> Vec<(String, String)> {
	(0..attributes.length()).filter_map(|i| attributes.item(i)).map(|attribute| load_attribute(&attribute)).collect()
}

fn load_attribute(attribute: &Attr) -> (String, String) {
	(attribute.local_name(), attribute.value())
}
