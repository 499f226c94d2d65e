use crate::Selector;
use core::fmt::Debug;

/// A child of an element as far as [`load`](`crate::load`) is concerned. Comments and other node kinds are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildNode<E> {
	Element(E),
	Text(String),
}

/// The primitive document operations the [`Engine`](`crate::Engine`) is built on.
///
/// Implemented by [`MemoryDom`](`crate::MemoryDom`) and, on `wasm32`, by `web::WebDom`.
/// Methods mirror their DOM namesakes unless noted otherwise.
pub trait Dom: Sized + 'static {
	/// A handle to a live element. Cloning must be cheap and must not copy the element itself.
	type Element: Clone + PartialEq + Debug;
	/// A native event as passed to delegation handlers.
	type Event;
	/// Keeps one native document-level listener installed until it's passed back to [`Dom::unlisten`].
	type Listener;

	/// Finds a connected element by its `id` attribute.
	fn element_by_id(&self, id: &str) -> Option<Self::Element>;

	/// Creates a detached element.
	fn create_element(&mut self, tag: &str) -> Self::Element;
	fn set_attribute(&mut self, element: &Self::Element, name: &str, value: &str);
	/// Replaces all children with a single text node, or with nothing if `text` is empty.
	fn set_text_content(&mut self, element: &Self::Element, text: &str);
	/// Replaces all children with the parsed `html`, which is trusted as-is.
	fn set_inner_html(&mut self, element: &Self::Element, html: &str);
	/// Moves `child` to the end of `parent`'s children.
	fn append_child(&mut self, parent: &Self::Element, child: &Self::Element);
	/// Puts `new` where `old` is in the tree. `old` is discarded.
	fn replace_with(&mut self, old: &Self::Element, new: &Self::Element);
	/// Detaches and discards the element with its subtree.
	fn remove(&mut self, element: &Self::Element);

	fn parent_element(&self, element: &Self::Element) -> Option<Self::Element>;
	/// Whether the element is part of the document (and so can receive delegated events).
	fn is_connected(&self, element: &Self::Element) -> bool;
	/// The lowercase local name.
	fn tag_name(&self, element: &Self::Element) -> String;
	fn attributes(&self, element: &Self::Element) -> Vec<(String, String)>;
	fn child_nodes(&self, element: &Self::Element) -> Vec<ChildNode<Self::Element>>;

	fn attribute(&self, element: &Self::Element, name: &str) -> Option<String> {
		self.attributes(element).into_iter().find(|(n, _)| n == name).map(|(_, value)| value)
	}

	fn matches(&self, element: &Self::Element, selector: &Selector) -> bool {
		selector.matches(self, element)
	}

	/// Installs a native listener for `event_type` on the document that feeds [`Engine::dispatch`](`crate::Engine::dispatch`).
	fn listen(&mut self, event_type: &str) -> Self::Listener;
	fn unlisten(&mut self, event_type: &str, listener: Self::Listener);

	fn prevent_default(&self, event: &Self::Event);
}
