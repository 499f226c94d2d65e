//! An in-process document.
//!
//! [`MemoryDom`] keeps elements and text in an arena and implements [`Dom`] with browser-like semantics where they
//! matter to the engine: ids are looked up among connected elements only, discarded subtrees are gone for good,
//! and events only reach the [`Engine`] while a native listener for their type is installed.

use crate::{
	dom::ChildNode,
	node::Escaped,
	parse::{parse_fragment, Fragment},
	Dom, Engine, Error, Selector,
};
use core::cell::Cell;
use hashbrown::HashMap;
use indexmap::IndexMap;
use tracing::{error, trace, warn};

/// A handle to a node in a [`MemoryDom`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

#[derive(Debug)]
enum Data {
	Element { tag: String, attributes: IndexMap<String, String> },
	Text(String),
}

#[derive(Debug)]
struct Slot {
	data: Data,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

/// See the [module documentation](self).
#[derive(Debug)]
pub struct MemoryDom {
	nodes: HashMap<NodeId, Slot>,
	next_id: u32,
	root: NodeId,
	body: NodeId,
	listeners: HashMap<String, usize>,
}

/// A simulated native event.
#[derive(Debug, Default)]
pub struct MemoryEvent {
	default_prevented: Cell<bool>,
}

impl MemoryEvent {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn default_prevented(&self) -> bool {
		self.default_prevented.get()
	}
}

/// Returned by [`MemoryDom::listen`](`Dom::listen`); only counts.
#[derive(Debug)]
pub struct MemoryListener(());

impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDom {
	/// Creates a document consisting of `<html><body></body></html>`.
	#[must_use]
	pub fn new() -> Self {
		let mut dom = Self {
			nodes: HashMap::new(),
			next_id: 0,
			root: NodeId(0),
			body: NodeId(0),
			listeners: HashMap::new(),
		};
		dom.root = dom.create_element("html");
		dom.body = dom.create_element("body");
		let (root, body) = (dom.root, dom.body);
		dom.append_child(&root, &body);
		dom
	}

	/// Creates a document whose body contains `markup`, typically the mount points views are appended to.
	#[must_use]
	pub fn parse(markup: &str) -> Self {
		let mut dom = Self::new();
		let body = dom.body;
		dom.set_inner_html(&body, markup);
		dom
	}

	#[must_use]
	pub fn root(&self) -> NodeId {
		self.root
	}

	#[must_use]
	pub fn body(&self) -> NodeId {
		self.body
	}

	/// The number of live nodes, text included.
	#[must_use]
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Whether `id` still refers to a node, connected or not.
	#[must_use]
	pub fn contains(&self, id: NodeId) -> bool {
		self.nodes.contains_key(&id)
	}

	/// How many native listeners are installed for `event_type`.
	#[must_use]
	pub fn listener_count(&self, event_type: &str) -> usize {
		self.listeners.get(event_type).copied().unwrap_or(0)
	}

	/// The first connected element matching `selector`, in document order.
	pub fn query(&self, selector: &str) -> Result<Option<NodeId>, Error> {
		Ok(self.query_all(selector)?.into_iter().next())
	}

	/// All connected elements matching `selector`, in document order.
	pub fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, Error> {
		let selector = Selector::parse(selector)?;
		let mut found = Vec::new();
		self.walk(self.root, &mut |id| {
			if self.matches(&id, &selector) {
				found.push(id);
			}
			false
		});
		Ok(found)
	}

	/// The outer markup of an element, or `None` for unknown ids.
	#[must_use]
	pub fn markup(&self, id: NodeId) -> Option<String> {
		let mut markup = String::new();
		self.write_markup(id, &mut markup)?;
		Some(markup)
	}

	/// The inner markup of an element, or `None` for unknown ids.
	#[must_use]
	pub fn inner_markup(&self, id: NodeId) -> Option<String> {
		let slot = self.nodes.get(&id)?;
		let mut markup = String::new();
		for &child in &slot.children {
			self.write_markup(child, &mut markup)?;
		}
		Some(markup)
	}

	/// Visits connected elements depth-first until `visit` returns `true`.
	fn walk(&self, id: NodeId, visit: &mut impl FnMut(NodeId) -> bool) -> bool {
		match self.nodes.get(&id) {
			Some(Slot { data: Data::Element { .. }, children, .. }) => visit(id) || children.iter().any(|&child| self.walk(child, visit)),
			_ => false,
		}
	}

	fn write_markup(&self, id: NodeId, markup: &mut String) -> Option<()> {
		let slot = self.nodes.get(&id)?;
		match &slot.data {
			Data::Text(text) => markup.push_str(&Escaped::text(text).to_string()),
			Data::Element { tag, attributes } => {
				markup.push('<');
				markup.push_str(tag);
				for (name, value) in attributes {
					markup.push_str(&format!(" {}=\"{}\"", name, Escaped::attribute(value)));
				}
				markup.push('>');
				if !crate::node::is_void_element(tag) {
					for &child in &slot.children {
						self.write_markup(child, markup)?;
					}
					markup.push_str(&format!("</{}>", tag));
				}
			}
		}
		Some(())
	}

	fn insert(&mut self, data: Data) -> NodeId {
		let id = NodeId(self.next_id);
		self.next_id = self.next_id.checked_add(1).expect("`MemoryDom` node ids exhausted");
		self.nodes.insert(id, Slot { data, parent: None, children: Vec::new() });
		id
	}

	fn insert_fragments(&mut self, parent: NodeId, fragments: Vec<Fragment>) {
		for fragment in fragments {
			let child = match fragment {
				Fragment::Text(text) => self.insert(Data::Text(text)),
				Fragment::Element { tag, attributes, children } => {
					let element = self.insert(Data::Element {
						tag,
						attributes: attributes.into_iter().collect(),
					});
					self.insert_fragments(element, children);
					element
				}
			};
			self.attach(parent, child);
		}
	}

	fn attach(&mut self, parent: NodeId, child: NodeId) {
		if let Some(slot) = self.nodes.get_mut(&child) {
			slot.parent = Some(parent);
		}
		if let Some(slot) = self.nodes.get_mut(&parent) {
			slot.children.push(child);
		}
	}

	fn detach(&mut self, id: NodeId) {
		let parent = match self.nodes.get_mut(&id) {
			Some(slot) => slot.parent.take(),
			None => return,
		};
		if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
			parent.children.retain(|&child| child != id);
		}
	}

	fn discard(&mut self, id: NodeId) {
		if let Some(slot) = self.nodes.remove(&id) {
			for child in slot.children {
				self.discard(child);
			}
		}
	}

	fn clear_children(&mut self, id: NodeId) {
		let children = match self.nodes.get_mut(&id) {
			Some(slot) => core::mem::take(&mut slot.children),
			None => return,
		};
		for child in children {
			self.discard(child);
		}
	}

	fn is_inclusive_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
		loop {
			if id == ancestor {
				return true;
			}
			match self.nodes.get(&id).and_then(|slot| slot.parent) {
				Some(parent) => id = parent,
				None => return false,
			}
		}
	}

	fn element_slot(&self, id: NodeId) -> Option<(&str, &IndexMap<String, String>)> {
		match &self.nodes.get(&id)?.data {
			Data::Element { tag, attributes } => Some((tag, attributes)),
			Data::Text(_) => None,
		}
	}
}

impl Dom for MemoryDom {
	type Element = NodeId;
	type Event = MemoryEvent;
	type Listener = MemoryListener;

	fn element_by_id(&self, id: &str) -> Option<NodeId> {
		let mut found = None;
		self.walk(self.root, &mut |candidate| {
			let matched = self.element_slot(candidate).and_then(|(_, attributes)| attributes.get("id")).map_or(false, |value| value == id);
			if matched {
				found = Some(candidate);
			}
			matched
		});
		found
	}

	fn create_element(&mut self, tag: &str) -> NodeId {
		self.insert(Data::Element {
			tag: tag.to_ascii_lowercase(),
			attributes: IndexMap::new(),
		})
	}

	fn set_attribute(&mut self, element: &NodeId, name: &str, value: &str) {
		match self.nodes.get_mut(element).map(|slot| &mut slot.data) {
			Some(Data::Element { attributes, .. }) => {
				attributes.insert(name.to_ascii_lowercase(), value.to_owned());
			}
			_ => error!("Could not set attribute {:?} on {:?}: not an element.", name, element),
		}
	}

	fn set_text_content(&mut self, element: &NodeId, text: &str) {
		self.clear_children(*element);
		if !text.is_empty() {
			let text = self.insert(Data::Text(text.to_owned()));
			self.attach(*element, text);
		}
	}

	fn set_inner_html(&mut self, element: &NodeId, html: &str) {
		self.clear_children(*element);
		self.insert_fragments(*element, parse_fragment(html));
	}

	fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
		if self.element_slot(*parent).is_none() || !self.contains(*child) {
			return error!("Failed to append {:?} to {:?}: unknown node.", child, parent);
		}
		if self.is_inclusive_ancestor(*child, *parent) {
			return error!("Failed to append {:?} to {:?}: would create a cycle.", child, parent);
		}
		self.detach(*child);
		self.attach(*parent, *child);
	}

	fn replace_with(&mut self, old: &NodeId, new: &NodeId) {
		let parent = match self.nodes.get(old).and_then(|slot| slot.parent) {
			Some(parent) => parent,
			None => return warn!("Tried to replace {:?}, which has no parent. Ignoring.", old),
		};
		if self.is_inclusive_ancestor(*new, parent) {
			return error!("Failed to replace {:?} with {:?}: would create a cycle.", old, new);
		}
		self.detach(*new);
		if let Some(slot) = self.nodes.get_mut(&parent) {
			if let Some(position) = slot.children.iter().position(|child| child == old) {
				slot.children[position] = *new;
			}
		}
		if let Some(slot) = self.nodes.get_mut(new) {
			slot.parent = Some(parent);
		}
		if let Some(slot) = self.nodes.get_mut(old) {
			slot.parent = None;
		}
		self.discard(*old);
	}

	fn remove(&mut self, element: &NodeId) {
		self.detach(*element);
		self.discard(*element);
		trace!("Discarded {:?}.", element);
	}

	fn parent_element(&self, element: &NodeId) -> Option<NodeId> {
		self.nodes.get(element)?.parent
	}

	fn is_connected(&self, element: &NodeId) -> bool {
		self.contains(*element) && self.is_inclusive_ancestor(self.root, *element)
	}

	fn tag_name(&self, element: &NodeId) -> String {
		self.element_slot(*element).map(|(tag, _)| tag.to_owned()).unwrap_or_default()
	}

	fn attributes(&self, element: &NodeId) -> Vec<(String, String)> {
		self.element_slot(*element)
			.map(|(_, attributes)| attributes.iter().map(|(name, value)| (name.clone(), value.clone())).collect())
			.unwrap_or_default()
	}

	fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
		self.element_slot(*element)?.1.get(name).cloned()
	}

	fn child_nodes(&self, element: &NodeId) -> Vec<ChildNode<NodeId>> {
		let children = match self.nodes.get(element) {
			Some(slot) => &slot.children,
			None => return Vec::new(),
		};
		children
			.iter()
			.filter_map(|&child| match &self.nodes.get(&child)?.data {
				Data::Element { .. } => Some(ChildNode::Element(child)),
				Data::Text(text) => Some(ChildNode::Text(text.clone())),
			})
			.collect()
	}

	fn listen(&mut self, event_type: &str) -> MemoryListener {
		*self.listeners.entry(event_type.to_owned()).or_insert(0) += 1;
		trace!("Installed native listener for {:?}.", event_type);
		MemoryListener(())
	}

	fn unlisten(&mut self, event_type: &str, _: MemoryListener) {
		let remaining = match self.listeners.get_mut(event_type) {
			Some(count) => {
				*count -= 1;
				*count
			}
			None => return error!("Tried to remove a native listener for {:?} that wasn't installed.", event_type),
		};
		if remaining == 0 {
			self.listeners.remove(event_type);
		}
		trace!("Removed native listener for {:?}.", event_type);
	}

	fn prevent_default(&self, event: &MemoryEvent) {
		event.default_prevented.set(true);
	}
}

impl Engine<MemoryDom> {
	/// Simulates a native event of `event_type` on `target` and returns it for inspection.
	///
	/// Like in a browser, the event only reaches [`Engine::dispatch`] if a native listener for its type is installed.
	pub fn fire(&mut self, event_type: &str, target: NodeId) -> MemoryEvent {
		let event = MemoryEvent::new();
		if self.dom().listener_count(event_type) == 0 {
			trace!("No native listener for {:?}.", event_type);
		} else {
			self.dispatch(event_type, &target, &event);
		}
		event
	}
}
