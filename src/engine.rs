use crate::{delegate::Registry, load::load_element, Content, Dom, Error, Node};
use tracing::{debug, instrument, trace, warn};

/// Owns a document and the delegation registry for it, and applies [`Node`] trees to it.
///
/// Elements are addressed by key, which is their `id` attribute. The unit of reconciliation is an element's whole
/// subtree: [`Engine::patch`] replaces it outright rather than diffing children, so per-element state like focus or
/// scroll position inside it does not survive a patch.
///
/// All operations run to completion synchronously. Delegation handlers receive `&mut Engine` and may call back into
/// any of them.
pub struct Engine<D: Dom> {
	dom: D,
	pub(crate) registry: Registry<D>,
}

impl<D: Dom> Engine<D> {
	#[must_use]
	pub fn new(dom: D) -> Self {
		Self {
			dom,
			registry: Registry::new(),
		}
	}

	#[must_use]
	pub fn dom(&self) -> &D {
		&self.dom
	}

	/// Direct document access. Changes made through this bypass the key bookkeeping, so keep them away from mounted
	/// subtrees.
	pub fn dom_mut(&mut self) -> &mut D {
		&mut self.dom
	}

	pub(crate) fn split(&mut self) -> (&mut D, &mut Registry<D>) {
		(&mut self.dom, &mut self.registry)
	}

	/// Creates a detached live subtree for `node`.
	pub fn realize(&mut self, node: &Node) -> D::Element {
		let element = self.dom.create_element(node.tag());
		for (name, value) in node.get_attributes() {
			self.dom.set_attribute(&element, name, value);
		}
		match node.content() {
			Content::Children(children) => {
				for child in children {
					let child = self.realize(child);
					self.dom.append_child(&element, &child);
				}
			}
			Content::Text(text) => self.dom.set_text_content(&element, text),
			Content::Html(html) => self.dom.set_inner_html(&element, html),
		}
		element
	}

	/// Whether an element with `key` is currently part of the document.
	#[must_use]
	pub fn is_mounted(&self, key: &str) -> bool {
		self.dom.element_by_id(key).is_some()
	}

	/// Serializes the live subtree at `key`.
	#[must_use]
	pub fn load(&self, key: &str) -> Option<Node> {
		self.dom.element_by_id(key).map(|element| load_element(&self.dom, &element))
	}

	/// Realizes `node` as the last child of the element at `parent_key`.
	///
	/// If `parent_key` isn't mounted, nothing happens and `None` is returned: views may be initialized before their
	/// mount point exists. Live elements that share a key with `node` or any of its descendants are removed first so
	/// that keys stay unique.
	#[instrument(skip(self, node), fields(key = ?node.id()))]
	pub fn append(&mut self, parent_key: &str, node: &Node) -> Option<D::Element> {
		let parent = match self.dom.element_by_id(parent_key) {
			Some(parent) => parent,
			None => {
				debug!("Mount point is absent. Skipping append.");
				return None;
			}
		};
		self.evict_keys(&node.keys(), &parent, None);
		log_markup(node);
		let element = self.realize(node);
		self.dom.append_child(&parent, &element);
		Some(element)
	}

	/// Detaches and discards the subtree at `key`. Returns whether there was one.
	#[instrument(skip(self))]
	pub fn remove(&mut self, key: &str) -> bool {
		match self.dom.element_by_id(key) {
			Some(element) => {
				self.dom.remove(&element);
				trace!("Removed.");
				true
			}
			None => {
				trace!("Nothing to remove.");
				false
			}
		}
	}

	/// Replaces the subtree at `key` with a realization of `node`, in place.
	///
	/// The new root always keeps `key` as its id. Nothing outside the subtree is touched, except for elements elsewhere
	/// that share a key with one of `node`'s descendants. Those are removed like in [`Engine::append`].
	#[instrument(skip(self, node))]
	pub fn patch(&mut self, key: &str, node: &Node) -> Result<D::Element, Error> {
		let old = self.dom.element_by_id(key).ok_or_else(|| Error::MissingElement { key: key.to_owned() })?;
		let descendant_keys: Vec<&str> = match node.content() {
			Content::Children(children) => children.iter().flat_map(Node::keys).collect(),
			Content::Html(_) | Content::Text(_) => Vec::new(),
		};
		self.evict_keys(&descendant_keys, &old, Some(&old));
		log_markup(node);
		let new = self.realize(node);
		if node.id() != Some(key) {
			self.dom.set_attribute(&new, "id", key);
		}
		self.dom.replace_with(&old, &new);
		trace!("Patched.");
		Ok(new)
	}
}

impl<D: Dom> Engine<D> {
	/// Removes live elements with any of `keys`.
	///
	/// Elements inside `replaced` go away anyway and are skipped. So are inclusive ancestors of `anchor`, since removing
	/// one would take the insertion point with it.
	fn evict_keys(&mut self, keys: &[&str], anchor: &D::Element, replaced: Option<&D::Element>) {
		for &key in keys {
			let existing = match self.dom.element_by_id(key) {
				Some(existing) => existing,
				None => continue,
			};
			if replaced.map_or(false, |replaced| self.is_within(&existing, replaced)) {
				continue;
			}
			if self.is_within(anchor, &existing) {
				warn!(key, "An ancestor of the insertion point has this key. Keeping it, so the key is now ambiguous.");
				continue;
			}
			warn!(key, "An element with this key is already mounted. Replacing it.");
			self.dom.remove(&existing);
		}
	}

	fn is_within(&self, element: &D::Element, ancestor: &D::Element) -> bool {
		let mut current = Some(element.clone());
		while let Some(element) = current {
			if &element == ancestor {
				return true;
			}
			current = self.dom.parent_element(&element);
		}
		false
	}
}

fn log_markup(node: &Node) {
	if cfg!(feature = "dangerous-logging") {
		trace!(markup = %node, "Realizing.");
	} else {
		trace!(tag = node.tag(), "Realizing.");
	}
}
