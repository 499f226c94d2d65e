//! Keyed, self-rendering units of UI.
//!
//! A [`View`] renders itself to a [`Node`] whose root carries the view's key as `id`, and moves through
//! [`Lifecycle::Unmounted`] and [`Lifecycle::Mounted`] via [`View::init`], [`View::patch`] and [`View::remove`].
//! Delegation rules handed to `init` belong to the view and are dropped again by `remove`.

use crate::{Delegate, Dom, Engine, Error, Node, Scope};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
	Unmounted,
	Mounted,
}

/// Bookkeeping shared by all views. Embed one and hand it out through [`View::base`] and [`View::base_mut`].
#[derive(Debug, Clone)]
pub struct ViewBase {
	key: String,
	state: Lifecycle,
	scope: Option<Scope>,
	parent: Option<String>,
	last_rendered: Option<Node>,
}

impl ViewBase {
	#[must_use]
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			state: Lifecycle::Unmounted,
			scope: None,
			parent: None,
			last_rendered: None,
		}
	}

	#[must_use]
	pub fn key(&self) -> &str {
		&self.key
	}

	#[must_use]
	pub fn state(&self) -> Lifecycle {
		self.state
	}

	/// The scope owning this view's delegation rules while it's mounted.
	#[must_use]
	pub fn scope(&self) -> Option<Scope> {
		self.scope
	}

	/// The key of the element this view was last initialized into.
	#[must_use]
	pub fn parent(&self) -> Option<&str> {
		self.parent.as_deref()
	}

	/// What the view rendered on its last `init` or `patch`.
	#[must_use]
	pub fn last_rendered(&self) -> Option<&Node> {
		self.last_rendered.as_ref()
	}

	fn keyed(&self, node: Node) -> Node {
		if node.id() == Some(self.key.as_str()) {
			node
		} else {
			node.attribute("id", self.key.clone())
		}
	}
}

pub trait View {
	fn base(&self) -> &ViewBase;
	fn base_mut(&mut self) -> &mut ViewBase;

	/// Describes the view's current state. Must not touch the document.
	///
	/// The root's `id` is overwritten with [`View::key`].
	fn render(&self) -> Node;

	fn key(&self) -> &str {
		self.base().key()
	}

	fn is_mounted(&self) -> bool {
		self.base().state() == Lifecycle::Mounted
	}

	/// Renders the view, appends it to `parent` and registers `delegates` in a fresh scope.
	///
	/// A missing `parent` is tolerated: the view still counts as mounted and [`View::patch`] retries the append.
	/// If a delegate's selector is rejected, everything done so far is rolled back.
	fn init<D: Dom>(&mut self, engine: &mut Engine<D>, parent: &str, delegates: Vec<Delegate<D>>) -> Result<Scope, Error> {
		let key = self.key().to_owned();
		if self.is_mounted() {
			warn!(key = self.key(), "View is already mounted. Initializing again.");
			if let Some(previous) = self.base_mut().scope.take() {
				engine.off(previous);
			}
		}

		let node = self.base().keyed(self.render());
		if engine.append(parent, &node).is_none() {
			debug!(key = self.key(), mount_point = parent, "Mount point is absent. The view will be appended on patch.");
		}

		let scope = engine.scope();
		for Delegate { event_type, selector, handler } in delegates {
			if let Err(error) = engine.register(&event_type, &selector, scope, handler) {
				engine.off(scope);
				engine.remove(&key);
				let base = self.base_mut();
				base.state = Lifecycle::Unmounted;
				base.parent = None;
				base.last_rendered = None;
				return Err(error);
			}
		}

		let base = self.base_mut();
		base.state = Lifecycle::Mounted;
		base.scope = Some(scope);
		base.parent = Some(parent.to_owned());
		base.last_rendered = Some(node);
		trace!(key = self.key(), "Mounted.");
		Ok(scope)
	}

	/// Re-renders the view and replaces its subtree.
	fn patch<D: Dom>(&mut self, engine: &mut Engine<D>) -> Result<(), Error> {
		if !self.is_mounted() {
			return Err(Error::NotMounted { key: self.key().to_owned() });
		}

		let node = self.base().keyed(self.render());
		match engine.patch(self.key(), &node) {
			Ok(_) => trace!(key = self.key(), "Patched."),
			Err(Error::MissingElement { .. }) => match self.base().parent() {
				Some(parent) => {
					if engine.append(parent, &node).is_none() {
						debug!(key = self.key(), mount_point = parent, "Mount point is still absent.");
					}
				}
				None => debug!(key = self.key(), "Element is absent and there is no mount point to append to."),
			},
			Err(error) => return Err(error),
		}
		self.base_mut().last_rendered = Some(node);
		Ok(())
	}

	/// Drops the view's delegation rules and its subtree.
	fn remove<D: Dom>(&mut self, engine: &mut Engine<D>) -> Result<(), Error> {
		if !self.is_mounted() {
			return Err(Error::NotMounted { key: self.key().to_owned() });
		}

		let base = self.base_mut();
		if let Some(scope) = base.scope.take() {
			engine.off(scope);
		}
		engine.remove(&base.key);
		base.state = Lifecycle::Unmounted;
		base.parent = None;
		base.last_rendered = None;
		trace!(key = self.key(), "Unmounted.");
		Ok(())
	}
}

/// An optional, owned view, like an overlay that is either open or closed.
#[derive(Debug)]
pub struct Slot<V: View>(Option<V>);

impl<V: View> Default for Slot<V> {
	fn default() -> Self {
		Self::empty()
	}
}

impl<V: View> Slot<V> {
	#[must_use]
	pub fn empty() -> Self {
		Self(None)
	}

	#[must_use]
	pub fn is_open(&self) -> bool {
		self.0.is_some()
	}

	#[must_use]
	pub fn get(&self) -> Option<&V> {
		self.0.as_ref()
	}

	pub fn get_mut(&mut self) -> Option<&mut V> {
		self.0.as_mut()
	}

	/// Initializes `view` and keeps it, closing the previous occupant first.
	pub fn open<D: Dom>(&mut self, engine: &mut Engine<D>, mut view: V, parent: &str, delegates: Vec<Delegate<D>>) -> Result<&mut V, Error> {
		self.close(engine)?;
		view.init(engine, parent, delegates)?;
		Ok(self.0.insert(view))
	}

	/// Removes the occupant, if any. Returns whether there was one.
	///
	/// The slot is only cleared once the removal has completed.
	pub fn close<D: Dom>(&mut self, engine: &mut Engine<D>) -> Result<bool, Error> {
		match &mut self.0 {
			Some(view) => {
				if view.is_mounted() {
					view.remove(engine)?;
				}
				self.0 = None;
				Ok(true)
			}
			None => Ok(false),
		}
	}
}
