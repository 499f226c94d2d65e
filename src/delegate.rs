//! Event delegation.
//!
//! Rules are matched against the live tree when an event arrives rather than bound to elements, so elements created
//! by later patches are covered without registering anything again. At most one native listener per event type is
//! installed on the document, for as long as at least one rule for that type exists.

use crate::{
	rc_hash_map::{CountSaturatedError, RcHashMap},
	Dom, Engine, Error, Selector,
};
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::{error, instrument, trace};

/// Owner of delegation rules. All rules of a scope are dropped together by [`Engine::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(u64);

/// A delegation handler. It receives the engine, so it can patch or remove views while the event is dispatched.
pub type Handler<D> = Rc<dyn Fn(&mut Engine<D>, &Delegated<'_, D>)>;

/// What a handler is told about the event it's invoked for.
pub struct Delegated<'a, D: Dom> {
	/// The element that matched the rule's selector: the target or its closest matching ancestor.
	pub element: D::Element,
	/// The element the native event was dispatched on.
	pub target: D::Element,
	pub event: &'a D::Event,
	pub event_type: &'a str,
}

/// An unregistered rule, as handed to [`View::init`](`crate::View::init`).
pub struct Delegate<D: Dom> {
	pub event_type: String,
	pub selector: String,
	pub handler: Handler<D>,
}

impl<D: Dom> Delegate<D> {
	pub fn new(event_type: impl Into<String>, selector: impl Into<String>, handler: impl Fn(&mut Engine<D>, &Delegated<'_, D>) + 'static) -> Self {
		Self {
			event_type: event_type.into(),
			selector: selector.into(),
			handler: Rc::new(handler),
		}
	}
}

struct Rule<D: Dom> {
	selector: Selector,
	handler: Handler<D>,
	scope: Scope,
}

pub(crate) struct Registry<D: Dom> {
	rules: HashMap<String, Vec<Rc<Rule<D>>>>,
	listeners: RcHashMap<String, u16, D::Listener>,
	next_scope: u64,
}

impl<D: Dom> Registry<D> {
	pub(crate) fn new() -> Self {
		Self {
			rules: HashMap::new(),
			listeners: RcHashMap::new(),
			next_scope: 0,
		}
	}
}

impl<D: Dom> Engine<D> {
	/// Allocates a scope that no rule belongs to yet.
	pub fn scope(&mut self) -> Scope {
		let scope = Scope(self.registry.next_scope);
		self.registry.next_scope += 1;
		scope
	}

	/// Registers a rule: `handler` runs for `event_type` events whose target, or one of its ancestors, matches
	/// `selector`.
	pub fn on(&mut self, event_type: &str, selector: &str, scope: Scope, handler: impl Fn(&mut Engine<D>, &Delegated<'_, D>) + 'static) -> Result<(), Error> {
		self.register(event_type, selector, scope, Rc::new(handler))
	}

	#[instrument(skip(self, handler))]
	pub(crate) fn register(&mut self, event_type: &str, selector: &str, scope: Scope, handler: Handler<D>) -> Result<(), Error> {
		let selector = Selector::parse(selector)?;

		let (dom, registry) = self.split();
		registry
			.listeners
			.increment_or_insert_with(event_type.to_owned(), || dom.listen(event_type))
			.map_err(|CountSaturatedError| Error::ListenerCountSaturated {
				event_type: event_type.to_owned(),
			})?;
		registry
			.rules
			.entry(event_type.to_owned())
			.or_default()
			.push(Rc::new(Rule { selector, handler, scope }));
		trace!("Registered.");
		Ok(())
	}

	/// Removes all rules owned by `scope` and uninstalls native listeners that are no longer needed.
	/// Returns how many rules were removed.
	#[instrument(skip(self))]
	pub fn off(&mut self, scope: Scope) -> usize {
		let (dom, registry) = self.split();
		let mut removed = 0;
		for (event_type, rules) in &mut registry.rules {
			let before = rules.len();
			rules.retain(|rule| rule.scope != scope);
			for _ in rules.len()..before {
				match registry.listeners.weak_decrement(event_type.as_str()) {
					Ok(Some(_)) => (),
					Ok(None) => error!("No native listener was tracked for {:?}.", event_type),
					Err(CountSaturatedError) => error!("Native listener for {:?} was released more often than acquired.", event_type),
				}
			}
			removed += before - rules.len();
		}
		registry.rules.retain(|_, rules| !rules.is_empty());
		for (event_type, listener) in registry.listeners.drain_weak() {
			dom.unlisten(&event_type, listener);
		}
		trace!("Removed {} rule(s).", removed);
		removed
	}

	/// The number of rules currently registered for `event_type`.
	#[must_use]
	pub fn rule_count(&self, event_type: &str) -> usize {
		self.registry.rules.get(event_type).map_or(0, Vec::len)
	}

	/// The number of rules currently owned by `scope`.
	#[must_use]
	pub fn scope_rule_count(&self, scope: Scope) -> usize {
		self.registry.rules.values().flatten().filter(|rule| rule.scope == scope).count()
	}

	/// Routes a native event to at most one handler.
	///
	/// Starting at `target` and moving outwards, each element is tested against the rules for `event_type` in
	/// registration order. The first match is invoked and dispatch stops there. Targets that aren't connected to the
	/// document are ignored. Returns whether a handler ran.
	///
	/// Rules are snapshotted up front, so handlers may register or remove rules freely.
	#[instrument(skip(self, target, event))]
	pub fn dispatch(&mut self, event_type: &str, target: &D::Element, event: &D::Event) -> bool {
		if !self.dom().is_connected(target) {
			trace!("Target is not connected. Ignoring.");
			return false;
		}
		let rules = match self.registry.rules.get(event_type) {
			Some(rules) => rules.clone(),
			None => return false,
		};

		let mut current = Some(target.clone());
		while let Some(element) = current {
			if let Some(rule) = rules.iter().find(|rule| self.dom().matches(&element, &rule.selector)) {
				trace!(selector = rule.selector.as_str(), "Matched.");
				let handler = Rc::clone(&rule.handler);
				handler(
					self,
					&Delegated {
						element,
						target: target.clone(),
						event,
						event_type,
					},
				);
				return true;
			}
			current = self.dom().parent_element(&element);
		}
		trace!("No rule matched.");
		false
	}
}
