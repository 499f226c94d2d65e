//! Forms as views.
//!
//! [`Form`] provides the frame every form shares (the `<form>` element, the submit and cancel controls and a footer
//! area) and leaves the regions to a [`FormRegions`] implementation.

use crate::{Dom, Engine, Node, View, ViewBase};
use tracing::debug;

/// The parts of a form that differ between forms.
pub trait FormRegions {
	/// The input fields, placed first.
	fn render_inputs(&self) -> Node;

	/// Extra nodes placed after the submit and cancel controls.
	fn render_after_controls(&self) -> Vec<Node> {
		Vec::new()
	}

	fn render_footer(&self) -> Node;

	/// Called by [`Form::submit`] once the native submission has been prevented.
	fn on_submit<D: Dom>(&mut self, engine: &mut Engine<D>, event: &D::Event);
}

/// Captions of the built-in controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLabels {
	pub submit: String,
	pub cancel: String,
}

impl Default for FormLabels {
	fn default() -> Self {
		Self {
			submit: "Submit".to_owned(),
			cancel: "Cancel".to_owned(),
		}
	}
}

#[derive(Debug)]
pub struct Form<R: FormRegions> {
	base: ViewBase,
	regions: R,
	labels: FormLabels,
}

impl<R: FormRegions> Form<R> {
	#[must_use]
	pub fn new(key: impl Into<String>, regions: R, labels: FormLabels) -> Self {
		Self {
			base: ViewBase::new(key),
			regions,
			labels,
		}
	}

	#[must_use]
	pub fn regions(&self) -> &R {
		&self.regions
	}

	/// Changes only show up after the next [`View::patch`].
	pub fn regions_mut(&mut self) -> &mut R {
		&mut self.regions
	}

	#[must_use]
	pub fn labels(&self) -> &FormLabels {
		&self.labels
	}

	/// Handles a native `submit` event: the browser's own submission is always prevented.
	pub fn submit<D: Dom>(&mut self, engine: &mut Engine<D>, event: &D::Event) {
		engine.dom().prevent_default(event);
		debug!(key = self.key(), "Submitted.");
		self.regions.on_submit(engine, event);
	}

	/// Matches the form element itself, for `submit` delegates.
	#[must_use]
	pub fn submit_selector(&self) -> String {
		format!("#{}", self.key())
	}

	/// Matches the cancel button, for `click` delegates.
	#[must_use]
	pub fn cancel_selector(&self) -> String {
		format!("#{} input[name=cancel]", self.key())
	}
}

impl<R: FormRegions> View for Form<R> {
	fn base(&self) -> &ViewBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut ViewBase {
		&mut self.base
	}

	fn render(&self) -> Node {
		let controls = Node::new("div")
			.attribute("class", "form-controls")
			.child(Node::new("input").attribute("type", "submit").attribute("value", self.labels.submit.clone()))
			.child(
				Node::new("input")
					.attribute("type", "button")
					.attribute("name", "cancel")
					.attribute("value", self.labels.cancel.clone()),
			)
			.children(self.regions.render_after_controls());

		Node::new("form").attribute("id", self.key()).children([
			self.regions.render_inputs(),
			controls,
			Node::new("div").attribute("class", "form-footer").child(self.regions.render_footer()),
		])
	}
}
