//! The top header: board navigation with a board selection overlay.
//!
//! ```text
//! [all / a / b] [+]
//! ```
//!
//! Clicking `+` opens a [`BoardSelection`] form in the left panel and turns the glyph into `-`. Clicking `-`, or
//! submitting or cancelling the form, closes it again.

use crate::{
	storage::{flag, KeyValueStore},
	Delegate, Dom, Engine, Error, Form, FormLabels, FormRegions, Node, Scope, Slot, View, ViewBase,
};
use core::cell::RefCell;
use indexmap::IndexMap;
use std::rc::{Rc, Weak};
use tracing::{debug, error, instrument};

/// Storage key of the flag that makes board links point to catalog pages.
pub const POINT_TO_CATALOG: &str = "pointToCatalog";
pub const NAVIGATION_KEY: &str = "board-navigation";
pub const SELECTION_KEY: &str = "board-selection-form";
/// Mount point of the navigation.
pub const BANNER: &str = "banner";
/// Mount point of the selection form.
pub const LEFT_PANEL: &str = "left-panel";

/// The boards the site serves.
#[derive(Debug, Clone, Default)]
pub struct BoardIndex {
	/// Boards linked from the navigation, in order.
	pub boards: Vec<String>,
	/// Titles of all boards, listed in the selection form in order.
	pub titles: IndexMap<String, String>,
}

/// Localized captions.
#[derive(Debug, Clone)]
pub struct Labels {
	pub search: String,
	pub point_to_catalog: String,
	pub form: FormLabels,
}

impl Default for Labels {
	fn default() -> Self {
		Self {
			search: "Search".to_owned(),
			point_to_catalog: "Point to catalog".to_owned(),
			form: FormLabels {
				submit: "Apply".to_owned(),
				cancel: "Cancel".to_owned(),
			},
		}
	}
}

/// Whether board links should point to catalog pages.
pub fn point_to_catalog(store: &dyn KeyValueStore) -> bool {
	flag(store, POINT_TO_CATALOG)
}

#[must_use]
pub fn board_link(board: &str, catalog: bool) -> Node {
	let href = if catalog { format!("../{}/catalog", board) } else { format!("../{}/", board) };
	Node::new("a").attribute("href", href).text(board)
}

#[must_use]
pub fn format_title(board: &str, title: &str) -> String {
	format!("/{}/ - {}", board, title)
}

fn separator(text: &str) -> Node {
	Node::new("span").text(text)
}

/// The regions of the board selection form.
#[derive(Debug)]
pub struct BoardSelection {
	index: Rc<BoardIndex>,
	labels: Rc<Labels>,
	catalog: bool,
}

impl FormRegions for BoardSelection {
	fn render_inputs(&self) -> Node {
		Node::new("div").children([
			Node::new("input").attributes([
				("type", "text"),
				("class", "full-width"),
				("name", "search"),
				("placeholder", self.labels.search.as_str()),
			]),
			Node::new("br"),
		])
	}

	fn render_after_controls(&self) -> Vec<Node> {
		let mut checkbox = Node::new("input").attributes([("type", "checkbox"), ("name", POINT_TO_CATALOG)]);
		if self.catalog {
			checkbox = checkbox.attribute("checked", "");
		}
		vec![Node::new("label").children([checkbox, Node::new("span").text(self.labels.point_to_catalog.clone())])]
	}

	fn render_footer(&self) -> Node {
		Node::new("div").children(self.index.titles.iter().map(|(board, title)| {
			Node::new("label").children([
				Node::new("input").attributes([("type", "checkbox"), ("name", board.as_str())]),
				Node::new("a").attribute("href", format!("/{}/", board)).text(format_title(board, title)),
				Node::new("br"),
			])
		}))
	}

	fn on_submit<D: Dom>(&mut self, _: &mut Engine<D>, _: &D::Event) {
		debug!("Board selection submitted.");
	}
}

/// The `[all / …] [+]` navigation in the banner.
///
/// Owns the selection overlay. Its handlers only hold a weak reference to it, so keep the `Rc` returned by
/// [`BoardNavigation::new`] alive for as long as the navigation should respond.
///
/// Dropping it doesn't touch the document. Call [`BoardNavigation::unmount`] first to take down the navigation, any
/// open overlay and all of their delegation rules.
pub struct BoardNavigation {
	base: ViewBase,
	this: Weak<RefCell<BoardNavigation>>,
	index: Rc<BoardIndex>,
	labels: Rc<Labels>,
	store: Rc<dyn KeyValueStore>,
	selection: Slot<Form<BoardSelection>>,
}

impl BoardNavigation {
	#[must_use]
	pub fn new(index: BoardIndex, labels: Labels, store: Rc<dyn KeyValueStore>) -> Rc<RefCell<Self>> {
		Rc::new_cyclic(|this| {
			RefCell::new(Self {
				base: ViewBase::new(NAVIGATION_KEY),
				this: this.clone(),
				index: Rc::new(index),
				labels: Rc::new(labels),
				store,
				selection: Slot::empty(),
			})
		})
	}

	#[must_use]
	pub fn is_selection_open(&self) -> bool {
		self.selection.is_open()
	}

	#[must_use]
	pub fn selection(&self) -> Option<&Form<BoardSelection>> {
		self.selection.get()
	}

	/// Replaces a pre-rendered navigation, if any, and mounts into [`BANNER`].
	#[instrument(skip(self, engine))]
	pub fn mount<D: Dom>(&mut self, engine: &mut Engine<D>) -> Result<Scope, Error> {
		if engine.remove(NAVIGATION_KEY) {
			debug!("Replaced pre-rendered navigation.");
		}
		let this = self.this.clone();
		let toggle = Delegate::<D>::new("click", format!("#{} .board-selection", NAVIGATION_KEY), move |engine, _| {
			with_navigation(&this, |navigation| navigation.toggle_selection(engine));
		});
		self.init(engine, BANNER, vec![toggle])
	}

	pub fn toggle_selection<D: Dom>(&mut self, engine: &mut Engine<D>) -> Result<(), Error> {
		if self.selection.is_open() {
			self.close_selection(engine)
		} else {
			self.open_selection(engine)
		}
	}

	#[instrument(skip(self, engine))]
	pub fn open_selection<D: Dom>(&mut self, engine: &mut Engine<D>) -> Result<(), Error> {
		let form = Form::new(
			SELECTION_KEY,
			BoardSelection {
				index: Rc::clone(&self.index),
				labels: Rc::clone(&self.labels),
				catalog: point_to_catalog(&*self.store),
			},
			self.labels.form.clone(),
		);

		let this = self.this.clone();
		let submit = Delegate::<D>::new("submit", form.submit_selector(), move |engine, delegated| {
			with_navigation(&this, |navigation| navigation.submit_selection(engine, delegated.event));
		});
		let this = self.this.clone();
		let cancel = Delegate::<D>::new("click", form.cancel_selector(), move |engine, _| {
			with_navigation(&this, |navigation| navigation.close_selection(engine));
		});

		self.selection.open(engine, form, LEFT_PANEL, vec![submit, cancel])?;
		self.refresh(engine)
	}

	#[instrument(skip(self, engine))]
	pub fn close_selection<D: Dom>(&mut self, engine: &mut Engine<D>) -> Result<(), Error> {
		self.selection.close(engine)?;
		self.refresh(engine)
	}

	/// Closes the overlay if it's open, then removes the navigation along with its rules.
	#[instrument(skip(self, engine))]
	pub fn unmount<D: Dom>(&mut self, engine: &mut Engine<D>) -> Result<(), Error> {
		self.selection.close(engine)?;
		if self.is_mounted() {
			self.remove(engine)
		} else {
			Ok(())
		}
	}

	/// Lets the form handle a native `submit` event, then closes it.
	pub fn submit_selection<D: Dom>(&mut self, engine: &mut Engine<D>, event: &D::Event) -> Result<(), Error> {
		if let Some(form) = self.selection.get_mut() {
			form.submit(engine, event);
		}
		self.close_selection(engine)
	}

	fn refresh<D: Dom>(&mut self, engine: &mut Engine<D>) -> Result<(), Error> {
		if self.is_mounted() {
			self.patch(engine)
		} else {
			Ok(())
		}
	}
}

impl View for BoardNavigation {
	fn base(&self) -> &ViewBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut ViewBase {
		&mut self.base
	}

	fn render(&self) -> Node {
		let catalog = point_to_catalog(&*self.store);
		let mut children = vec![separator("["), board_link("all", catalog)];
		for board in &self.index.boards {
			children.push(separator(" / "));
			children.push(board_link(board, catalog));
		}
		children.push(separator("] ["));
		children.push(
			Node::new("a")
				.attribute("class", "board-selection bold mono")
				.text(if self.selection.is_open() { "-" } else { "+" }),
		);
		children.push(separator("]"));
		Node::new("nav").attribute("id", NAVIGATION_KEY).children(children)
	}
}

fn with_navigation(navigation: &Weak<RefCell<BoardNavigation>>, action: impl FnOnce(&mut BoardNavigation) -> Result<(), Error>) {
	let navigation = match navigation.upgrade() {
		Some(navigation) => navigation,
		None => return debug!("Board navigation is gone. Ignoring event."),
	};
	let mut navigation = match navigation.try_borrow_mut() {
		Ok(navigation) => navigation,
		Err(_) => return error!("Board navigation is already borrowed. Ignoring event."),
	};
	if let Err(error) = action(&mut navigation) {
		error!(%error, "Failed to update the board navigation.");
	}
}

/// Builds the board navigation and mounts it. The returned handle must be kept alive.
pub fn init_top_header<D: Dom>(
	engine: &mut Engine<D>,
	index: BoardIndex,
	labels: Labels,
	store: Rc<dyn KeyValueStore>,
) -> Result<Rc<RefCell<BoardNavigation>>, Error> {
	let navigation = BoardNavigation::new(index, labels, store);
	navigation.borrow_mut().mount(engine)?;
	Ok(navigation)
}
