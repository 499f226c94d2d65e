use retain_dom::{
	header::{board_link, format_title, init_top_header, point_to_catalog, BoardIndex, BoardNavigation, Labels, NAVIGATION_KEY, SELECTION_KEY},
	Dom, Engine, KeyValueStore, MemoryDom, MemoryStore, Node, View,
};
use std::{cell::RefCell, rc::Rc};

fn index() -> BoardIndex {
	BoardIndex {
		boards: vec!["a".to_owned(), "b".to_owned()],
		titles: [("a", "Animals"), ("b", "Random")].into_iter().map(|(board, title)| (board.to_owned(), title.to_owned())).collect(),
	}
}

fn page() -> Engine<MemoryDom> {
	Engine::new(MemoryDom::parse(
		r#"<header id="banner"><nav id="board-navigation">[pre-rendered]</nav></header><div id="left-panel"></div>"#,
	))
}

fn setup(store: MemoryStore) -> (Engine<MemoryDom>, Rc<MemoryStore>, Rc<RefCell<BoardNavigation>>) {
	let mut engine = page();
	let store = Rc::new(store);
	let navigation = init_top_header(&mut engine, index(), Labels::default(), Rc::clone(&store) as Rc<dyn KeyValueStore>).unwrap();
	(engine, store, navigation)
}

fn navigation_markup(engine: &Engine<MemoryDom>) -> String {
	let navigation = engine.dom().element_by_id(NAVIGATION_KEY).unwrap();
	engine.dom().inner_markup(navigation).unwrap()
}

fn click_toggle(engine: &mut Engine<MemoryDom>) {
	let toggle = engine.dom().query("#board-navigation a.board-selection").unwrap().unwrap();
	engine.fire("click", toggle);
}

#[test]
fn links() {
	assert_eq!(board_link("a", false), Node::new("a").attribute("href", "../a/").text("a"));
	assert_eq!(board_link("a", true), Node::new("a").attribute("href", "../a/catalog").text("a"));
	assert_eq!(format_title("a", "Animals"), "/a/ - Animals");
}

#[test]
fn catalog_flag() {
	let store = MemoryStore::new();
	assert!(!point_to_catalog(&store));
	store.set("pointToCatalog", "false");
	assert!(!point_to_catalog(&store));
	store.set("pointToCatalog", "true");
	assert!(point_to_catalog(&store));
}

#[test]
fn navigation_replaces_pre_rendered_markup() {
	let (engine, _, _) = setup(MemoryStore::new());

	assert_eq!(engine.dom().query_all("#board-navigation").unwrap().len(), 1);
	let banner = engine.dom().element_by_id("banner").unwrap();
	let navigation = engine.dom().element_by_id(NAVIGATION_KEY).unwrap();
	assert_eq!(engine.dom().parent_element(&navigation), Some(banner));
	assert_eq!(
		navigation_markup(&engine),
		concat!(
			r#"<span>[</span><a href="../all/">all</a>"#,
			r#"<span> / </span><a href="../a/">a</a>"#,
			r#"<span> / </span><a href="../b/">b</a>"#,
			r#"<span>] [</span><a class="board-selection bold mono">+</a><span>]</span>"#,
		)
	);
}

#[test]
fn links_follow_the_catalog_flag() {
	let (mut engine, store, navigation) = setup([("pointToCatalog", "true")].into_iter().collect());
	assert!(navigation_markup(&engine).contains(r#"<a href="../all/catalog">all</a>"#));
	assert!(navigation_markup(&engine).contains(r#"<a href="../b/catalog">b</a>"#));

	store.set("pointToCatalog", "yes");
	navigation.borrow_mut().patch(&mut engine).unwrap();
	assert!(navigation_markup(&engine).contains(r#"<a href="../all/">all</a>"#));
	assert!(!navigation_markup(&engine).contains("catalog"));
}

#[test]
fn toggle_opens_and_closes_the_selection() {
	let (mut engine, _, navigation) = setup(MemoryStore::new());

	click_toggle(&mut engine);
	assert!(navigation.borrow().is_selection_open());
	assert!(navigation_markup(&engine).contains(r#"<a class="board-selection bold mono">-</a>"#));
	let form = engine.dom().element_by_id(SELECTION_KEY).unwrap();
	assert_eq!(engine.dom().parent_element(&form), engine.dom().element_by_id("left-panel"));
	assert_eq!(engine.rule_count("submit"), 1);

	click_toggle(&mut engine);
	assert!(!navigation.borrow().is_selection_open());
	assert!(navigation_markup(&engine).contains(r#"<a class="board-selection bold mono">+</a>"#));
	assert!(!engine.is_mounted(SELECTION_KEY));
	assert_eq!(engine.rule_count("submit"), 0);
	assert_eq!(engine.rule_count("click"), 1);
	assert_eq!(engine.dom().listener_count("submit"), 0);
}

#[test]
fn selection_form_contents() {
	let (mut engine, _, navigation) = setup([("pointToCatalog", "true")].into_iter().collect());
	click_toggle(&mut engine);

	let dom = engine.dom();
	let search = dom.query("#board-selection-form input[name=search]").unwrap().unwrap();
	assert_eq!(dom.attribute(&search, "placeholder").as_deref(), Some("Search"));
	let catalog = dom.query("#board-selection-form .form-controls input[name=pointToCatalog]").unwrap().unwrap();
	assert_eq!(dom.attribute(&catalog, "checked").as_deref(), Some(""));
	let submit = dom.query("#board-selection-form input[type=submit]").unwrap().unwrap();
	assert_eq!(dom.attribute(&submit, "value").as_deref(), Some("Apply"));

	let boards = dom.query_all("#board-selection-form .form-footer label").unwrap();
	assert_eq!(boards.len(), 2);
	assert_eq!(
		dom.markup(boards[0]).unwrap(),
		r#"<label><input type="checkbox" name="a"><a href="/a/">/a/ - Animals</a><br></label>"#
	);

	let selection = navigation.borrow();
	let form = selection.selection().unwrap();
	assert_eq!(form.key(), SELECTION_KEY);
	assert!(form.is_mounted());
}

#[test]
fn cancel_closes_the_selection() {
	let (mut engine, _, navigation) = setup(MemoryStore::new());
	click_toggle(&mut engine);

	let cancel = engine.dom().query("#board-selection-form input[name=cancel]").unwrap().unwrap();
	engine.fire("click", cancel);

	assert!(!navigation.borrow().is_selection_open());
	assert!(!engine.is_mounted(SELECTION_KEY));
	assert!(navigation_markup(&engine).contains(">+</a>"));
}

#[test]
fn submit_closes_the_selection() {
	let (mut engine, _, navigation) = setup(MemoryStore::new());
	click_toggle(&mut engine);

	let form = engine.dom().element_by_id(SELECTION_KEY).unwrap();
	let event = engine.fire("submit", form);

	assert!(event.default_prevented());
	assert!(!navigation.borrow().is_selection_open());
	assert!(!engine.is_mounted(SELECTION_KEY));
	assert!(navigation_markup(&engine).contains(">+</a>"));
	assert_eq!(engine.dom().listener_count("submit"), 0);
}

#[test]
fn dropped_navigation_ignores_events() {
	let (mut engine, _, navigation) = setup(MemoryStore::new());
	drop(navigation);

	click_toggle(&mut engine);
	assert!(!engine.is_mounted(SELECTION_KEY));
	assert!(navigation_markup(&engine).contains(">+</a>"));
}

#[test]
fn missing_left_panel_is_tolerated() {
	let mut engine = Engine::new(MemoryDom::parse(r#"<header id="banner"></header>"#));
	let navigation = init_top_header(&mut engine, index(), Labels::default(), Rc::new(MemoryStore::new())).unwrap();

	click_toggle(&mut engine);
	assert!(navigation.borrow().is_selection_open());
	assert!(!engine.is_mounted(SELECTION_KEY));
	assert!(navigation_markup(&engine).contains(">-</a>"));

	click_toggle(&mut engine);
	assert!(!navigation.borrow().is_selection_open());
}

#[test]
fn closed_selection_ignores_its_former_elements() {
	let (mut engine, _, navigation) = setup(MemoryStore::new());
	click_toggle(&mut engine);
	let former_cancel = engine.dom().query("#board-selection-form input[name=cancel]").unwrap().unwrap();
	let former_form = engine.dom().element_by_id(SELECTION_KEY).unwrap();

	click_toggle(&mut engine);
	assert!(!navigation.borrow().is_selection_open());

	engine.fire("click", former_cancel);
	let event = engine.fire("submit", former_form);
	assert!(!event.default_prevented());
	assert!(!navigation.borrow().is_selection_open());
	assert!(navigation_markup(&engine).contains(">+</a>"));

	click_toggle(&mut engine);
	engine.fire("click", former_cancel);
	assert!(navigation.borrow().is_selection_open());
	assert!(navigation_markup(&engine).contains(">-</a>"));
}

#[test]
fn unmount_takes_down_navigation_and_overlay() {
	let (mut engine, _, navigation) = setup(MemoryStore::new());
	click_toggle(&mut engine);

	navigation.borrow_mut().unmount(&mut engine).unwrap();
	assert!(!navigation.borrow().is_selection_open());
	assert!(!navigation.borrow().is_mounted());
	assert!(!engine.is_mounted(NAVIGATION_KEY));
	assert!(!engine.is_mounted(SELECTION_KEY));
	assert_eq!(engine.rule_count("click"), 0);
	assert_eq!(engine.rule_count("submit"), 0);
	assert_eq!(engine.dom().listener_count("click"), 0);

	navigation.borrow_mut().unmount(&mut engine).unwrap();
}
