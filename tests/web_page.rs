#![cfg(target_arch = "wasm32")]

use retain_dom::{
	header::{init_top_header, BoardIndex, Labels, NAVIGATION_KEY, SELECTION_KEY},
	storage::LocalStorage,
	web::{install, with_page, WebDom},
	Engine, Node, View,
};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

static mut LOG_INITIALIZED: bool = false;

fn init_log() {
	unsafe {
		if !LOG_INITIALIZED {
			tracing_wasm::set_as_global_default();
			LOG_INITIALIZED = true;
		}
	}
}

fn setup(markup: &str) {
	init_log();
	let document = window().unwrap().document().unwrap();
	document.body().unwrap().set_inner_html(markup);
	install(Engine::new(WebDom::new(document)));
}

fn click(id: &str) {
	let element: HtmlElement = window().unwrap().document().unwrap().get_element_by_id(id).unwrap().dyn_into().unwrap();
	element.click();
}

#[wasm_bindgen_test]
fn delegated_click() {
	setup(r#"<div id="root"></div>"#);

	let count = Rc::new(RefCell::new(0));
	let scope = with_page(|engine| {
		let scope = engine.scope();
		let count = Rc::clone(&count);
		engine.on("click", "#root button", scope, move |_, _| *count.borrow_mut() += 1).unwrap();
		engine.append("root", &Node::new("button").attribute("id", "button").child(Node::new("b").attribute("id", "bold").text("Go")));
		scope
	})
	.unwrap();

	assert_eq!(*count.borrow(), 0);
	click("button");
	assert_eq!(*count.borrow(), 1);
	click("bold");
	assert_eq!(*count.borrow(), 2);

	assert_eq!(with_page(|engine| engine.off(scope)), Some(1));
}

#[wasm_bindgen_test]
fn board_selection_overlay() {
	setup(r#"<header id="banner"></header><div id="left-panel"></div>"#);

	let navigation = with_page(|engine| {
		init_top_header(
			engine,
			BoardIndex {
				boards: vec!["a".to_owned()],
				..BoardIndex::default()
			},
			Labels::default(),
			Rc::new(LocalStorage),
		)
		.unwrap()
	})
	.unwrap();

	let document = window().unwrap().document().unwrap();
	let toggle: HtmlElement = document
		.query_selector("#board-navigation .board-selection")
		.unwrap()
		.unwrap()
		.dyn_into()
		.unwrap();
	toggle.click();
	assert!(navigation.borrow().is_selection_open());
	assert!(document.get_element_by_id(SELECTION_KEY).is_some());

	let cancel: HtmlElement = document
		.query_selector("#board-selection-form input[name=cancel]")
		.unwrap()
		.unwrap()
		.dyn_into()
		.unwrap();
	cancel.click();
	assert!(!navigation.borrow().is_selection_open());
	assert!(document.get_element_by_id(SELECTION_KEY).is_none());
	assert!(document.get_element_by_id(NAVIGATION_KEY).unwrap().text_content().unwrap().ends_with("[+]"));

	with_page(|engine| navigation.borrow_mut().unmount(engine)).unwrap().unwrap();
	assert_eq!(with_page(|engine| engine.rule_count("click")), Some(0));
	assert!(document.get_element_by_id(NAVIGATION_KEY).is_none());
}
