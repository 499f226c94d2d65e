use retain_dom::{Delegated, Dom, Engine, Error, MemoryDom, MemoryEvent, Node, NodeId};
use std::{cell::RefCell, rc::Rc};

fn engine() -> Engine<MemoryDom> {
	Engine::new(MemoryDom::parse(
		r#"<div id="outer" class="zone"><div id="inner" class="zone"><button id="button" class="action">Go</button></div></div>"#,
	))
}

fn element(engine: &Engine<MemoryDom>, key: &str) -> NodeId {
	engine.dom().element_by_id(key).unwrap()
}

type Log = Rc<RefCell<Vec<String>>>;

fn recorder(log: &Log, name: &'static str) -> impl Fn(&mut Engine<MemoryDom>, &Delegated<'_, MemoryDom>) + 'static {
	let log = Rc::clone(log);
	move |engine: &mut Engine<MemoryDom>, delegated: &Delegated<'_, MemoryDom>| {
		let key = engine.dom().attribute(&delegated.element, "id").unwrap_or_default();
		log.borrow_mut().push(format!("{}@{}", name, key));
	}
}

#[test]
fn closest_match_wins_and_runs_once() {
	let mut engine = engine();
	let log = Log::default();
	let scope = engine.scope();
	engine.on("click", ".zone", scope, recorder(&log, "zone")).unwrap();
	engine.on("click", "#outer", scope, recorder(&log, "outer")).unwrap();

	let button = element(&engine, "button");
	engine.fire("click", button);

	assert_eq!(*log.borrow(), ["zone@inner"]);
}

#[test]
fn registration_order_breaks_ties() {
	let mut engine = engine();
	let log = Log::default();
	let scope = engine.scope();
	engine.on("click", ".action", scope, recorder(&log, "first")).unwrap();
	engine.on("click", "button", scope, recorder(&log, "second")).unwrap();

	let button = element(&engine, "button");
	engine.fire("click", button);

	assert_eq!(*log.borrow(), ["first@button"]);
}

#[test]
fn other_event_types_are_separate() {
	let mut engine = engine();
	let log = Log::default();
	let scope = engine.scope();
	engine.on("submit", ".action", scope, recorder(&log, "submit")).unwrap();

	let button = element(&engine, "button");
	engine.fire("click", button);
	assert!(log.borrow().is_empty());

	engine.fire("submit", button);
	assert_eq!(*log.borrow(), ["submit@button"]);
}

#[test]
fn elements_created_later_are_covered() {
	let mut engine = engine();
	let log = Log::default();
	let scope = engine.scope();
	engine.on("click", "a.late", scope, recorder(&log, "late")).unwrap();

	let link = engine.append("outer", &Node::new("a").attribute("id", "link").attribute("class", "late")).unwrap();
	engine.fire("click", link);

	assert_eq!(*log.borrow(), ["late@link"]);
}

#[test]
fn one_native_listener_per_event_type() {
	let mut engine = engine();
	let first = engine.scope();
	let second = engine.scope();
	engine.on("click", ".zone", first, |_, _| ()).unwrap();
	engine.on("click", ".action", first, |_, _| ()).unwrap();
	engine.on("click", "#outer", second, |_, _| ()).unwrap();
	engine.on("input", "#outer", second, |_, _| ()).unwrap();

	assert_eq!(engine.dom().listener_count("click"), 1);
	assert_eq!(engine.dom().listener_count("input"), 1);
	assert_eq!(engine.rule_count("click"), 3);
	assert_eq!(engine.scope_rule_count(first), 2);

	assert_eq!(engine.off(first), 2);
	assert_eq!(engine.rule_count("click"), 1);
	assert_eq!(engine.dom().listener_count("click"), 1);

	assert_eq!(engine.off(second), 2);
	assert_eq!(engine.rule_count("click"), 0);
	assert_eq!(engine.dom().listener_count("click"), 0);
	assert_eq!(engine.dom().listener_count("input"), 0);

	assert_eq!(engine.off(second), 0);
}

#[test]
fn off_stops_dispatch() {
	let mut engine = engine();
	let log = Log::default();
	let scope = engine.scope();
	engine.on("click", "button", scope, recorder(&log, "button")).unwrap();
	engine.off(scope);

	let button = element(&engine, "button");
	let event = engine.fire("click", button);

	assert!(log.borrow().is_empty());
	assert!(!event.default_prevented());
}

#[test]
fn detached_targets_are_ignored() {
	let mut engine = engine();
	let log = Log::default();
	let scope = engine.scope();
	engine.on("click", "p", scope, recorder(&log, "p")).unwrap();

	let detached = engine.realize(&Node::new("p").attribute("id", "detached"));
	engine.fire("click", detached);

	assert!(log.borrow().is_empty());
	assert!(!engine.dispatch("click", &detached, &MemoryEvent::new()));
}

#[test]
fn handlers_can_patch_and_unregister() {
	let mut engine = engine();
	let count = Rc::new(RefCell::new(0));
	let scope = engine.scope();
	engine
		.on("click", "#button", scope, {
			let count = Rc::clone(&count);
			move |engine: &mut Engine<MemoryDom>, delegated: &Delegated<'_, MemoryDom>| {
				*count.borrow_mut() += 1;
				engine.dom().prevent_default(delegated.event);
				engine
					.patch("inner", &Node::new("div").attribute("class", "zone").child(Node::new("span").text("done")))
					.unwrap();
				engine.off(scope);
			}
		})
		.unwrap();

	let button = element(&engine, "button");
	let event = engine.fire("click", button);

	assert!(event.default_prevented());
	assert_eq!(*count.borrow(), 1);
	assert!(!engine.dom().contains(button));
	assert_eq!(engine.dom().listener_count("click"), 0);
	let inner = element(&engine, "inner");
	assert_eq!(engine.dom().inner_markup(inner).unwrap(), "<span>done</span>");
}

#[test]
fn rules_added_during_dispatch_apply_to_the_next_event() {
	let mut engine = engine();
	let log = Log::default();
	let scope = engine.scope();
	engine
		.on("click", "#inner", scope, {
			let log = Rc::clone(&log);
			move |engine: &mut Engine<MemoryDom>, _: &Delegated<'_, MemoryDom>| {
				log.borrow_mut().push("inner".to_owned());
				let log = Rc::clone(&log);
				engine
					.on("click", "#button", scope, move |_, _| log.borrow_mut().push("button".to_owned()))
					.unwrap();
			}
		})
		.unwrap();

	let button = element(&engine, "button");
	engine.fire("click", button);
	assert_eq!(*log.borrow(), ["inner"]);

	engine.fire("click", button);
	assert_eq!(*log.borrow(), ["inner", "button"]);
}

#[test]
fn invalid_selectors_are_rejected() {
	let mut engine = engine();
	let scope = engine.scope();
	for selector in ["", "a:hover", "a + b", "div >", "[unterminated"] {
		assert!(
			matches!(engine.on("click", selector, scope, |_, _| ()), Err(Error::InvalidSelector { .. })),
			"{:?} was accepted",
			selector,
		);
	}
	assert_eq!(engine.rule_count("click"), 0);
	assert_eq!(engine.dom().listener_count("click"), 0);
}
