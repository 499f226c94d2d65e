//! Reading live elements back into [`Node`]s.

use crate::{dom::ChildNode, node::Escaped, Content, Dom, Node};

/// Serializes `element` and its subtree.
///
/// An element with a single text child loads as [`Content::Text`] and one with only element children as
/// [`Content::Children`]. Anything else (several text runs, or text mixed with elements) can't be expressed as a
/// tree of [`Node`]s and loads as [`Content::Html`] holding the escaped inner markup.
pub fn load_element<D: Dom>(dom: &D, element: &D::Element) -> Node {
	Node::from_parts(dom.tag_name(element), dom.attributes(element), load_child_nodes(dom, dom.child_nodes(element)))
}

pub fn load_child_nodes<D: Dom>(dom: &D, child_nodes: Vec<ChildNode<D::Element>>) -> Content {
	match child_nodes.as_slice() {
		[ChildNode::Text(text)] => Content::Text(text.clone()),
		nodes if nodes.iter().all(|node| matches!(node, ChildNode::Element(_))) => Content::Children(
			child_nodes
				.iter()
				.filter_map(|node| match node {
					ChildNode::Element(element) => Some(load_element(dom, element)),
					ChildNode::Text(_) => None,
				})
				.collect(),
		),
		nodes => {
			let mut markup = String::new();
			for node in nodes {
				match node {
					ChildNode::Element(element) => markup.push_str(&load_element(dom, element).to_string()),
					ChildNode::Text(text) => markup.push_str(&Escaped::text(text).to_string()),
				}
			}
			Content::Html(markup)
		}
	}
}
