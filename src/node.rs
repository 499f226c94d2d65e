//! Immutable descriptions of desired markup.
//!
//! A [`Node`] is plain data: building one never touches a document. Views produce a fresh tree on every render and
//! hand it to the [`Engine`](`crate::Engine`), which realizes it.

use core::fmt::{self, Display, Formatter, Write as _};
use indexmap::IndexMap;

/// Attribute names mapped to their values, in insertion order.
pub type Attributes = IndexMap<String, String>;

/// What an element contains. Exactly one of these is present for any [`Node`].
///
/// An empty element always has empty [`Content::Children`]. The builders never produce empty text or markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
	/// Child elements.
	Children(Vec<Node>),
	/// Markup that is inserted as-is.
	///
	/// **This bypasses all escaping.** Only use it for caller-controlled markup that has already been sanitized.
	Html(String),
	/// Plain text, escaped on realization.
	Text(String),
}

impl Default for Content {
	fn default() -> Self {
		Content::Children(Vec::new())
	}
}

/// An element description: tag, attributes and [`Content`].
///
/// Attribute values and text are escaped whenever the node is realized or rendered to markup.
/// [`Content::Html`] is the only way around that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	tag: String,
	attributes: Attributes,
	content: Content,
}

impl Node {
	/// Creates an empty element. The tag is normalized to ASCII lowercase.
	#[must_use]
	pub fn new(tag: impl Into<String>) -> Self {
		let mut tag = tag.into();
		tag.make_ascii_lowercase();
		Self {
			tag,
			attributes: Attributes::new(),
			content: Content::default(),
		}
	}

	/// The `{tag, attributes, children}` shorthand.
	#[must_use]
	pub fn element<K, V>(tag: impl Into<String>, attributes: impl IntoIterator<Item = (K, V)>, children: impl IntoIterator<Item = Node>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self::new(tag).attributes(attributes).children(children)
	}

	#[must_use]
	pub fn from_parts(tag: impl Into<String>, attributes: impl IntoIterator<Item = (String, String)>, content: Content) -> Self {
		let node = Self::new(tag).attributes(attributes);
		match content {
			Content::Children(children) => node.children(children),
			Content::Html(html) => node.html(html),
			Content::Text(text) => node.text(text),
		}
	}

	/// Sets an attribute, replacing any previous value with the same name.
	///
	/// Names are normalized to ASCII lowercase, as documents do.
	#[must_use]
	pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		let mut name = name.into();
		name.make_ascii_lowercase();
		self.attributes.insert(name, value.into());
		self
	}

	#[must_use]
	pub fn attributes<K, V>(self, attributes: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		attributes.into_iter().fold(self, |node, (name, value)| node.attribute(name, value))
	}

	/// Appends a child element. Any text or raw markup set before is discarded.
	#[must_use]
	pub fn child(self, child: Node) -> Self {
		self.children(Some(child))
	}

	/// Appends child elements. Any text or raw markup set before is discarded.
	#[must_use]
	pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
		match &mut self.content {
			Content::Children(existing) => existing.extend(children),
			other => *other = Content::Children(children.into_iter().collect()),
		}
		self
	}

	/// Replaces the content with plain text. Empty text leaves the element empty.
	#[must_use]
	pub fn text(mut self, text: impl Into<String>) -> Self {
		let text = text.into();
		self.content = if text.is_empty() { Content::default() } else { Content::Text(text) };
		self
	}

	/// Replaces the content with raw markup. See [`Content::Html`]. Empty markup leaves the element empty.
	#[must_use]
	pub fn html(mut self, html: impl Into<String>) -> Self {
		let html = html.into();
		self.content = if html.is_empty() { Content::default() } else { Content::Html(html) };
		self
	}

	#[must_use]
	pub fn tag(&self) -> &str {
		&self.tag
	}

	#[must_use]
	pub fn get_attributes(&self) -> &Attributes {
		&self.attributes
	}

	#[must_use]
	pub fn get_attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name.to_ascii_lowercase().as_str()).map(String::as_str)
	}

	/// The ids of this node and of every node below it in [`Content::Children`], in document order.
	///
	/// Ids inside [`Content::Html`] aren't parsed and so aren't included.
	#[must_use]
	pub fn keys(&self) -> Vec<&str> {
		let mut keys = Vec::new();
		self.collect_keys(&mut keys);
		keys
	}

	fn collect_keys<'a>(&'a self, keys: &mut Vec<&'a str>) {
		keys.extend(self.id());
		if let Content::Children(children) = &self.content {
			for child in children {
				child.collect_keys(keys);
			}
		}
	}

	#[must_use]
	pub fn id(&self) -> Option<&str> {
		self.get_attribute("id")
	}

	#[must_use]
	pub fn content(&self) -> &Content {
		&self.content
	}

	/// Whether this is a void element, which can't have content in markup.
	#[must_use]
	pub fn is_void(&self) -> bool {
		is_void_element(&self.tag)
	}
}

pub(crate) fn is_void_element(tag: &str) -> bool {
	matches!(
		tag,
		"area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "source" | "track" | "wbr"
	)
}

/// Renders the node as markup.
///
/// Attribute values and text are escaped, [`Content::Html`] is written verbatim.
/// Void elements are rendered without closing tag and their content is skipped.
impl Display for Node {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "<{}", self.tag)?;
		for (name, value) in &self.attributes {
			write!(f, " {}=\"{}\"", name, Escaped::attribute(value))?;
		}
		f.write_char('>')?;
		if self.is_void() {
			return Ok(());
		}
		match &self.content {
			Content::Children(children) => {
				for child in children {
					Display::fmt(child, f)?;
				}
			}
			Content::Html(html) => f.write_str(html)?,
			Content::Text(text) => Display::fmt(&Escaped::text(text), f)?,
		}
		write!(f, "</{}>", self.tag)
	}
}

/// Escapes a string for use in markup while formatting it.
pub(crate) struct Escaped<'a> {
	value: &'a str,
	in_attribute: bool,
}

impl<'a> Escaped<'a> {
	pub(crate) fn text(value: &'a str) -> Self {
		Self { value, in_attribute: false }
	}

	pub(crate) fn attribute(value: &'a str) -> Self {
		Self { value, in_attribute: true }
	}
}

impl Display for Escaped<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let mut rest = self.value;
		while let Some(i) = rest.find(|c: char| matches!(c, '&' | '<' | '>') || (self.in_attribute && c == '"')) {
			f.write_str(&rest[..i])?;
			f.write_str(match rest.as_bytes()[i] {
				b'&' => "&amp;",
				b'<' => "&lt;",
				b'>' => "&gt;",
				_ => "&quot;",
			})?;
			rest = &rest[i + 1..];
		}
		f.write_str(rest)
	}
}
