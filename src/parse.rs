//! A small, forgiving markup fragment parser backing [`Dom::set_inner_html`](`crate::Dom::set_inner_html`) in
//! [`MemoryDom`](`crate::MemoryDom`).
//!
//! It understands elements, quoted and unquoted attributes, void elements, self-closing syntax, comments (dropped)
//! and the common character references. Unbalanced end tags are ignored and open elements are closed at the end
//! of input, roughly like a browser would for well-formed snippets.

use crate::node::is_void_element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fragment {
	Element {
		tag: String,
		attributes: Vec<(String, String)>,
		children: Vec<Fragment>,
	},
	Text(String),
}

pub(crate) fn parse_fragment(markup: &str) -> Vec<Fragment> {
	Parser { rest: markup, open: Vec::new(), root: Vec::new() }.run()
}

struct Parser<'a> {
	rest: &'a str,
	open: Vec<(String, Vec<(String, String)>, Vec<Fragment>)>,
	root: Vec<Fragment>,
}

impl<'a> Parser<'a> {
	fn run(mut self) -> Vec<Fragment> {
		while !self.rest.is_empty() {
			if let Some(comment) = self.rest.strip_prefix("<!--") {
				self.rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
			} else if let Some(end_tag) = self.rest.strip_prefix("</") {
				let (name, rest) = end_tag.split_at(end_tag.find('>').unwrap_or(end_tag.len()));
				self.rest = rest.strip_prefix('>').unwrap_or(rest);
				self.close(&name.trim().to_ascii_lowercase());
			} else if self.rest.starts_with('<') && self.rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
				self.rest = &self.rest[1..];
				self.start_tag();
			} else {
				let first = self.rest.chars().next().map_or(1, char::len_utf8);
				let end = self.rest[first..].find('<').map_or(self.rest.len(), |i| i + first);
				let text = decode_references(&self.rest[..end]);
				self.rest = &self.rest[end..];
				self.push(Fragment::Text(text));
			}
		}
		while !self.open.is_empty() {
			self.pop();
		}
		self.root
	}

	fn start_tag(&mut self) {
		let tag = self.take_while(|c| !c.is_whitespace() && c != '>' && c != '/').to_ascii_lowercase();
		let mut attributes: Vec<(String, String)> = Vec::new();
		let mut self_closing = false;
		loop {
			self.take_while(char::is_whitespace);
			if let Some(rest) = self.rest.strip_prefix("/>") {
				self.rest = rest;
				self_closing = true;
				break;
			}
			if let Some(rest) = self.rest.strip_prefix('>') {
				self.rest = rest;
				break;
			}
			if let Some(rest) = self.rest.strip_prefix('/') {
				self.rest = rest;
				continue;
			}
			if self.rest.is_empty() {
				break;
			}

			let name = self.take_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/').to_ascii_lowercase();
			self.take_while(char::is_whitespace);
			let value = if let Some(rest) = self.rest.strip_prefix('=') {
				self.rest = rest;
				self.take_while(char::is_whitespace);
				self.attribute_value()
			} else {
				String::new()
			};
			if !attributes.iter().any(|(existing, _)| *existing == name) {
				attributes.push((name, value));
			}
		}

		if self_closing || is_void_element(&tag) {
			self.push(Fragment::Element { tag, attributes, children: Vec::new() });
		} else {
			self.open.push((tag, attributes, Vec::new()));
		}
	}

	fn attribute_value(&mut self) -> String {
		match self.rest.chars().next() {
			Some(quote @ ('"' | '\'')) => {
				let quoted = &self.rest[1..];
				let end = quoted.find(quote).unwrap_or(quoted.len());
				let value = decode_references(&quoted[..end]);
				self.rest = quoted.get(end + 1..).unwrap_or("");
				value
			}
			_ => decode_references(self.take_while(|c| !c.is_whitespace() && c != '>')),
		}
	}

	fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
		let end = self.rest.find(|c: char| !predicate(c)).unwrap_or(self.rest.len());
		let (taken, rest) = self.rest.split_at(end);
		self.rest = rest;
		taken
	}

	/// Appends to the innermost open element, merging adjacent text.
	fn push(&mut self, fragment: Fragment) {
		let siblings = match self.open.last_mut() {
			Some((_, _, children)) => children,
			None => &mut self.root,
		};
		if let Fragment::Text(text) = &fragment {
			if let Some(Fragment::Text(previous)) = siblings.last_mut() {
				previous.push_str(text);
				return;
			}
		}
		siblings.push(fragment);
	}

	fn pop(&mut self) {
		if let Some((tag, attributes, children)) = self.open.pop() {
			self.push(Fragment::Element { tag, attributes, children });
		}
	}

	fn close(&mut self, tag: &str) {
		if let Some(depth) = self.open.iter().rposition(|(open, _, _)| open == tag) {
			while self.open.len() > depth {
				self.pop();
			}
		}
	}
}

/// Decodes the character references that commonly appear in generated markup. Unknown ones are kept verbatim.
pub(crate) fn decode_references(text: &str) -> String {
	let mut decoded = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(start) = rest.find('&') {
		decoded.push_str(&rest[..start]);
		rest = &rest[start..];
		let replacement = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
			let c = match &rest[1..end] {
				"amp" => Some('&'),
				"lt" => Some('<'),
				"gt" => Some('>'),
				"quot" => Some('"'),
				"apos" => Some('\''),
				"nbsp" => Some('\u{a0}'),
				numeric => numeric.strip_prefix('#').and_then(|number| {
					match number.strip_prefix(|c: char| c == 'x' || c == 'X') {
						Some(hex) => u32::from_str_radix(hex, 16).ok(),
						None => number.parse().ok(),
					}
					.and_then(char::from_u32)
				}),
			}?;
			Some((c, end))
		});
		match replacement {
			Some((c, end)) => {
				decoded.push(c);
				rest = &rest[end + 1..];
			}
			None => {
				decoded.push('&');
				rest = &rest[1..];
			}
		}
	}
	decoded.push_str(rest);
	decoded
}
