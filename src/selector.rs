//! Delegation selectors.
//!
//! Only the structural subset needed for delegation is supported: type, `#id`, `.class`, `[attribute]` and
//! `[attribute=value]` in compounds, joined by descendant (whitespace) or child (`>`) combinators, in comma-separated
//! lists. Pseudo-classes and sibling combinators are rejected at parse time, so a selector that is accepted here is
//! matched the same way by [`MemoryDom`](`crate::MemoryDom`) and a browser.

use crate::{Dom, Error};
use core::{iter::Peekable, str::Chars, str::FromStr};

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
	source: String,
	alternatives: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
	compounds: Vec<Compound>,
	/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
	combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
	Descendant,
	Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
	tag: Option<String>,
	id: Option<String>,
	classes: Vec<String>,
	attributes: Vec<(String, Option<String>)>,
}

impl Selector {
	pub fn parse(source: &str) -> Result<Self, Error> {
		let invalid = |reason| Error::InvalidSelector {
			selector: source.to_owned(),
			reason,
		};

		let mut alternatives = Vec::new();
		for alternative in source.split(',') {
			alternatives.push(parse_complex(alternative.trim()).map_err(invalid)?);
		}
		Ok(Self {
			source: source.trim().to_owned(),
			alternatives,
		})
	}

	/// The selector as written (trimmed), suitable for native `Element.matches`.
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.source
	}

	/// Tests `element` against this selector using only the structural [`Dom`] accessors.
	pub fn matches<D: Dom>(&self, dom: &D, element: &D::Element) -> bool {
		self.alternatives.iter().any(|complex| complex.matches_at(dom, complex.compounds.len() - 1, element))
	}
}

impl FromStr for Selector {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl Complex {
	fn matches_at<D: Dom>(&self, dom: &D, i: usize, element: &D::Element) -> bool {
		if !self.compounds[i].matches(dom, element) {
			return false;
		}
		if i == 0 {
			return true;
		}
		match self.combinators[i - 1] {
			Combinator::Child => dom.parent_element(element).map_or(false, |parent| self.matches_at(dom, i - 1, &parent)),
			Combinator::Descendant => {
				let mut ancestor = dom.parent_element(element);
				while let Some(current) = ancestor {
					if self.matches_at(dom, i - 1, &current) {
						return true;
					}
					ancestor = dom.parent_element(&current);
				}
				false
			}
		}
	}
}

impl Compound {
	fn is_empty(&self) -> bool {
		self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
	}

	fn matches<D: Dom>(&self, dom: &D, element: &D::Element) -> bool {
		if let Some(tag) = &self.tag {
			if tag != "*" && !dom.tag_name(element).eq_ignore_ascii_case(tag) {
				return false;
			}
		}
		if let Some(id) = &self.id {
			if dom.attribute(element, "id").as_deref() != Some(id.as_str()) {
				return false;
			}
		}
		if !self.classes.is_empty() {
			let class = dom.attribute(element, "class").unwrap_or_default();
			if !self.classes.iter().all(|wanted| class.split_ascii_whitespace().any(|present| present == wanted)) {
				return false;
			}
		}
		self.attributes.iter().all(|(name, expected)| match (dom.attribute(element, name), expected) {
			(None, _) => false,
			(Some(_), None) => true,
			(Some(value), Some(expected)) => &value == expected,
		})
	}
}

fn parse_complex(source: &str) -> Result<Complex, &'static str> {
	if source.is_empty() {
		return Err("empty selector");
	}

	let mut chars = source.chars().peekable();
	let mut complex = Complex {
		compounds: Vec::new(),
		combinators: Vec::new(),
	};
	loop {
		let compound = parse_compound(&mut chars)?;
		if compound.is_empty() {
			return Err("expected a type, id, class or attribute selector");
		}
		complex.compounds.push(compound);

		let mut combinator = None;
		while let Some(&c) = chars.peek() {
			match c {
				c if c.is_whitespace() => {
					combinator.get_or_insert(Combinator::Descendant);
				}
				'>' => {
					if combinator == Some(Combinator::Child) {
						return Err("repeated `>`");
					}
					combinator = Some(Combinator::Child);
				}
				'+' | '~' => return Err("sibling combinators are not supported"),
				_ => break,
			}
			chars.next();
		}
		match (combinator, chars.peek()) {
			(_, None) if combinator != Some(Combinator::Child) => return Ok(complex),
			(Some(combinator), Some(_)) => complex.combinators.push(combinator),
			_ => return Err("dangling combinator"),
		}
	}
}

fn parse_compound(chars: &mut Peekable<Chars<'_>>) -> Result<Compound, &'static str> {
	let mut compound = Compound::default();
	if chars.peek() == Some(&'*') {
		chars.next();
		compound.tag = Some("*".to_owned());
	} else if chars.peek().map_or(false, |&c| is_identifier_char(c)) {
		compound.tag = Some(parse_identifier(chars)?.to_ascii_lowercase());
	}

	while let Some(&c) = chars.peek() {
		match c {
			'#' => {
				chars.next();
				if compound.id.replace(parse_identifier(chars)?).is_some() {
					return Err("more than one id in compound selector");
				}
			}
			'.' => {
				chars.next();
				compound.classes.push(parse_identifier(chars)?);
			}
			'[' => {
				chars.next();
				compound.attributes.push(parse_attribute(chars)?);
			}
			':' => return Err("pseudo-classes are not supported"),
			_ => break,
		}
	}
	Ok(compound)
}

fn parse_attribute(chars: &mut Peekable<Chars<'_>>) -> Result<(String, Option<String>), &'static str> {
	skip_whitespace(chars);
	let name = parse_identifier(chars)?.to_ascii_lowercase();
	skip_whitespace(chars);
	let value = match chars.next() {
		Some(']') => return Ok((name, None)),
		Some('=') => {
			skip_whitespace(chars);
			match chars.peek() {
				Some(&quote) if quote == '"' || quote == '\'' => {
					chars.next();
					let mut value = String::new();
					loop {
						match chars.next() {
							Some(c) if c == quote => break value,
							Some(c) => value.push(c),
							None => return Err("unterminated string"),
						}
					}
				}
				_ => parse_identifier(chars)?,
			}
		}
		Some(_) => return Err("unsupported attribute operator"),
		None => return Err("unterminated attribute selector"),
	};
	skip_whitespace(chars);
	match chars.next() {
		Some(']') => Ok((name, Some(value))),
		_ => Err("expected `]`"),
	}
}

fn parse_identifier(chars: &mut Peekable<Chars<'_>>) -> Result<String, &'static str> {
	let mut identifier = String::new();
	while let Some(&c) = chars.peek() {
		if !is_identifier_char(c) {
			break;
		}
		identifier.push(c);
		chars.next();
	}
	if identifier.is_empty() {
		Err("expected an identifier")
	} else {
		Ok(identifier)
	}
}

fn is_identifier_char(c: char) -> bool {
	c.is_alphanumeric() || c == '-' || c == '_'
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
	while chars.peek().map_or(false, |c| c.is_whitespace()) {
		chars.next();
	}
}
