use core::fmt::{self, Display, Formatter};

/// Failures reported to the composing code.
///
/// Conditions that are expected during normal operation (a missing mount point, removing something that is already
/// gone, absent configuration) are not errors and only show up in the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// A lifecycle operation other than `init` was requested on a view that isn't mounted.
	NotMounted { key: String },
	/// There is no live element with this key.
	MissingElement { key: String },
	/// The selector could not be parsed or uses syntax that isn't supported.
	InvalidSelector { selector: String, reason: &'static str },
	/// More than [`u16::MAX`] delegation rules were registered for one event type.
	ListenerCountSaturated { event_type: String },
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Error::NotMounted { key } => write!(f, "view {:?} is not mounted", key),
			Error::MissingElement { key } => write!(f, "no element with key {:?} is mounted", key),
			Error::InvalidSelector { selector, reason } => write!(f, "invalid selector {:?}: {}", selector, reason),
			Error::ListenerCountSaturated { event_type } => {
				write!(f, "too many (more than 65k) delegation rules for event type {:?}", event_type)
			}
		}
	}
}

impl std::error::Error for Error {}
