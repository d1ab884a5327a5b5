//! Incrementing sequence generator.

use std::cell::Cell;
use std::fmt;

use crate::value::Value;

/// Formatting applied to the counter on each invocation.
enum SequenceFormat {
	/// Calls a user function with the counter value.
	Callback(Box<dyn Fn(u64) -> Value>),
	/// Replaces every `%d` in the pattern with the counter value.
	Template(String),
	/// Appends the counter value to the pattern.
	Suffix(String),
}

/// Generates a value from an incrementing counter.
///
/// Typically used for unique names such as usernames. Each declared field
/// gets its own `Sequence` with its own counter; the counter advances on
/// every invocation and is never reset, so its state lives as long as the
/// definition does.
///
/// A pattern containing `%d` has every occurrence replaced with the counter
/// value; a pattern without `%d` simply has the counter value appended.
///
/// # Example
///
/// ```
/// use entity_fixtures::Sequence;
/// use entity_fixtures::Value;
///
/// let seq = Sequence::new("user_%d", 1);
/// assert_eq!(seq.next_value(), Value::Str("user_1".to_string()));
/// assert_eq!(seq.next_value(), Value::Str("user_2".to_string()));
/// ```
pub struct Sequence {
	next: Cell<u64>,
	format: SequenceFormat,
}

impl Sequence {
	/// Creates a sequence formatting the counter through a string pattern.
	///
	/// `first` is the counter value of the first invocation.
	pub fn new(pattern: impl Into<String>, first: u64) -> Self {
		let pattern = pattern.into();
		let format = if pattern.contains("%d") {
			SequenceFormat::Template(pattern)
		} else {
			SequenceFormat::Suffix(pattern)
		};
		Self {
			next: Cell::new(first),
			format,
		}
	}

	/// Creates a sequence that passes the counter to a user function.
	pub fn with_fn(f: impl Fn(u64) -> Value + 'static, first: u64) -> Self {
		Self {
			next: Cell::new(first),
			format: SequenceFormat::Callback(Box::new(f)),
		}
	}

	/// Produces the next value and advances the counter.
	pub fn next_value(&self) -> Value {
		let n = self.next.get();
		self.next.set(n + 1);
		match &self.format {
			SequenceFormat::Callback(f) => f(n),
			SequenceFormat::Template(pattern) => Value::Str(pattern.replace("%d", &n.to_string())),
			SequenceFormat::Suffix(pattern) => Value::Str(format!("{pattern}{n}")),
		}
	}
}

impl fmt::Debug for Sequence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mode = match &self.format {
			SequenceFormat::Callback(_) => "callback",
			SequenceFormat::Template(_) => "template",
			SequenceFormat::Suffix(_) => "suffix",
		};
		f.debug_struct("Sequence")
			.field("next", &self.next.get())
			.field("format", &mode)
			.finish()
	}
}
