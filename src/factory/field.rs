//! Field generators.
//!
//! Every field of a defined fixture resolves through exactly one [`FieldDef`].
//! Generators are invoked once per instantiation, in declaration order, unless
//! the caller overrides the field for that call.

use std::fmt;

use crate::error::FixtureResult;
use crate::factory::engine::{FixtureFactory, Overrides};
use crate::factory::sequence::Sequence;
use crate::value::Value;

/// A user-supplied generator function.
///
/// Receives the factory so it can recurse into other fixtures.
pub type GeneratorFn = Box<dyn Fn(&FixtureFactory) -> FixtureResult<Value>>;

/// How a single field obtains its value during instantiation.
pub enum FieldDef {
	/// A fixed value, cloned on every instantiation.
	Constant(Value),
	/// A value formatted from an incrementing counter.
	Sequence(Sequence),
	/// `get()`s the named fixture from the factory.
	///
	/// The usual `get()` semantics apply: normally a fresh instance per
	/// instantiation, or the singleton if one is set for the name.
	Reference(String),
	/// `get()`s the named fixture `count` times, yielding a list.
	///
	/// Each instantiation overrides `inverse_field` on the child with an
	/// empty list, so the back-link is established solely by the
	/// inverse-association synchronizer. Does not combine well with
	/// singletons, which would return the same child every time.
	ReferenceMany {
		/// The fixture name to get.
		fixture: String,
		/// The child's field pointing back at the entity under construction.
		inverse_field: String,
		/// How many children to create.
		count: usize,
	},
	/// A user function computing the value.
	Generated(GeneratorFn),
}

impl FieldDef {
	/// A constant field value.
	pub fn constant(value: impl Into<Value>) -> Self {
		FieldDef::Constant(value.into())
	}

	/// A string sequence starting at 1. See [`Sequence::new`] for the
	/// pattern rules.
	pub fn sequence(pattern: impl Into<String>) -> Self {
		FieldDef::Sequence(Sequence::new(pattern, 1))
	}

	/// A string sequence starting at `first`.
	pub fn sequence_from(pattern: impl Into<String>, first: u64) -> Self {
		FieldDef::Sequence(Sequence::new(pattern, first))
	}

	/// A sequence passing the counter to a user function.
	pub fn sequence_fn(f: impl Fn(u64) -> Value + 'static) -> Self {
		FieldDef::Sequence(Sequence::with_fn(f, 1))
	}

	/// A reference to another fixture by name.
	pub fn reference(fixture: impl Into<String>) -> Self {
		FieldDef::Reference(fixture.into())
	}

	/// A list of `count` instances of another fixture, each back-linked
	/// through `inverse_field`.
	pub fn reference_many(
		fixture: impl Into<String>,
		inverse_field: impl Into<String>,
		count: usize,
	) -> Self {
		FieldDef::ReferenceMany {
			fixture: fixture.into(),
			inverse_field: inverse_field.into(),
			count,
		}
	}

	/// A field computed by a user function.
	pub fn generated(f: impl Fn(&FixtureFactory) -> FixtureResult<Value> + 'static) -> Self {
		FieldDef::Generated(Box::new(f))
	}

	/// Produces the field's value for one instantiation.
	pub(crate) fn resolve(&self, factory: &FixtureFactory) -> FixtureResult<Value> {
		match self {
			FieldDef::Constant(value) => Ok(value.clone()),
			FieldDef::Sequence(sequence) => Ok(sequence.next_value()),
			FieldDef::Reference(fixture) => Ok(Value::Entity(factory.get(fixture)?)),
			FieldDef::ReferenceMany {
				fixture,
				inverse_field,
				count,
			} => {
				let mut items = Vec::with_capacity(*count);
				for _ in 0..*count {
					let overrides =
						Overrides::new().with(inverse_field.clone(), Value::List(Vec::new()));
					items.push(Value::Entity(factory.get_with(fixture, overrides)?));
				}
				Ok(Value::List(items))
			}
			FieldDef::Generated(f) => f(factory),
		}
	}
}

impl fmt::Debug for FieldDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldDef::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
			FieldDef::Sequence(sequence) => f.debug_tuple("Sequence").field(sequence).finish(),
			FieldDef::Reference(fixture) => f.debug_tuple("Reference").field(fixture).finish(),
			FieldDef::ReferenceMany {
				fixture,
				inverse_field,
				count,
			} => f
				.debug_struct("ReferenceMany")
				.field("fixture", fixture)
				.field("inverse_field", inverse_field)
				.field("count", count)
				.finish(),
			FieldDef::Generated(_) => f.write_str("Generated(..)"),
		}
	}
}
