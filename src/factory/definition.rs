//! Fixture definitions and the definition builder.
//!
//! A definition starts life as a mutable [`EntityDefBuilder`] and becomes an
//! immutable [`EntityDef`] through the builder's one-way
//! [`finish()`](EntityDefBuilder::finish). Once registered, a definition never
//! changes; only the counters inside its sequence generators advance.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{FixtureError, FixtureResult};
use crate::factory::engine::FixtureFactory;
use crate::factory::field::FieldDef;
use crate::orm::{EntityMetadata, OrmBackend};
use crate::value::{Instance, Value};

/// Hook invoked after an instance is constructed and all fields are applied.
///
/// Receives the instance and the full map of resolved field values. The hook
/// may mutate the instance through its backend; its return value is ignored.
pub type AfterCreateHook = Box<dyn Fn(&Instance, &IndexMap<String, Value>)>;

/// Non-field configuration accepted when defining a fixture.
#[derive(Default)]
pub struct DefineOptions {
	/// Entity type to instantiate, when the fixture name is not itself the
	/// name of an entity type.
	pub entity_type: Option<String>,
	/// Post-construction hook.
	pub after_create: Option<AfterCreateHook>,
}

impl DefineOptions {
	/// Empty options: the fixture name doubles as the entity-type name and
	/// there is no post-construction hook.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the entity type to instantiate.
	pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
		self.entity_type = Some(entity_type.into());
		self
	}

	/// Sets the post-construction hook.
	pub fn after_create(mut self, hook: impl Fn(&Instance, &IndexMap<String, Value>) + 'static) -> Self {
		self.after_create = Some(Box::new(hook));
		self
	}
}

/// A finalized fixture definition.
///
/// Holds the resolved entity metadata and one generator per field of the
/// entity type: the declared generators in declaration order, followed by a
/// null generator for every remaining field.
pub struct EntityDef {
	name: String,
	metadata: Rc<dyn EntityMetadata>,
	field_defs: IndexMap<String, FieldDef>,
	after_create: Option<AfterCreateHook>,
}

impl EntityDef {
	/// Validates and finalizes a definition against backend metadata.
	///
	/// Fails if the entity type is unknown to the backend or if a declared
	/// field does not exist on the type. Succeeding means every field of the
	/// type has exactly one generator.
	pub(crate) fn build(
		backend: &Rc<dyn OrmBackend>,
		name: String,
		entity_type: String,
		fields: IndexMap<String, FieldDef>,
		after_create: Option<AfterCreateHook>,
	) -> FixtureResult<Self> {
		let metadata = backend.metadata_for(&entity_type)?;

		let mut field_defs = IndexMap::with_capacity(metadata.field_names().len());
		for (field, def) in fields {
			if !metadata.has_field(&field) {
				return Err(FixtureError::UnknownField {
					entity_type: entity_type.clone(),
					field,
				});
			}
			field_defs.insert(field, def);
		}
		for field in metadata.field_names() {
			if !field_defs.contains_key(&field) {
				field_defs.insert(field, FieldDef::Constant(Value::Null));
			}
		}

		Ok(Self {
			name,
			metadata,
			field_defs,
			after_create,
		})
	}

	/// The fixture name this definition is registered under.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The entity-type name the definition instantiates.
	pub fn entity_type(&self) -> &str {
		self.metadata.entity_type()
	}

	/// Backend metadata for the entity type.
	pub fn metadata(&self) -> &Rc<dyn EntityMetadata> {
		&self.metadata
	}

	/// The per-field generators, declared fields first, in declaration order.
	pub fn field_defs(&self) -> &IndexMap<String, FieldDef> {
		&self.field_defs
	}

	/// The post-construction hook, if any.
	pub(crate) fn after_create(&self) -> Option<&AfterCreateHook> {
		self.after_create.as_ref()
	}
}

/// Fluent builder returned by [`FixtureFactory::define`].
///
/// Collects field generators and options, then validates and registers the
/// definition on [`finish()`](Self::finish). Dropping the builder without
/// calling `finish()` registers nothing.
///
/// # Example
///
/// ```ignore
/// factory
///     .define("SpaceShip")?
///     .sequence("name", "Ship %d")
///     .reference_many("crew", "Person", "space_ship", 3)
///     .finish()?;
/// ```
#[must_use = "a definition is only registered by calling finish()"]
pub struct EntityDefBuilder<'a> {
	factory: &'a mut FixtureFactory,
	name: String,
	fields: IndexMap<String, FieldDef>,
	options: DefineOptions,
}

impl<'a> EntityDefBuilder<'a> {
	pub(crate) fn new(factory: &'a mut FixtureFactory, name: String) -> Self {
		Self {
			factory,
			name,
			fields: IndexMap::new(),
			options: DefineOptions::new(),
		}
	}

	/// Specifies the entity type, for fixtures whose name is not the name of
	/// an entity type.
	pub fn from_entity(mut self, entity_type: impl Into<String>) -> Self {
		self.options.entity_type = Some(entity_type.into());
		self
	}

	/// Defines a field as a constant value.
	pub fn field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.field_def(name, FieldDef::Constant(value.into()))
	}

	/// Defines a field with an explicit generator.
	pub fn field_def(mut self, name: impl Into<String>, def: FieldDef) -> Self {
		self.fields.insert(name.into(), def);
		self
	}

	/// Defines a field as a string sequence starting at 1.
	///
	/// See [`Sequence::new`](crate::Sequence::new) for the pattern rules.
	pub fn sequence(self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
		self.field_def(name, FieldDef::sequence(pattern))
	}

	/// Defines a field as a string sequence starting at `first`.
	pub fn sequence_from(
		self,
		name: impl Into<String>,
		pattern: impl Into<String>,
		first: u64,
	) -> Self {
		self.field_def(name, FieldDef::sequence_from(pattern, first))
	}

	/// Defines a field as a sequence computed by a user function.
	pub fn sequence_fn(
		self,
		name: impl Into<String>,
		f: impl Fn(u64) -> Value + 'static,
	) -> Self {
		self.field_def(name, FieldDef::sequence_fn(f))
	}

	/// Defines a field filled by `get()`ing another fixture.
	pub fn reference(self, name: impl Into<String>, fixture: impl Into<String>) -> Self {
		self.field_def(name, FieldDef::reference(fixture))
	}

	/// Defines a collection field filled with `count` instances of another
	/// fixture, each back-linked through `inverse_field`.
	pub fn reference_many(
		self,
		name: impl Into<String>,
		fixture: impl Into<String>,
		inverse_field: impl Into<String>,
		count: usize,
	) -> Self {
		self.field_def(name, FieldDef::reference_many(fixture, inverse_field, count))
	}

	/// Sets a hook invoked after construction with the instance and the full
	/// map of resolved field values.
	pub fn after_create(
		mut self,
		hook: impl Fn(&Instance, &IndexMap<String, Value>) + 'static,
	) -> Self {
		self.options.after_create = Some(Box::new(hook));
		self
	}

	/// Validates the definition and registers it with the factory.
	///
	/// This is the one-way transition from building to finalized: afterwards
	/// the definition is immutable and `get(name)` can use it.
	pub fn finish(self) -> FixtureResult<()> {
		self.factory.define_entity(self.name, self.fields, self.options)
	}
}
