//! The instantiation engine.
//!
//! [`FixtureFactory`] owns the definition registry and the singleton table,
//! resolves field generators into concrete values, writes them onto bare
//! instances through the backend's metadata, and keeps both sides of
//! bidirectional associations in sync.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::{FixtureError, FixtureResult};
use crate::factory::definition::{DefineOptions, EntityDef, EntityDefBuilder};
use crate::factory::field::FieldDef;
use crate::factory::registry::DefinitionRegistry;
use crate::orm::{EntityMetadata, OrmBackend};
use crate::value::{Instance, Value};

/// Per-call field overrides for [`FixtureFactory::get_with`].
///
/// An override bypasses the field's generator entirely for that single call;
/// the generator is not invoked and sequence counters do not advance for the
/// overridden field.
///
/// # Example
///
/// ```ignore
/// let ship = factory.get_with(
///     "SpaceShip",
///     Overrides::new().with("name", "My CattleBruiser"),
/// )?;
/// ```
#[derive(Debug, Default)]
pub struct Overrides {
	values: IndexMap<String, Value>,
}

impl Overrides {
	/// No overrides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an override, consuming and returning the set.
	pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values.insert(field.into(), value.into());
		self
	}

	/// Adds an override in place.
	pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
		self.values.insert(field.into(), value.into());
	}

	/// The number of overridden fields.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns true if no fields are overridden.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	fn into_map(self) -> IndexMap<String, Value> {
		self.values
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Overrides {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			values: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

/// Creates entity instances for use in tests.
///
/// A factory wraps a persistence backend, a registry of fixture definitions
/// and a table of singletons. Definitions are added through
/// [`define`](Self::define) (fluent builder) or
/// [`define_entity`](Self::define_entity) (direct form); instances are
/// requested through [`get`](Self::get) and its variants.
///
/// The factory is single-threaded: generator invocations are plain
/// synchronous calls, and reference generators recurse through the factory to
/// build dependencies on the fly.
pub struct FixtureFactory {
	backend: Rc<dyn OrmBackend>,
	registry: DefinitionRegistry,
	singletons: HashMap<String, Instance>,
	persist_on_get: bool,
	entity_namespace: String,
}

impl FixtureFactory {
	/// Creates a factory over the given persistence backend.
	///
	/// Persist-on-get starts disabled and the entity namespace empty.
	pub fn new(backend: Rc<dyn OrmBackend>) -> Self {
		Self {
			backend,
			registry: DefinitionRegistry::new(),
			singletons: HashMap::new(),
			persist_on_get: false,
			entity_namespace: String::new(),
		}
	}

	/// The persistence backend this factory drives.
	pub fn backend(&self) -> &Rc<dyn OrmBackend> {
		&self.backend
	}

	/// Sets the namespace prefixed to unqualified entity-type names.
	///
	/// Type names are dotted paths (`auth.User`); a name that already
	/// contains a `.` is taken as fully qualified and used as-is.
	pub fn set_entity_namespace(&mut self, namespace: impl Into<String>) {
		self.entity_namespace = namespace.into().trim_matches('.').to_string();
	}

	/// The current entity namespace, empty if unset.
	pub fn entity_namespace(&self) -> &str {
		&self.entity_namespace
	}

	/// Sets whether `get()` hands each created instance to the backend.
	///
	/// Disabled by default. Flushing or committing is entirely the backend's
	/// business.
	pub fn persist_on_get(&mut self, enabled: bool) {
		self.persist_on_get = enabled;
	}

	/// Starts defining how to create a fixture.
	///
	/// Fails immediately if the name is taken. The returned builder registers
	/// the definition on [`finish()`](EntityDefBuilder::finish).
	pub fn define(&mut self, name: impl Into<String>) -> FixtureResult<EntityDefBuilder<'_>> {
		let name = name.into();
		if self.registry.contains(&name) {
			return Err(FixtureError::AlreadyDefined(name));
		}
		Ok(EntityDefBuilder::new(self, name))
	}

	/// Registers a fixture definition directly.
	///
	/// `fields` maps field names to generators in declaration order; every
	/// field of the entity type not named there defaults to a null generator.
	/// Fails if the name is taken, the entity type is unknown to the backend,
	/// or a field does not exist on the type. Nothing is registered on
	/// failure.
	pub fn define_entity(
		&mut self,
		name: impl Into<String>,
		fields: impl IntoIterator<Item = (String, FieldDef)>,
		options: DefineOptions,
	) -> FixtureResult<()> {
		let name = name.into();
		if self.registry.contains(&name) {
			return Err(FixtureError::AlreadyDefined(name));
		}

		let entity_type = self.qualify(options.entity_type.as_deref().unwrap_or(&name));
		let def = EntityDef::build(
			&self.backend,
			name.clone(),
			entity_type,
			fields.into_iter().collect(),
			options.after_create,
		)?;
		debug!(fixture = %name, entity_type = %def.entity_type(), "defined fixture");
		self.registry.insert(def)
	}

	/// Gets an instance of the named fixture and its dependencies.
	///
	/// Whether the instance is new depends on whether a singleton is set for
	/// the name; see [`get_as_singleton`](Self::get_as_singleton). If
	/// [`persist_on_get`](Self::persist_on_get) is enabled the instance is
	/// also handed to the backend.
	pub fn get(&self, name: &str) -> FixtureResult<Instance> {
		self.get_with(name, Overrides::new())
	}

	/// Like [`get`](Self::get), with per-call field overrides.
	pub fn get_with(&self, name: &str, overrides: Overrides) -> FixtureResult<Instance> {
		self.create(name, overrides, self.persist_on_get)
	}

	/// Like [`get`](Self::get), but never persists the created instance.
	///
	/// Only the top-level instance is exempt: referenced fixtures resolved
	/// during construction still follow the persist-on-get setting.
	pub fn get_unpersisted(&self, name: &str) -> FixtureResult<Instance> {
		self.get_unpersisted_with(name, Overrides::new())
	}

	/// Like [`get_unpersisted`](Self::get_unpersisted), with field overrides.
	pub fn get_unpersisted_with(
		&self,
		name: &str,
		overrides: Overrides,
	) -> FixtureResult<Instance> {
		self.create(name, overrides, false)
	}

	/// A shorthand combining [`get`](Self::get) and
	/// [`set_singleton`](Self::set_singleton).
	///
	/// Fails if `name` already has a singleton.
	pub fn get_as_singleton(&mut self, name: &str) -> FixtureResult<Instance> {
		self.get_as_singleton_with(name, Overrides::new())
	}

	/// Like [`get_as_singleton`](Self::get_as_singleton), with field overrides.
	pub fn get_as_singleton_with(
		&mut self,
		name: &str,
		overrides: Overrides,
	) -> FixtureResult<Instance> {
		if self.singletons.contains_key(name) {
			return Err(FixtureError::AlreadySingleton(name.to_string()));
		}
		let instance = self.get_with(name, overrides)?;
		self.singletons.insert(name.to_string(), instance.clone());
		Ok(instance)
	}

	/// Makes `instance` the singleton for `name`.
	///
	/// All subsequent `get(name)` calls return this instance, overrides
	/// ignored, until [`unset_singleton`](Self::unset_singleton).
	pub fn set_singleton(&mut self, name: impl Into<String>, instance: Instance) {
		self.singletons.insert(name.into(), instance);
	}

	/// Removes the singleton for `name`, if any.
	///
	/// `get(name)` returns fresh instances again afterwards.
	pub fn unset_singleton(&mut self, name: &str) {
		self.singletons.remove(name);
	}

	/// The current singleton for `name`, if one is set.
	pub fn singleton(&self, name: &str) -> Option<Instance> {
		self.singletons.get(name).cloned()
	}

	fn qualify(&self, entity_type: &str) -> String {
		if self.entity_namespace.is_empty() || entity_type.contains('.') {
			entity_type.to_string()
		} else {
			format!("{}.{}", self.entity_namespace, entity_type)
		}
	}

	fn create(&self, name: &str, overrides: Overrides, persist: bool) -> FixtureResult<Instance> {
		if let Some(singleton) = self.singletons.get(name) {
			return Ok(singleton.clone());
		}

		let def = self
			.registry
			.get(name)
			.ok_or_else(|| FixtureError::UndefinedFixture(name.to_string()))?;

		let mut overrides = overrides.into_map();
		self.check_overrides(&def, &overrides)?;

		debug!(fixture = %name, entity_type = %def.entity_type(), "creating fixture");
		let instance = def.metadata().new_instance();

		let mut values: IndexMap<String, Value> = IndexMap::with_capacity(def.field_defs().len());
		for (field, field_def) in def.field_defs() {
			let value = match overrides.swap_remove(field) {
				Some(overridden) => overridden,
				None => field_def.resolve(self)?,
			};
			trace!(fixture = %name, field = %field, "resolved field");
			values.insert(field.clone(), value);
		}

		for (field, value) in &values {
			self.apply_field(&instance, def.metadata(), field, value)?;
		}

		if let Some(hook) = def.after_create() {
			hook(&instance, &values);
		}

		if persist {
			trace!(fixture = %name, "persisting instance");
			self.backend.persist(&instance)?;
		}

		Ok(instance)
	}

	fn check_overrides(
		&self,
		def: &EntityDef,
		overrides: &IndexMap<String, Value>,
	) -> FixtureResult<()> {
		let unknown: Vec<String> = overrides
			.keys()
			.filter(|key| !def.field_defs().contains_key(*key))
			.cloned()
			.collect();
		if !unknown.is_empty() {
			return Err(FixtureError::UnknownOverrides {
				entity_type: def.entity_type().to_string(),
				fields: unknown,
			});
		}
		Ok(())
	}

	fn apply_field(
		&self,
		instance: &Instance,
		metadata: &Rc<dyn EntityMetadata>,
		field: &str,
		value: &Value,
	) -> FixtureResult<()> {
		if metadata.is_collection_association(field) {
			// Leave already-initialized collections alone.
			if !metadata.get_field(instance, field)?.is_null() {
				return Ok(());
			}
			let mut items = Vec::new();
			match value {
				Value::Null => {}
				Value::List(supplied) => {
					for item in supplied {
						items.push(item.clone());
						if let Value::Entity(other) = item {
							self.update_inverse_side(instance, metadata, field, other)?;
						}
					}
				}
				_ => {
					return Err(FixtureError::CollectionExpected {
						entity_type: metadata.entity_type().to_string(),
						field: field.to_string(),
					});
				}
			}
			metadata.set_field(instance, field, Value::List(items))
		} else {
			metadata.set_field(instance, field, value.clone())?;
			if let Value::Entity(other) = value
				&& metadata.is_single_valued_association(field)
			{
				self.update_inverse_side(instance, metadata, field, other)?;
			}
			Ok(())
		}
	}

	/// Updates the inverse side after `instance` was linked to `other`
	/// through `field`.
	///
	/// No-op for unidirectional associations. A collection-valued inverse is
	/// initialized or appended to; a single-valued inverse is overwritten.
	/// An inverse collection field holding a non-collection value is an
	/// error, not something to silently paper over.
	fn update_inverse_side(
		&self,
		instance: &Instance,
		metadata: &Rc<dyn EntityMetadata>,
		field: &str,
		other: &Instance,
	) -> FixtureResult<()> {
		let Some(inverse) = metadata.association_inverse(field)? else {
			return Ok(());
		};

		let other_metadata = self.backend.metadata_for(other.entity_type())?;
		let existing = other_metadata.get_field(other, &inverse)?;
		if other_metadata.is_collection_association(&inverse) {
			match existing {
				Value::Null => other_metadata.set_field(
					other,
					&inverse,
					Value::List(vec![Value::Entity(instance.clone())]),
				),
				Value::List(mut items) => {
					items.push(Value::Entity(instance.clone()));
					other_metadata.set_field(other, &inverse, Value::List(items))
				}
				_ => Err(FixtureError::CollectionExpected {
					entity_type: other_metadata.entity_type().to_string(),
					field: inverse,
				}),
			}
		} else {
			other_metadata.set_field(other, &inverse, Value::Entity(instance.clone()))
		}
	}
}
