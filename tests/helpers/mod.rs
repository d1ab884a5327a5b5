//! In-memory persistence backend for the behavioral tests.
//!
//! Implements the [`OrmBackend`]/[`EntityMetadata`] contract over plain
//! field maps, with an explicitly constructed database per test (no shared
//! globals). The standard schema mirrors a small fleet domain: space ships
//! with a crew, people with a ship and visited ships, and badges with an
//! owner.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use entity_fixtures::prelude::*;

/// Field classification within a schema.
#[derive(Clone, Copy, PartialEq)]
pub enum FieldKind {
	Scalar,
	SingleAssociation,
	CollectionAssociation,
}

struct FieldSpec {
	name: String,
	kind: FieldKind,
	inverse: Option<String>,
}

/// Schema for one entity type: ordered fields with association metadata.
pub struct EntitySchema {
	entity_type: String,
	fields: Vec<FieldSpec>,
}

impl EntitySchema {
	pub fn new(entity_type: &str) -> Self {
		Self {
			entity_type: entity_type.to_string(),
			fields: Vec::new(),
		}
	}

	pub fn scalar(mut self, name: &str) -> Self {
		self.fields.push(FieldSpec {
			name: name.to_string(),
			kind: FieldKind::Scalar,
			inverse: None,
		});
		self
	}

	pub fn single(mut self, name: &str, inverse: Option<&str>) -> Self {
		self.fields.push(FieldSpec {
			name: name.to_string(),
			kind: FieldKind::SingleAssociation,
			inverse: inverse.map(str::to_string),
		});
		self
	}

	pub fn collection(mut self, name: &str, inverse: Option<&str>) -> Self {
		self.fields.push(FieldSpec {
			name: name.to_string(),
			kind: FieldKind::CollectionAssociation,
			inverse: inverse.map(str::to_string),
		});
		self
	}

	fn field(&self, name: &str) -> Option<&FieldSpec> {
		self.fields.iter().find(|f| f.name == name)
	}
}

type FieldMap = RefCell<HashMap<String, Value>>;

/// In-memory ORM backend: a schema registry plus a persisted-instance log.
///
/// `persist` assigns an incrementing `id` (when the schema has an `id`
/// field) and records the instance, so tests can assert on what reached the
/// database.
pub struct MemoryDb {
	schemas: RefCell<HashMap<String, Rc<EntitySchema>>>,
	persisted: RefCell<Vec<Instance>>,
	next_id: Cell<i64>,
}

impl MemoryDb {
	pub fn new() -> Rc<Self> {
		Rc::new(Self {
			schemas: RefCell::new(HashMap::new()),
			persisted: RefCell::new(Vec::new()),
			next_id: Cell::new(1),
		})
	}

	pub fn register(&self, schema: EntitySchema) {
		self.schemas
			.borrow_mut()
			.insert(schema.entity_type.clone(), Rc::new(schema));
	}

	pub fn persisted(&self) -> Vec<Instance> {
		self.persisted.borrow().clone()
	}

	pub fn persisted_count(&self) -> usize {
		self.persisted.borrow().len()
	}

	pub fn find(&self, entity_type: &str, id: i64) -> Option<Instance> {
		self.persisted
			.borrow()
			.iter()
			.find(|inst| {
				inst.entity_type() == entity_type
					&& field_of(inst, "id") == Value::Int(id)
			})
			.cloned()
	}
}

impl OrmBackend for MemoryDb {
	fn metadata_for(&self, entity_type: &str) -> FixtureResult<Rc<dyn EntityMetadata>> {
		let schema = self
			.schemas
			.borrow()
			.get(entity_type)
			.cloned()
			.ok_or_else(|| FixtureError::UnknownEntityType(entity_type.to_string()))?;
		Ok(Rc::new(SchemaMetadata { schema }))
	}

	fn persist(&self, instance: &Instance) -> FixtureResult<()> {
		let schema = self
			.schemas
			.borrow()
			.get(instance.entity_type())
			.cloned()
			.ok_or_else(|| FixtureError::UnknownEntityType(instance.entity_type().to_string()))?;
		if schema.field("id").is_some() && field_of(instance, "id").is_null() {
			let id = self.next_id.get();
			self.next_id.set(id + 1);
			fields_of(instance).borrow_mut().insert("id".to_string(), Value::Int(id));
		}
		self.persisted.borrow_mut().push(instance.clone());
		Ok(())
	}
}

struct SchemaMetadata {
	schema: Rc<EntitySchema>,
}

impl SchemaMetadata {
	fn spec(&self, name: &str) -> FixtureResult<&FieldSpec> {
		self.schema.field(name).ok_or_else(|| FixtureError::Backend(format!(
			"no field '{}' on {}",
			name, self.schema.entity_type
		)))
	}
}

impl EntityMetadata for SchemaMetadata {
	fn entity_type(&self) -> &str {
		&self.schema.entity_type
	}

	fn field_names(&self) -> Vec<String> {
		self.schema.fields.iter().map(|f| f.name.clone()).collect()
	}

	fn has_field(&self, name: &str) -> bool {
		self.schema.field(name).is_some()
	}

	fn is_collection_association(&self, name: &str) -> bool {
		self.schema
			.field(name)
			.is_some_and(|f| f.kind == FieldKind::CollectionAssociation)
	}

	fn is_single_valued_association(&self, name: &str) -> bool {
		self.schema
			.field(name)
			.is_some_and(|f| f.kind == FieldKind::SingleAssociation)
	}

	fn association_inverse(&self, name: &str) -> FixtureResult<Option<String>> {
		Ok(self.spec(name)?.inverse.clone())
	}

	fn new_instance(&self) -> Instance {
		Instance::new(
			self.schema.entity_type.clone(),
			Rc::new(RefCell::new(HashMap::<String, Value>::new())),
		)
	}

	fn get_field(&self, instance: &Instance, name: &str) -> FixtureResult<Value> {
		self.spec(name)?;
		Ok(fields_of(instance)
			.borrow()
			.get(name)
			.cloned()
			.unwrap_or(Value::Null))
	}

	fn set_field(&self, instance: &Instance, name: &str, value: Value) -> FixtureResult<()> {
		self.spec(name)?;
		fields_of(instance)
			.borrow_mut()
			.insert(name.to_string(), value);
		Ok(())
	}
}

fn fields_of(instance: &Instance) -> &FieldMap {
	instance
		.state::<FieldMap>()
		.expect("instance was not created by MemoryDb")
}

/// Reads a field directly off a MemoryDb instance, bypassing metadata.
pub fn field_of(instance: &Instance, name: &str) -> Value {
	fields_of(instance)
		.borrow()
		.get(name)
		.cloned()
		.unwrap_or(Value::Null)
}

/// Writes a field directly onto a MemoryDb instance, bypassing metadata.
pub fn set_field_of(instance: &Instance, name: &str, value: Value) {
	fields_of(instance)
		.borrow_mut()
		.insert(name.to_string(), value);
}

/// Returns true if `value` is a list containing `instance` (by identity).
pub fn contains_entity(value: &Value, instance: &Instance) -> bool {
	value
		.as_list()
		.is_some_and(|items| items.contains(&Value::Entity(instance.clone())))
}

/// The standard fleet schema used across the behavioral tests.
///
/// - `SpaceShip`: id, name, crew (one-to-many of Person.space_ship),
///   past_visitors (many-to-many with Person.ships_visited)
/// - `Person`: id, name, space_ship (many-to-one), ships_visited
/// - `Badge`: id, owner (unidirectional many-to-one)
pub fn fleet_db() -> Rc<MemoryDb> {
	let db = MemoryDb::new();
	db.register(
		EntitySchema::new("SpaceShip")
			.scalar("id")
			.scalar("name")
			.collection("crew", Some("space_ship"))
			.collection("past_visitors", Some("ships_visited")),
	);
	db.register(
		EntitySchema::new("Person")
			.scalar("id")
			.scalar("name")
			.single("space_ship", Some("crew"))
			.collection("ships_visited", Some("past_visitors")),
	);
	db.register(
		EntitySchema::new("Badge")
			.scalar("id")
			.single("owner", None),
	);
	db
}

/// A factory over a fresh fleet database.
pub fn fleet_factory() -> (FixtureFactory, Rc<MemoryDb>) {
	let db = fleet_db();
	let factory = FixtureFactory::new(db.clone());
	(factory, db)
}
