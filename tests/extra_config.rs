//! After-create hooks, entity-type overrides and namespaces.

mod helpers;

use std::rc::Rc;

use entity_fixtures::prelude::*;
use helpers::{EntitySchema, MemoryDb, field_of, fleet_factory, set_field_of};
use rstest::rstest;

#[rstest]
fn after_create_hook_runs_with_the_resolved_field_values() {
	let (mut factory, _db) = fleet_factory();
	factory
		.define("SpaceShip")
		.unwrap()
		.field("name", "Foo")
		.after_create(|ship, values| {
			let base = field_of(ship, "name").as_str().unwrap().to_string();
			let resolved = values["name"].as_str().unwrap();
			set_field_of(ship, "name", Value::Str(format!("{base}-{resolved}")));
		})
		.finish()
		.unwrap();

	let ship = factory.get("SpaceShip").unwrap();

	assert_eq!(field_of(&ship, "name"), Value::Str("Foo-Foo".to_string()));
}

#[rstest]
fn after_create_sees_overridden_values() {
	let (mut factory, _db) = fleet_factory();
	factory
		.define("SpaceShip")
		.unwrap()
		.field("name", "Foo")
		.after_create(|ship, values| {
			let resolved = values["name"].as_str().unwrap();
			set_field_of(ship, "name", Value::Str(format!("{resolved}Master")));
		})
		.finish()
		.unwrap();

	let ship = factory
		.get_with("SpaceShip", Overrides::new().with("name", "Xoo"))
		.unwrap();

	assert_eq!(field_of(&ship, "name"), Value::Str("XooMaster".to_string()));
}

#[rstest]
fn define_entity_accepts_options_directly() {
	let (mut factory, _db) = fleet_factory();
	factory
		.define_entity(
			"Captain",
			vec![("name".to_string(), FieldDef::constant("TheCaptain"))],
			DefineOptions::new().entity_type("Person"),
		)
		.unwrap();

	let captain = factory.get("Captain").unwrap();

	assert_eq!(captain.entity_type(), "Person");
	assert_eq!(field_of(&captain, "name"), Value::Str("TheCaptain".to_string()));
}

#[rstest]
fn the_same_entity_type_can_back_two_fixture_names() {
	let (mut factory, _db) = fleet_factory();
	factory
		.define("Captain")
		.unwrap()
		.from_entity("Person")
		.field("name", "TheCaptain")
		.finish()
		.unwrap();
	factory
		.define("Sailor")
		.unwrap()
		.from_entity("Person")
		.sequence("name", "Sailor #%d")
		.finish()
		.unwrap();

	let s1 = factory.get("Sailor").unwrap();
	let s2 = factory.get("Sailor").unwrap();
	let captain = factory.get("Captain").unwrap();

	assert_eq!(field_of(&captain, "name"), Value::Str("TheCaptain".to_string()));
	assert_eq!(field_of(&s1, "name"), Value::Str("Sailor #1".to_string()));
	assert_eq!(field_of(&s2, "name"), Value::Str("Sailor #2".to_string()));
}

fn namespaced_db() -> Rc<MemoryDb> {
	let db = MemoryDb::new();
	db.register(
		EntitySchema::new("fleet.Person")
			.scalar("id")
			.scalar("name"),
	);
	db
}

#[rstest]
fn unqualified_type_names_get_the_namespace_prefix() {
	let mut factory = FixtureFactory::new(namespaced_db());
	factory.set_entity_namespace("fleet");

	factory
		.define("Person")
		.unwrap()
		.field("name", "Uhura")
		.finish()
		.unwrap();

	let person = factory.get("Person").unwrap();
	assert_eq!(person.entity_type(), "fleet.Person");
}

#[rstest]
fn qualified_type_names_bypass_the_namespace() {
	let mut factory = FixtureFactory::new(namespaced_db());
	factory.set_entity_namespace("somewhere.else");

	factory
		.define("Captain")
		.unwrap()
		.from_entity("fleet.Person")
		.field("name", "TheCaptain")
		.finish()
		.unwrap();

	let captain = factory.get("Captain").unwrap();
	assert_eq!(captain.entity_type(), "fleet.Person");
}

#[rstest]
fn without_a_namespace_names_resolve_as_is() {
	let (mut factory, _db) = fleet_factory();
	assert_eq!(factory.entity_namespace(), "");

	factory.define("SpaceShip").unwrap().finish().unwrap();
	let ship = factory.get("SpaceShip").unwrap();
	assert_eq!(ship.entity_type(), "SpaceShip");
}
