//! Test fixture factory for ORM entities.
//!
//! This crate lets test authors declare, once, how to construct a default
//! instance of each entity type (constant field values, generated sequences,
//! references to other entities), then repeatedly request fully populated
//! instances with selective field overrides:
//!
//! - **Definitions**: a fluent builder registering one recipe per fixture name
//! - **Generators**: constants, incrementing sequences and recursive references
//! - **Singletons**: pin one instance per fixture name for the whole test
//! - **Associations**: bidirectional links are kept in sync automatically
//!
//! The persistence layer itself stays outside the crate: the factory drives
//! any host ORM through the [`OrmBackend`]/[`EntityMetadata`] traits, which
//! expose metadata lookup, constructor-free allocation and reflective field
//! access.
//!
//! # Quick Start
//!
//! Define fixtures once per test context:
//!
//! ```ignore
//! use entity_fixtures::prelude::*;
//!
//! let mut factory = FixtureFactory::new(backend);
//!
//! factory.define("SpaceShip")?
//!     .sequence("name", "Ship %d")
//!     .finish()?;
//!
//! factory.define("Person")?
//!     .sequence("name", "Crew member %d")
//!     .reference("space_ship", "SpaceShip")
//!     .finish()?;
//! ```
//!
//! Then request instances, overriding fields as needed:
//!
//! ```ignore
//! let person = factory.get("Person")?;                       // fresh ship too
//! let named = factory.get_with(
//!     "Person",
//!     Overrides::new().with("name", "Kirk"),
//! )?;
//!
//! // Every crew member boards the same ship from here on.
//! let ship = factory.get_as_singleton("SpaceShip")?;
//! ```
//!
//! # Architecture
//!
//! - [`FixtureFactory`]: the instantiation engine. Resolves generators in
//!   declaration order, writes fields through backend metadata, synchronizes
//!   inverse associations, optionally persists
//! - [`EntityDef`] / [`EntityDefBuilder`]: immutable definitions and the
//!   fluent builder that finalizes them
//! - [`FieldDef`] / [`Sequence`]: the field generators
//! - [`Value`] / [`Instance`]: field values and identity-carrying entity
//!   handles
//! - [`OrmBackend`] / [`EntityMetadata`]: the contract the host persistence
//!   layer implements
//!
//! Everything is synchronous and single-threaded; a factory must not be
//! shared across threads.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod factory;
pub mod orm;
pub mod prelude;
pub mod value;

// Re-export commonly used types at crate root
pub use error::{FixtureError, FixtureResult};
pub use factory::{
	AfterCreateHook, DefineOptions, DefinitionRegistry, EntityDef, EntityDefBuilder, FieldDef,
	FixtureFactory, GeneratorFn, Overrides, Sequence,
};
pub use orm::{EntityMetadata, OrmBackend};
pub use value::{Instance, Value};
