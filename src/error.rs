//! Error types for the fixture factory.
//!
//! This module defines the error types used throughout the entity-fixtures crate.

use thiserror::Error;

/// Errors that can occur while defining or instantiating fixtures.
///
/// All failures are immediate, synchronous signals. The factory never retries
/// and never rolls back a partially constructed instance; a failed step simply
/// abandons the instance without registering or returning it.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// A fixture with this name is already defined in the factory.
	#[error("fixture '{0}' is already defined in the factory")]
	AlreadyDefined(String),

	/// The fixture name has no definition.
	#[error("fixture '{0}' is undefined; define it before calling get()")]
	UndefinedFixture(String),

	/// The persistence layer has no metadata for the entity type.
	#[error("unknown entity type: {0}")]
	UnknownEntityType(String),

	/// A field definition names a field the entity type does not have.
	#[error("no such field in {entity_type}: '{field}'")]
	UnknownField {
		/// Entity type the definition targets.
		entity_type: String,
		/// The offending field name.
		field: String,
	},

	/// One or more override keys do not name declared fields.
	#[error("field(s) not in {entity_type}: '{}'", .fields.join("', '"))]
	UnknownOverrides {
		/// Entity type the definition targets.
		entity_type: String,
		/// Every offending override key, in the order given.
		fields: Vec<String>,
	},

	/// A singleton already exists for the fixture name.
	#[error("already a singleton: {0}")]
	AlreadySingleton(String),

	/// A collection-valued association held or was given a non-collection value.
	#[error(
		"field {field} of {entity_type} is a collection-valued association but its value is not a collection"
	)]
	CollectionExpected {
		/// Entity type owning the collection field.
		entity_type: String,
		/// The collection-valued field.
		field: String,
	},

	/// Association metadata reported by the persistence layer is inconsistent.
	#[error("metadata error: {0}")]
	Metadata(String),

	/// The persistence collaborator failed.
	#[error("backend error: {0}")]
	Backend(String),
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;
