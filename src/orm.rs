//! Contract for the persistence/metadata collaborator.
//!
//! The factory does not bundle an ORM. It drives whatever persistence layer
//! the host test suite provides through these two traits: [`OrmBackend`] for
//! type lookup and persistence, [`EntityMetadata`] for reflective access to a
//! single entity type. Instances are allocated without running user
//! construction logic and all field access is mediated by the metadata, so
//! the factory never assumes direct field visibility.
//!
//! The whole contract is synchronous and single-threaded; trait objects are
//! shared through `Rc` and are not required to be `Send` or `Sync`.
//! Concurrent use of a factory is out of contract.

use std::rc::Rc;

use crate::error::FixtureResult;
use crate::value::{Instance, Value};

/// Reflective accessor for one entity type.
///
/// Implementations are obtained from [`OrmBackend::metadata_for`] and describe
/// the type's fields and associations, allocate bare instances, and get/set
/// named fields on an instance.
pub trait EntityMetadata {
	/// The fully qualified entity-type name this metadata describes.
	fn entity_type(&self) -> &str;

	/// All field names of the entity type, including associations, in
	/// schema order.
	fn field_names(&self) -> Vec<String>;

	/// Returns true if the entity type has a field (or association) with
	/// this name.
	fn has_field(&self, name: &str) -> bool;

	/// Returns true if the field is a collection-valued association.
	///
	/// Mutually exclusive with [`is_single_valued_association`](Self::is_single_valued_association).
	fn is_collection_association(&self, name: &str) -> bool;

	/// Returns true if the field is a single-valued association.
	fn is_single_valued_association(&self, name: &str) -> bool;

	/// The name of the inverse field on the related type, for bidirectional
	/// associations.
	///
	/// Either side of the association may declare the inverse. Returns
	/// `Ok(None)` for unidirectional associations and plain fields. If the
	/// mapping on the two sides disagrees, implementations must surface the
	/// inconsistency as an error rather than silently pick one side.
	fn association_inverse(&self, name: &str) -> FixtureResult<Option<String>>;

	/// Allocates a bare instance of the entity type.
	///
	/// No user-defined construction logic may run; every field starts out
	/// reading as [`Value::Null`].
	fn new_instance(&self) -> Instance;

	/// Reads a named field from the instance.
	fn get_field(&self, instance: &Instance, name: &str) -> FixtureResult<Value>;

	/// Writes a named field on the instance.
	fn set_field(&self, instance: &Instance, name: &str, value: Value) -> FixtureResult<()>;
}

/// The persistence layer the factory delegates to.
pub trait OrmBackend {
	/// Looks up metadata for an entity type.
	///
	/// Fails with [`FixtureError::UnknownEntityType`](crate::FixtureError::UnknownEntityType)
	/// if the type is unknown.
	fn metadata_for(&self, entity_type: &str) -> FixtureResult<Rc<dyn EntityMetadata>>;

	/// Hands a constructed instance to the persistence layer.
	///
	/// The factory calls this immediately after construction when
	/// persist-on-get is enabled, once per instance, in construction order.
	/// Any transaction or flush discipline is the backend's business.
	fn persist(&self, instance: &Instance) -> FixtureResult<()>;
}
