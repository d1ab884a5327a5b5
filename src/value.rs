//! Field values and entity instance handles.
//!
//! The factory and the persistence collaborator exchange field contents as
//! [`Value`]s. Scalars are carried by value; entities are carried as
//! [`Instance`] handles whose identity is pointer identity, so the same
//! entity appearing on both sides of an association compares equal.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::{FixtureError, FixtureResult};

/// A handle to a single entity instance.
///
/// The handle pairs the entity-type name with opaque state owned by the
/// persistence layer. The factory never inspects the state directly; all
/// field reads and writes go through [`EntityMetadata`](crate::orm::EntityMetadata).
///
/// Cloning an `Instance` clones the handle, not the entity: both clones refer
/// to the same underlying state and compare equal under [`Instance::ptr_eq`].
#[derive(Clone)]
pub struct Instance {
	entity_type: Rc<str>,
	state: Rc<dyn Any>,
}

impl Instance {
	/// Creates a handle for `state` belonging to `entity_type`.
	///
	/// Called by persistence-layer implementations from
	/// [`EntityMetadata::new_instance`](crate::orm::EntityMetadata::new_instance).
	pub fn new(entity_type: impl Into<String>, state: Rc<dyn Any>) -> Self {
		Self {
			entity_type: Rc::from(entity_type.into()),
			state,
		}
	}

	/// The entity-type name this instance belongs to.
	pub fn entity_type(&self) -> &str {
		&self.entity_type
	}

	/// Borrows the backend state downcast to its concrete type.
	///
	/// Returns `None` if the state is of a different type. Only the
	/// persistence layer that created the instance knows the concrete type.
	pub fn state<T: 'static>(&self) -> Option<&T> {
		self.state.downcast_ref::<T>()
	}

	/// Returns true if both handles refer to the same underlying entity.
	pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
		Rc::ptr_eq(&a.state, &b.state)
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Instance<{}@{:p}>",
			self.entity_type,
			Rc::as_ptr(&self.state)
		)
	}
}

impl PartialEq for Instance {
	fn eq(&self, other: &Self) -> bool {
		Instance::ptr_eq(self, other)
	}
}

/// A field value exchanged between the factory and the persistence layer.
///
/// `Null` doubles as "unset": a freshly allocated instance reports `Null` for
/// every field, and a collection-valued association holding `Null` is
/// initialized to an empty [`Value::List`] during instantiation.
#[derive(Clone, Debug, Default)]
pub enum Value {
	/// No value.
	#[default]
	Null,
	/// Boolean scalar.
	Bool(bool),
	/// Integer scalar.
	Int(i64),
	/// Floating-point scalar.
	Float(f64),
	/// String scalar.
	Str(String),
	/// A reference to another entity instance.
	Entity(Instance),
	/// An ordered collection of values.
	List(Vec<Value>),
}

impl Value {
	/// Returns true for [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Borrows the string scalar, if this is one.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s),
			_ => None,
		}
	}

	/// Returns the integer scalar, if this is one.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(n) => Some(*n),
			_ => None,
		}
	}

	/// Borrows the entity handle, if this is one.
	pub fn as_entity(&self) -> Option<&Instance> {
		match self {
			Value::Entity(instance) => Some(instance),
			_ => None,
		}
	}

	/// Borrows the collection elements, if this is a list.
	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(items) => Some(items),
			_ => None,
		}
	}

	/// Converts a JSON value into a field value.
	///
	/// Scalars map one to one and arrays map to [`Value::List`]. JSON objects
	/// are rejected: an object literal carries no entity identity, and
	/// accepting one would invent an entity behind the registry's back.
	pub fn from_json(json: serde_json::Value) -> FixtureResult<Value> {
		match json {
			serde_json::Value::Null => Ok(Value::Null),
			serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
			serde_json::Value::Number(n) => {
				if let Some(i) = n.as_i64() {
					Ok(Value::Int(i))
				} else if let Some(f) = n.as_f64() {
					Ok(Value::Float(f))
				} else {
					Err(FixtureError::Metadata(format!(
						"JSON number {n} does not fit a field value"
					)))
				}
			}
			serde_json::Value::String(s) => Ok(Value::Str(s)),
			serde_json::Value::Array(items) => Ok(Value::List(
				items
					.into_iter()
					.map(Value::from_json)
					.collect::<FixtureResult<Vec<_>>>()?,
			)),
			serde_json::Value::Object(_) => Err(FixtureError::Metadata(
				"JSON objects cannot be converted to field values".to_string(),
			)),
		}
	}

	/// Converts a scalar (or list of scalars) back into JSON.
	///
	/// Returns `None` if the value contains an entity handle, which has no
	/// JSON representation.
	pub fn to_json(&self) -> Option<serde_json::Value> {
		match self {
			Value::Null => Some(serde_json::Value::Null),
			Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
			Value::Int(n) => Some(serde_json::json!(n)),
			Value::Float(f) => serde_json::Number::from_f64(*f).map(serde_json::Value::Number),
			Value::Str(s) => Some(serde_json::Value::String(s.clone())),
			Value::Entity(_) => None,
			Value::List(items) => items
				.iter()
				.map(Value::to_json)
				.collect::<Option<Vec<_>>>()
				.map(serde_json::Value::Array),
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Float(a), Value::Float(b)) => a == b,
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::Entity(a), Value::Entity(b)) => Instance::ptr_eq(a, b),
			(Value::List(a), Value::List(b)) => a == b,
			_ => false,
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(n: i64) -> Self {
		Value::Int(n)
	}
}

impl From<i32> for Value {
	fn from(n: i32) -> Self {
		Value::Int(n.into())
	}
}

impl From<u64> for Value {
	fn from(n: u64) -> Self {
		Value::Int(n as i64)
	}
}

impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Value::Float(f)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::Str(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::Str(s)
	}
}

impl From<Instance> for Value {
	fn from(instance: Instance) -> Self {
		Value::Entity(instance)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Value::List(items)
	}
}

impl<V: Into<Value>> From<Option<V>> for Value {
	fn from(opt: Option<V>) -> Self {
		match opt {
			Some(v) => v.into(),
			None => Value::Null,
		}
	}
}
