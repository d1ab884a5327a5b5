//! Convenience re-exports for common usage.
//!
//! A single import for the items most test suites touch:
//!
//! ```ignore
//! use entity_fixtures::prelude::*;
//! ```

// Error types
pub use crate::error::{FixtureError, FixtureResult};

// Values and instance handles
pub use crate::value::{Instance, Value};

// Factory types
pub use crate::factory::{
	DefineOptions, EntityDef, EntityDefBuilder, FieldDef, FixtureFactory, Overrides, Sequence,
};

// Collaborator contract
pub use crate::orm::{EntityMetadata, OrmBackend};
