//! The fixture factory: definitions, generators and the instantiation engine.

mod definition;
mod engine;
mod field;
mod registry;
mod sequence;

pub use definition::{AfterCreateHook, DefineOptions, EntityDef, EntityDefBuilder};
pub use engine::{FixtureFactory, Overrides};
pub use field::{FieldDef, GeneratorFn};
pub use registry::DefinitionRegistry;
pub use sequence::Sequence;
