//! Definition registry.
//!
//! Maps fixture names to finalized definitions. The registry is owned by its
//! [`FixtureFactory`](crate::FixtureFactory) rather than living in process
//! globals, so independent factories (and independent tests) never see each
//! other's definitions.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{FixtureError, FixtureResult};
use crate::factory::definition::EntityDef;

/// Name → definition map with duplicate rejection.
#[derive(Default)]
pub struct DefinitionRegistry {
	defs: HashMap<String, Rc<EntityDef>>,
}

impl DefinitionRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a finalized definition under its fixture name.
	///
	/// Fails without mutating the registry if the name is taken.
	pub fn insert(&mut self, def: EntityDef) -> FixtureResult<()> {
		let name = def.name().to_string();
		if self.defs.contains_key(&name) {
			return Err(FixtureError::AlreadyDefined(name));
		}
		self.defs.insert(name, Rc::new(def));
		Ok(())
	}

	/// Looks up a definition by fixture name.
	pub fn get(&self, name: &str) -> Option<Rc<EntityDef>> {
		self.defs.get(name).cloned()
	}

	/// Returns true if a definition exists for the fixture name.
	pub fn contains(&self, name: &str) -> bool {
		self.defs.contains_key(name)
	}

	/// All registered fixture names.
	pub fn names(&self) -> Vec<String> {
		self.defs.keys().cloned().collect()
	}

	/// The number of registered definitions.
	pub fn len(&self) -> usize {
		self.defs.len()
	}

	/// Returns true if no definitions are registered.
	pub fn is_empty(&self) -> bool {
		self.defs.is_empty()
	}
}
