//! Volatile in-memory storage
//!
//! Keeps records on the heap, useful for tests and for staging
//! configurations that must survive a re-`load` but not a reboot. Clones
//! share the same record map, so one `HeapStorage` can be registered both
//! as a source and as the destination.

use std::{cell::RefCell, rc::Rc};

use hashbrown::HashMap;

use crate::{
	error::{keep_first_error, Error},
	path::ParameterPath,
	storage::{LoadCallback, Storage},
	value::Value,
};

#[derive(Clone, Default)]
pub struct HeapStorage {
	records: Rc<RefCell<HashMap<ParameterPath, Vec<u8>>>>,
}

impl HeapStorage {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of records currently held
	pub fn len(&self) -> usize {
		self.records.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.borrow().is_empty()
	}

	/// The persisted bytes of one record, if present
	pub fn record(&self, parameter: ParameterPath) -> Option<Vec<u8>> {
		self.records.borrow().get(&parameter).cloned()
	}

	/// Drop all records
	pub fn clear(&self) {
		self.records.borrow_mut().clear();
	}

	/// Insert a record directly, bypassing the registry
	pub fn insert(&self, parameter: ParameterPath, bytes: Vec<u8>) {
		self.records.borrow_mut().insert(parameter, bytes);
	}
}

impl Storage for HeapStorage {
	fn load(&mut self, load_cb: &mut LoadCallback<'_>) -> Result<(), Error> {
		let mut result = Ok(());
		for (path, bytes) in self.records.borrow().iter() {
			keep_first_error(&mut result, load_cb(*path, bytes));
		}
		result
	}

	fn save(&mut self, parameter: ParameterPath, value: &Value<'_>) -> Result<(), Error> {
		self.records
			.borrow_mut()
			.insert(parameter, value.bytes.to_vec());
		Ok(())
	}
}
