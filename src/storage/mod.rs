//! Persistence: storage sources and the save destination
//!
//! The registry keeps a list of load-only **sources** and at most one
//! save-only **destination**. The core's only contract with a backend is
//! the `(instance, parameter, value bytes)` triple, with the instance and
//! parameter half carried as a [`ParameterPath`]; how records are laid out
//! on disk or in flash is entirely the backend's concern.
//!
//! `load` treats per-record failures (unresolvable ids, constraint
//! violations) as non-fatal: they are logged and skipped, nothing more. A
//! stale record must not prevent the rest of the persisted state from
//! coming up.

pub mod file;
pub mod heap;

use crate::{
	error::{keep_first_error, Error},
	path::{InstancePath, ParameterPath, SchemaPath},
	registry::{ExportData, Registry},
	schema::{NamespaceId, ResourceId},
	value::Value,
};

/// Callback a storage source feeds its persisted records into
pub type LoadCallback<'a> = dyn FnMut(ParameterPath, &[u8]) -> Result<(), Error> + 'a;

/// A storage backend
///
/// Backends registered as sources only ever get their `load` called;
/// the destination only ever gets the `save*` family. The optional
/// `save_start`/`save_end` hooks bracket one whole save traversal (not
/// each individual `save` call) for backends that batch, mount or flush.
pub trait Storage {
	/// Feed every persisted record into `load_cb`
	fn load(&mut self, load_cb: &mut LoadCallback<'_>) -> Result<(), Error>;

	/// Persist one `(instance, parameter, value)` triple
	fn save(&mut self, parameter: ParameterPath, value: &Value<'_>) -> Result<(), Error>;

	/// Called once before a save traversal starts
	fn save_start(&mut self) -> Result<(), Error> {
		Ok(())
	}

	/// Called once after a save traversal finished, even if it failed
	fn save_end(&mut self) -> Result<(), Error> {
		Ok(())
	}
}

impl Registry {
	/// Register a storage to load configurations from
	///
	/// Sources are consulted in registration order; when several sources
	/// carry the same record, the one registered last wins.
	pub fn register_storage_source(&mut self, source: impl Storage + 'static) {
		self.storage_sources.push(Box::new(source));
	}

	/// Register the storage that save operations write to, replacing any
	/// previously registered destination
	pub fn register_storage_destination(&mut self, destination: impl Storage + 'static) {
		self.storage_destination = Some(Box::new(destination));
	}

	/// Load persisted values from every source, in registration order
	///
	/// Each record turns into a [`set`](Registry::set); records that do not
	/// resolve or fail validation are logged and skipped. A failing source
	/// does not stop the remaining sources; the first source error is
	/// returned at the end.
	pub fn load(&mut self) -> Result<(), Error> {
		let mut sources = std::mem::take(&mut self.storage_sources);
		let mut result = Ok(());
		for source in &mut sources {
			let outcome = source.load(&mut |path, bytes| {
				if let Err(error) = self.set(path.instance_path(), path.parameter_id, bytes) {
					tracing::warn!(%path, %error, "skipping persisted record");
				}
				Ok(())
			});
			keep_first_error(&mut result, outcome);
		}
		self.storage_sources = sources;
		result
	}

	/// Save every parameter of every registered instance
	pub fn save(&mut self) -> Result<(), Error> {
		self.save_rooted(|registry, save_cb| registry.export(save_cb, 0))
	}

	/// Save every parameter under one namespace
	pub fn save_namespace(&mut self, namespace: NamespaceId) -> Result<(), Error> {
		self.save_rooted(|registry, save_cb| {
			let namespace = registry.namespace(namespace)?;
			registry.export_namespace(namespace, save_cb, 0)
		})
	}

	/// Save every parameter of every instance of one schema
	pub fn save_schema(&mut self, schema: SchemaPath) -> Result<(), Error> {
		self.save_rooted(|registry, save_cb| {
			let (_, schema) = schema.resolve(registry)?;
			registry.export_schema(schema, save_cb, 0)
		})
	}

	/// Save every parameter of one instance
	pub fn save_instance(&mut self, instance: InstancePath) -> Result<(), Error> {
		self.save_rooted(|registry, save_cb| {
			let (_, _, instance) = instance.resolve(registry)?;
			registry.export_instance(instance, save_cb, 0)
		})
	}

	/// Save every parameter under one group
	pub fn save_group(&mut self, instance: InstancePath, group: ResourceId) -> Result<(), Error> {
		self.save_rooted(|registry, save_cb| {
			let (_, schema, instance) = instance.resolve(registry)?;
			let group = schema.group(group).ok_or(Error::NotFound)?;
			registry.export_group(instance, group, save_cb, 0)
		})
	}

	/// Save a single parameter
	pub fn save_parameter(
		&mut self,
		instance: InstancePath,
		parameter: ResourceId,
	) -> Result<(), Error> {
		self.save_rooted(|registry, save_cb| {
			let (_, schema, instance) = instance.resolve(registry)?;
			let parameter = schema.parameter(parameter).ok_or(Error::NotFound)?;
			registry.export_parameter(instance, parameter, save_cb)
		})
	}

	/// Run a rooted export traversal against the destination storage,
	/// bracketed by `save_start`/`save_end`
	///
	/// Save reuses the export walker so that save semantics follow the same
	/// traversal rules as every other introspection; non-parameter nodes
	/// are ignored.
	fn save_rooted(
		&mut self,
		root: impl FnOnce(
			&Registry,
			&mut (dyn FnMut(&ExportData<'_>) -> Result<(), Error> + '_),
		) -> Result<(), Error>,
	) -> Result<(), Error> {
		let mut destination = self
			.storage_destination
			.take()
			.ok_or(Error::NoDestinationStorage)?;

		let started = destination.save_start();
		let mut traversed = Ok(());
		if started.is_ok() {
			let registry = &*self;
			traversed = root(registry, &mut |data| {
				let ExportData::Parameter {
					instance,
					parameter,
				} = data
				else {
					return Ok(());
				};
				let value = registry.get_ref(instance, parameter)?;
				destination.save(instance.parameter_path(parameter), &value)
			});
		}
		let ended = destination.save_end();

		self.storage_destination = Some(destination);
		started?;
		traversed?;
		ended
	}
}
