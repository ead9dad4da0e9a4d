//! The registry core: registration, value access, commit dispatch and the
//! export traversal

use crate::{
	error::{keep_first_error, Error},
	path::{InstancePath, SchemaPath},
	schema::{
		find_parameter_in, CommitScope, Group, Instance, InstanceId, Namespace, NamespaceId,
		Parameter, ResourceId, Schema,
	},
	storage::Storage,
	value::Value,
};

/// The central store of configuration metadata and instances
///
/// All state lives here: the namespace list, the schemas with their
/// instance lists, and the storage sources/destination. Registration
/// happens once at startup; steady-state operation only reads the graph
/// and mutates values through [`set`](Registry::set) and the load path.
#[derive(Default)]
pub struct Registry {
	pub(crate) namespaces: Vec<Namespace>,
	pub(crate) storage_sources: Vec<Box<dyn Storage>>,
	pub(crate) storage_destination: Option<Box<dyn Storage>>,
}

/// What an export callback is looking at
///
/// Parameter nodes also carry the instance so that the callback can read
/// the current value through [`Registry::get_ref`].
#[derive(Debug)]
pub enum ExportData<'a> {
	Namespace(&'a Namespace),
	Schema(&'a Schema),
	Instance(&'a Instance),
	Group(&'a Group),
	Parameter {
		instance: &'a Instance,
		parameter: &'a Parameter,
	},
}

/// Callback invoked once per visited node during an export traversal
///
/// Returning an error aborts the subtree below the current node; the
/// traversal goes on with the next sibling and the first error is returned
/// once the walk is complete.
pub type ExportCallback<'a> = dyn FnMut(&ExportData<'_>) -> Result<(), Error> + 'a;

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a namespace, assigning the next dense namespace id
	///
	/// The schemas inside the namespace are validated: schema ids and names
	/// must be unique within the namespace, resource ids unique within each
	/// schema and node names unique within each parent.
	pub fn register_namespace(&mut self, mut namespace: Namespace) -> Result<NamespaceId, Error> {
		for (index, schema) in namespace.schemas.iter().enumerate() {
			let duplicate = namespace.schemas[..index]
				.iter()
				.any(|other| other.id == schema.id || other.name == schema.name);
			if duplicate {
				return Err(Error::Invalid);
			}
			validate_schema(schema)?;
		}

		let id = NamespaceId(self.namespaces.len() as u32);
		namespace.id = id;
		for schema in &mut namespace.schemas {
			schema.namespace_id = id;
		}
		tracing::debug!(namespace = %namespace.name, %id, "registered namespace");
		self.namespaces.push(namespace);
		Ok(id)
	}

	/// Attach an instance to a schema, assigning the next dense instance id
	///
	/// A named instance is rejected with [`Error::Invalid`] when the schema
	/// already has an instance of the same name, so that string paths stay
	/// unambiguous.
	pub fn add_schema_instance(
		&mut self,
		schema: SchemaPath,
		mut instance: Instance,
	) -> Result<InstancePath, Error> {
		let entry = self.schema_entry_mut(schema)?;
		if let Some(name) = instance.name.as_deref() {
			if entry.instance_by_name(name).is_some() {
				return Err(Error::Invalid);
			}
		}
		instance.id = InstanceId(entry.instances.len() as u32);
		instance.namespace_id = schema.namespace_id;
		instance.schema_id = schema.schema_id;
		let path = instance.path();
		tracing::debug!(schema = %entry.name, instance = ?instance.name, %path, "added schema instance");
		entry.instances.push(instance);
		Ok(path)
	}

	/// All registered namespaces, in registration order
	pub fn namespaces(&self) -> &[Namespace] {
		&self.namespaces
	}

	/// Look up a namespace by id
	pub fn namespace(&self, id: NamespaceId) -> Result<&Namespace, Error> {
		self.namespaces.get(id.0 as usize).ok_or(Error::NotFound)
	}

	/// Look up a namespace by name
	pub fn namespace_by_name(&self, name: &str) -> Result<&Namespace, Error> {
		self.namespaces
			.iter()
			.find(|namespace| namespace.name == name)
			.ok_or(Error::NotFound)
	}

	/// The schema an instance belongs to
	pub fn schema_of(&self, instance: &Instance) -> Result<&Schema, Error> {
		self.namespace(instance.namespace_id)?
			.schema(instance.schema_id)
			.ok_or(Error::NotFound)
	}

	fn schema_entry_mut(&mut self, path: SchemaPath) -> Result<&mut Schema, Error> {
		self.namespaces
			.get_mut(path.namespace_id.0 as usize)
			.ok_or(Error::NotFound)?
			.schemas
			.iter_mut()
			.find(|schema| schema.id == path.schema_id)
			.ok_or(Error::NotFound)
	}

	/// Read the current value of a parameter
	///
	/// The returned [`Value`] borrows the window inside the instance's data
	/// that backs the parameter; nothing is copied.
	pub fn get(&self, instance: InstancePath, parameter: ResourceId) -> Result<Value<'_>, Error> {
		let (_, schema, entry) = instance.resolve(self)?;
		let parameter = schema.parameter(parameter).ok_or(Error::NotFound)?;
		let window = schema
			.mapping()
			.window(parameter.id(), &*entry.data)
			.ok_or(Error::NotFound)?;
		Ok(Value::new(parameter.type_(), window))
	}

	/// [`get`](Registry::get) for callers that already hold graph references
	/// (export callbacks in particular)
	///
	/// Fails with [`Error::Invalid`] if `parameter` does not belong to the
	/// instance's schema.
	pub fn get_ref<'r>(
		&'r self,
		instance: &'r Instance,
		parameter: &'r Parameter,
	) -> Result<Value<'r>, Error> {
		let schema = self.schema_of(instance)?;
		let known = schema.parameter(parameter.id()).ok_or(Error::NotFound)?;
		if !std::ptr::eq(known, parameter) {
			return Err(Error::Invalid);
		}
		let window = schema
			.mapping()
			.window(parameter.id(), &*instance.data)
			.ok_or(Error::NotFound)?;
		Ok(Value::new(parameter.type_(), window))
	}

	/// Stage a new value for a parameter
	///
	/// The bytes are validated against the parameter's constraints and
	/// copied into the window backing the parameter; nothing is mutated on
	/// failure. Fixed-size types require `bytes` to be exactly the type's
	/// size; string and opaque values must fit the window. Committing is a
	/// separate step so that a caller can stage several parameters and then
	/// apply them atomically from the driver's point of view.
	pub fn set(
		&mut self,
		instance: InstancePath,
		parameter: ResourceId,
		bytes: &[u8],
	) -> Result<(), Error> {
		let schema = self.schema_entry_mut(instance.schema_path())?;
		let Schema {
			ref mapping,
			ref groups,
			ref parameters,
			ref mut instances,
			..
		} = *schema;
		let parameter =
			find_parameter_in(parameters, groups, parameter).ok_or(Error::NotFound)?;
		let entry = instances
			.get_mut(instance.instance_id.0 as usize)
			.ok_or(Error::NotFound)?;
		let window = mapping
			.window_mut(parameter.id(), &mut *entry.data)
			.ok_or(Error::NotFound)?;
		if bytes.len() > window.len() {
			return Err(Error::Invalid);
		}
		if let Some(size) = parameter.type_().size() {
			if bytes.len() != size {
				return Err(Error::Invalid);
			}
		}
		parameter.constraints().check(bytes)?;
		window[..bytes.len()].copy_from_slice(bytes);
		Ok(())
	}

	/// Fire the commit handler of one instance for a single parameter
	pub fn commit_parameter(
		&mut self,
		instance: InstancePath,
		parameter: ResourceId,
	) -> Result<(), Error> {
		let schema = self.schema_entry_mut(instance.schema_path())?;
		if find_parameter_in(&schema.parameters, &schema.groups, parameter).is_none() {
			return Err(Error::NotFound);
		}
		let entry = instance_entry_mut(schema, instance.instance_id)?;
		commit_one(entry, CommitScope::Parameter(parameter))
	}

	/// Fire the commit handler of one instance for a group subtree
	pub fn commit_group(
		&mut self,
		instance: InstancePath,
		group: ResourceId,
	) -> Result<(), Error> {
		let schema = self.schema_entry_mut(instance.schema_path())?;
		if crate::schema::find_group_in(&schema.groups, group).is_none() {
			return Err(Error::NotFound);
		}
		let entry = instance_entry_mut(schema, instance.instance_id)?;
		commit_one(entry, CommitScope::Group(group))
	}

	/// Fire the commit handler of one instance for the whole instance
	pub fn commit_instance(&mut self, instance: InstancePath) -> Result<(), Error> {
		let schema = self.schema_entry_mut(instance.schema_path())?;
		let entry = instance_entry_mut(schema, instance.instance_id)?;
		commit_one(entry, CommitScope::Instance)
	}

	/// Commit every instance of a schema
	pub fn commit_schema(&mut self, schema: SchemaPath) -> Result<(), Error> {
		let entry = self.schema_entry_mut(schema)?;
		commit_schema_entries(entry)
	}

	/// Commit every instance of every schema in a namespace
	pub fn commit_namespace(&mut self, namespace: NamespaceId) -> Result<(), Error> {
		let namespace = self
			.namespaces
			.get_mut(namespace.0 as usize)
			.ok_or(Error::NotFound)?;
		let mut result = Ok(());
		for schema in &mut namespace.schemas {
			keep_first_error(&mut result, commit_schema_entries(schema));
		}
		result
	}

	/// Commit every registered instance
	pub fn commit(&mut self) -> Result<(), Error> {
		let mut result = Ok(());
		for namespace in &mut self.namespaces {
			for schema in &mut namespace.schemas {
				keep_first_error(&mut result, commit_schema_entries(schema));
			}
		}
		result
	}

	/// Walk the whole registry graph
	///
	/// `recursion_depth` bounds the walk: `0` is unlimited, `1` visits only
	/// the starting nodes, `n > 1` the starting nodes plus `n - 1` more
	/// levels. Children are visited in declaration order, groups before
	/// parameters; this order is part of the contract.
	pub fn export(
		&self,
		export_cb: &mut ExportCallback<'_>,
		recursion_depth: u8,
	) -> Result<(), Error> {
		let mut result = Ok(());
		for namespace in &self.namespaces {
			keep_first_error(
				&mut result,
				self.export_namespace(namespace, export_cb, recursion_depth),
			);
		}
		result
	}

	/// Export the subtree rooted at one namespace
	pub fn export_namespace(
		&self,
		namespace: &Namespace,
		export_cb: &mut ExportCallback<'_>,
		recursion_depth: u8,
	) -> Result<(), Error> {
		export_cb(&ExportData::Namespace(namespace))?;
		if recursion_depth == 1 {
			return Ok(());
		}
		let depth = child_depth(recursion_depth);
		let mut result = Ok(());
		for schema in &namespace.schemas {
			keep_first_error(&mut result, self.export_schema(schema, export_cb, depth));
		}
		result
	}

	/// Export the subtree rooted at one schema
	pub fn export_schema(
		&self,
		schema: &Schema,
		export_cb: &mut ExportCallback<'_>,
		recursion_depth: u8,
	) -> Result<(), Error> {
		export_cb(&ExportData::Schema(schema))?;
		if recursion_depth == 1 {
			return Ok(());
		}
		let depth = child_depth(recursion_depth);
		let mut result = Ok(());
		for instance in &schema.instances {
			keep_first_error(
				&mut result,
				self.export_instance_in(schema, instance, export_cb, depth),
			);
		}
		result
	}

	/// Export the subtree rooted at one instance
	pub fn export_instance(
		&self,
		instance: &Instance,
		export_cb: &mut ExportCallback<'_>,
		recursion_depth: u8,
	) -> Result<(), Error> {
		let schema = self.schema_of(instance)?;
		self.export_instance_in(schema, instance, export_cb, recursion_depth)
	}

	fn export_instance_in(
		&self,
		schema: &Schema,
		instance: &Instance,
		export_cb: &mut ExportCallback<'_>,
		recursion_depth: u8,
	) -> Result<(), Error> {
		export_cb(&ExportData::Instance(instance))?;
		if recursion_depth == 1 {
			return Ok(());
		}
		let depth = child_depth(recursion_depth);
		let mut result = Ok(());
		for group in &schema.groups {
			keep_first_error(
				&mut result,
				self.export_group(instance, group, export_cb, depth),
			);
		}
		for parameter in &schema.parameters {
			keep_first_error(
				&mut result,
				self.export_parameter(instance, parameter, export_cb),
			);
		}
		result
	}

	/// Export the subtree rooted at one group
	pub fn export_group(
		&self,
		instance: &Instance,
		group: &Group,
		export_cb: &mut ExportCallback<'_>,
		recursion_depth: u8,
	) -> Result<(), Error> {
		export_cb(&ExportData::Group(group))?;
		if recursion_depth == 1 {
			return Ok(());
		}
		let depth = child_depth(recursion_depth);
		let mut result = Ok(());
		for child in &group.groups {
			keep_first_error(
				&mut result,
				self.export_group(instance, child, export_cb, depth),
			);
		}
		for parameter in &group.parameters {
			keep_first_error(
				&mut result,
				self.export_parameter(instance, parameter, export_cb),
			);
		}
		result
	}

	/// Export a single parameter node
	pub fn export_parameter(
		&self,
		instance: &Instance,
		parameter: &Parameter,
		export_cb: &mut ExportCallback<'_>,
	) -> Result<(), Error> {
		export_cb(&ExportData::Parameter {
			instance,
			parameter,
		})
	}
}

/// Depth to pass on to children: one less than ours, with 0 staying
/// "unlimited"
fn child_depth(recursion_depth: u8) -> u8 {
	if recursion_depth > 1 {
		recursion_depth - 1
	} else {
		0
	}
}

fn instance_entry_mut(schema: &mut Schema, id: InstanceId) -> Result<&mut Instance, Error> {
	schema.instances.get_mut(id.0 as usize).ok_or(Error::NotFound)
}

/// Invoke one instance's commit handler; instances without a handler are
/// skipped and record no error
fn commit_one(instance: &mut Instance, scope: CommitScope) -> Result<(), Error> {
	match &mut instance.commit {
		None => Ok(()),
		Some(handler) => handler.commit(scope, &*instance.data),
	}
}

fn commit_schema_entries(schema: &mut Schema) -> Result<(), Error> {
	let mut result = Ok(());
	for instance in &mut schema.instances {
		keep_first_error(&mut result, commit_one(instance, CommitScope::Instance));
	}
	result
}

fn validate_schema(schema: &Schema) -> Result<(), Error> {
	let mut seen = hashbrown::HashSet::new();
	fn walk(
		groups: &[Group],
		parameters: &[Parameter],
		seen: &mut hashbrown::HashSet<ResourceId>,
	) -> Result<(), Error> {
		// names must be unique within one parent, ids within the schema
		for (index, parameter) in parameters.iter().enumerate() {
			if parameters[..index].iter().any(|other| other.name() == parameter.name()) {
				return Err(Error::Invalid);
			}
			if !seen.insert(parameter.id()) {
				return Err(Error::Invalid);
			}
		}
		for (index, group) in groups.iter().enumerate() {
			let clash = groups[..index].iter().any(|other| other.name() == group.name())
				|| parameters.iter().any(|parameter| parameter.name() == group.name());
			if clash {
				return Err(Error::Invalid);
			}
			if !seen.insert(group.id()) {
				return Err(Error::Invalid);
			}
			walk(group.groups(), group.parameters(), seen)?;
		}
		Ok(())
	}
	walk(schema.groups(), schema.parameters(), &mut seen)
}
