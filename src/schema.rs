//! Static schema metadata and live instances
//!
//! The metadata graph is declared once by each driver and never mutated
//! after registration: a [`Namespace`] owns its [`Schema`]s, a schema owns
//! its [`Group`]/[`Parameter`] tree together with the list of live
//! [`Instance`]s. Instances own the actual value memory; the registry only
//! ever holds borrowed views into it, resolved through the schema's
//! [`Mapping`].

use std::any::Any;

use crate::{
	constraint::Constraints,
	error::Error,
	path::{GroupPath, InstancePath, ParameterPath, SchemaPath},
	value::Type,
};

macro_rules! impl_ids {
	($($(#[$attr:meta])* $name:ident)*) => {
		$(
			$(#[$attr])*
			#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
			pub struct $name(pub u32);

			impl std::fmt::Display for $name {
				fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
					std::fmt::Display::fmt(&self.0, f)
				}
			}
		)*
	};
}
impl_ids! {
	/// Id of a namespace, assigned densely in registration order
	NamespaceId
	/// Id of a schema, declared by the schema author, unique within its
	/// namespace
	SchemaId
	/// Id of an instance, assigned densely per schema in insertion order
	InstanceId
	/// Id of a group or parameter
	///
	/// Groups and parameters share one flat id space within their schema;
	/// commit handlers receive this id to learn what was committed.
	ResourceId
}

/// Top-level bucket partitioning schemas by origin (e.g. `sys`, `app`)
pub struct Namespace {
	pub(crate) id: NamespaceId,
	pub(crate) name: String,
	pub(crate) description: String,
	pub(crate) schemas: Vec<Schema>,
}

impl Namespace {
	pub fn new(
		name: impl Into<String>,
		description: impl Into<String>,
		schemas: Vec<Schema>,
	) -> Self {
		Self {
			id: NamespaceId(0),
			name: name.into(),
			description: description.into(),
			schemas,
		}
	}

	/// The namespace id; meaningful once the namespace is registered
	pub fn id(&self) -> NamespaceId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn schemas(&self) -> &[Schema] {
		&self.schemas
	}

	/// Look up a child schema by its declared id
	pub fn schema(&self, id: SchemaId) -> Option<&Schema> {
		self.schemas.iter().find(|schema| schema.id == id)
	}

	/// Look up a child schema by name
	pub fn schema_by_name(&self, name: &str) -> Option<&Schema> {
		self.schemas.iter().find(|schema| schema.name == name)
	}
}

impl std::fmt::Debug for Namespace {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Namespace")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("schemas", &self.schemas)
			.finish_non_exhaustive()
	}
}

/// The shape of one configurable kind
///
/// A schema declares the group/parameter tree and provides the one
/// extension point every driver must implement: the [`Mapping`] that
/// resolves parameter ids to byte windows inside an instance's data.
pub struct Schema {
	pub(crate) id: SchemaId,
	pub(crate) namespace_id: NamespaceId,
	pub(crate) name: String,
	pub(crate) description: String,
	pub(crate) mapping: Box<dyn Mapping>,
	pub(crate) groups: Vec<Group>,
	pub(crate) parameters: Vec<Parameter>,
	pub(crate) instances: Vec<Instance>,
}

impl Schema {
	pub fn new(
		id: SchemaId,
		name: impl Into<String>,
		description: impl Into<String>,
		mapping: impl Mapping + 'static,
		groups: Vec<Group>,
		parameters: Vec<Parameter>,
	) -> Self {
		Self {
			id,
			namespace_id: NamespaceId(0),
			name: name.into(),
			description: description.into(),
			mapping: Box::new(mapping),
			groups,
			parameters,
			instances: Vec::new(),
		}
	}

	pub fn id(&self) -> SchemaId {
		self.id
	}

	/// Id of the owning namespace; meaningful once the namespace is
	/// registered
	pub fn namespace_id(&self) -> NamespaceId {
		self.namespace_id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	/// The integer path addressing this schema
	pub fn path(&self) -> SchemaPath {
		SchemaPath {
			namespace_id: self.namespace_id,
			schema_id: self.id,
		}
	}

	/// Top-level groups, in declaration order
	pub fn groups(&self) -> &[Group] {
		&self.groups
	}

	/// Top-level parameters, in declaration order
	pub fn parameters(&self) -> &[Parameter] {
		&self.parameters
	}

	/// Registered instances, in insertion order
	pub fn instances(&self) -> &[Instance] {
		&self.instances
	}

	/// Look up an instance by its id
	pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
		self.instances.get(id.0 as usize)
	}

	/// Look up a named instance
	pub fn instance_by_name(&self, name: &str) -> Option<&Instance> {
		self.instances
			.iter()
			.find(|instance| instance.name.as_deref() == Some(name))
	}

	/// Find a group anywhere in this schema's tree
	pub fn group(&self, id: ResourceId) -> Option<&Group> {
		find_group_in(&self.groups, id)
	}

	/// Find a parameter anywhere in this schema's tree
	pub fn parameter(&self, id: ResourceId) -> Option<&Parameter> {
		find_parameter_in(&self.parameters, &self.groups, id)
	}

	pub(crate) fn mapping(&self) -> &dyn Mapping {
		&*self.mapping
	}
}

impl std::fmt::Debug for Schema {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Schema")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("groups", &self.groups)
			.field("parameters", &self.parameters)
			.finish_non_exhaustive()
	}
}

pub(crate) fn find_group_in(groups: &[Group], id: ResourceId) -> Option<&Group> {
	groups.iter().find_map(|group| {
		if group.id == id {
			Some(group)
		} else {
			find_group_in(&group.groups, id)
		}
	})
}

pub(crate) fn find_parameter_in<'a>(
	parameters: &'a [Parameter],
	groups: &'a [Group],
	id: ResourceId,
) -> Option<&'a Parameter> {
	parameters
		.iter()
		.find(|parameter| parameter.id == id)
		.or_else(|| {
			groups
				.iter()
				.find_map(|group| find_parameter_in(&group.parameters, &group.groups, id))
		})
}

/// Named non-leaf node inside a schema; groups nest arbitrarily and carry
/// no value
#[derive(Debug)]
pub struct Group {
	pub(crate) id: ResourceId,
	pub(crate) name: String,
	pub(crate) description: String,
	pub(crate) groups: Vec<Group>,
	pub(crate) parameters: Vec<Parameter>,
}

impl Group {
	pub fn new(
		id: ResourceId,
		name: impl Into<String>,
		description: impl Into<String>,
		groups: Vec<Group>,
		parameters: Vec<Parameter>,
	) -> Self {
		Self {
			id,
			name: name.into(),
			description: description.into(),
			groups,
			parameters,
		}
	}

	pub fn id(&self) -> ResourceId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	/// Sub-groups, in declaration order
	pub fn groups(&self) -> &[Group] {
		&self.groups
	}

	/// Parameters of this group, in declaration order
	pub fn parameters(&self) -> &[Parameter] {
		&self.parameters
	}
}

/// Leaf node of a schema: a typed, optionally constrained parameter
///
/// Parameters carry no value themselves; the value lives inside each
/// instance's data and is reached through the schema's [`Mapping`].
#[derive(Clone, Debug)]
pub struct Parameter {
	pub(crate) id: ResourceId,
	pub(crate) name: String,
	pub(crate) description: String,
	pub(crate) constraints: Constraints,
}

impl Parameter {
	pub fn new(
		id: ResourceId,
		name: impl Into<String>,
		description: impl Into<String>,
		constraints: Constraints,
	) -> Self {
		Self {
			id,
			name: name.into(),
			description: description.into(),
			constraints,
		}
	}

	pub fn id(&self) -> ResourceId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	/// The primitive type, implied by the constraint set
	pub fn type_(&self) -> Type {
		self.constraints.type_()
	}

	pub fn constraints(&self) -> &Constraints {
		&self.constraints
	}
}

/// Either a group or a parameter, for lookups over the shared flat id space
#[derive(Debug)]
pub enum GroupOrParameter<'a> {
	Group(&'a Group),
	Parameter(&'a Parameter),
}

/// Address resolution from parameter ids to byte windows, implemented once
/// per schema
///
/// The registry never knows the layout of a driver's data struct; this
/// capability maps a parameter id to the window backing it inside
/// `data`. Implementations must be pure and must return a window whose
/// length equals the parameter's natural type size (or the fixed buffer
/// capacity for string and opaque parameters).
///
/// Windows are typically produced with [`bytemuck::bytes_of`] /
/// [`bytemuck::bytes_of_mut`] over the individual fields. Boolean
/// parameters must be backed by a `u8` field holding 0 or 1: exposing a
/// Rust `bool` as a writable byte window would be unsound.
pub trait Mapping {
	/// Resolve the read window for `parameter` inside `data`, or `None` if
	/// the id is unknown to this schema
	fn window<'a>(&self, parameter: ResourceId, data: &'a dyn Any) -> Option<&'a [u8]>;

	/// Resolve the write window for `parameter` inside `data`
	///
	/// Must designate the same window as [`window`](Mapping::window).
	fn window_mut<'a>(&self, parameter: ResourceId, data: &'a mut dyn Any)
		-> Option<&'a mut [u8]>;
}

/// What a commit refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitScope {
	/// Apply everything staged on the instance
	Instance,
	/// Apply the staged values under one group
	Group(ResourceId),
	/// Apply one staged parameter
	Parameter(ResourceId),
}

/// Commit notification, implemented per instance by the owning driver
///
/// `set` stages values without side effects; the handler is invoked by the
/// `commit_*` family to let the driver apply staged values to the hardware.
/// Handler state replaces the context pointer of a callback-style API:
/// whatever the driver needs lives in the handler value itself.
pub trait CommitHandler {
	fn commit(&mut self, scope: CommitScope, data: &dyn Any) -> Result<(), Error>;
}

impl<F> CommitHandler for F
where
	F: FnMut(CommitScope, &dyn Any) -> Result<(), Error>,
{
	fn commit(&mut self, scope: CommitScope, data: &dyn Any) -> Result<(), Error> {
		self(scope, data)
	}
}

/// A live occurrence of a schema
///
/// The instance exclusively owns its value memory (`data`); registry
/// operations borrow it for the duration of a call and never retain
/// pointers across calls.
pub struct Instance {
	pub(crate) id: InstanceId,
	pub(crate) namespace_id: NamespaceId,
	pub(crate) schema_id: SchemaId,
	pub(crate) name: Option<String>,
	pub(crate) data: Box<dyn Any>,
	pub(crate) commit: Option<Box<dyn CommitHandler>>,
}

impl Instance {
	pub fn new(data: impl Any) -> Self {
		Self {
			id: InstanceId(0),
			namespace_id: NamespaceId(0),
			schema_id: SchemaId(0),
			name: None,
			data: Box::new(data),
			commit: None,
		}
	}

	/// Attach a human-readable name, used by the string path encoding
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Attach the commit handler; instances without one are skipped by
	/// commit traversals
	pub fn with_commit_handler(mut self, handler: impl CommitHandler + 'static) -> Self {
		self.commit = Some(Box::new(handler));
		self
	}

	/// The instance id; meaningful once the instance is registered
	pub fn id(&self) -> InstanceId {
		self.id
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// The integer path addressing this instance
	pub fn path(&self) -> InstancePath {
		InstancePath {
			namespace_id: self.namespace_id,
			schema_id: self.schema_id,
			instance_id: self.id,
		}
	}

	/// The integer path addressing `parameter` on this instance
	pub fn parameter_path(&self, parameter: &Parameter) -> ParameterPath {
		ParameterPath {
			namespace_id: self.namespace_id,
			schema_id: self.schema_id,
			instance_id: self.id,
			parameter_id: parameter.id,
		}
	}

	/// The integer path addressing `group` on this instance
	pub fn group_path(&self, group: &Group) -> GroupPath {
		GroupPath {
			namespace_id: self.namespace_id,
			schema_id: self.schema_id,
			instance_id: self.id,
			group_id: group.id,
		}
	}

	/// Borrow the instance data as its concrete type
	pub fn data<T: Any>(&self) -> Option<&T> {
		self.data.downcast_ref()
	}
}

impl std::fmt::Debug for Instance {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Instance")
			.field("id", &self.id)
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}
