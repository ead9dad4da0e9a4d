//! Integer-tuple path encoding
//!
//! A path is a fixed-length tuple of small integers in the order
//! `namespace_id / schema_id / instance_id / group_or_parameter_id`; the
//! path type says how many of the fields are meaningful. These tuples are
//! the registry's stable addressing scheme: they are what `get`/`set` and
//! the commit family take, what storage backends persist, and what the
//! shell accepts in its numeric form (e.g. `0/0/0/2`).
//!
//! Conversions are pure graph lookups: `resolve` walks the registry and
//! returns [`Error::NotFound`] as soon as one id fails to resolve, while
//! the `path()` accessors on [`Schema`](crate::schema::Schema) and
//! [`Instance`] go the other way.

use crate::{
	error::Error,
	registry::Registry,
	schema::{
		Group, GroupOrParameter, Instance, InstanceId, Namespace, NamespaceId, Parameter,
		ResourceId, Schema, SchemaId,
	},
};

/// Path of a namespace
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NamespacePath {
	pub namespace_id: NamespaceId,
}

/// Path of a schema
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SchemaPath {
	pub namespace_id: NamespaceId,
	pub schema_id: SchemaId,
}

/// Path of an instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstancePath {
	pub namespace_id: NamespaceId,
	pub schema_id: SchemaId,
	pub instance_id: InstanceId,
}

/// Path of a group on an instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupPath {
	pub namespace_id: NamespaceId,
	pub schema_id: SchemaId,
	pub instance_id: InstanceId,
	pub group_id: ResourceId,
}

/// Path of a parameter on an instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParameterPath {
	pub namespace_id: NamespaceId,
	pub schema_id: SchemaId,
	pub instance_id: InstanceId,
	pub parameter_id: ResourceId,
}

/// Path of a group or parameter, before it is known which of the two the
/// final id designates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupOrParameterPath {
	pub namespace_id: NamespaceId,
	pub schema_id: SchemaId,
	pub instance_id: InstanceId,
	pub resource_id: ResourceId,
}

/// A path of any type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Path {
	Namespace(NamespacePath),
	Schema(SchemaPath),
	Instance(InstancePath),
	Group(GroupPath),
	Parameter(ParameterPath),
	GroupOrParameter(GroupOrParameterPath),
}

impl NamespacePath {
	pub fn resolve<'r>(&self, registry: &'r Registry) -> Result<&'r Namespace, Error> {
		registry.namespace(self.namespace_id)
	}
}

impl SchemaPath {
	pub fn resolve<'r>(&self, registry: &'r Registry) -> Result<(&'r Namespace, &'r Schema), Error> {
		let namespace = registry.namespace(self.namespace_id)?;
		let schema = namespace.schema(self.schema_id).ok_or(Error::NotFound)?;
		Ok((namespace, schema))
	}
}

impl InstancePath {
	pub fn resolve<'r>(
		&self,
		registry: &'r Registry,
	) -> Result<(&'r Namespace, &'r Schema, &'r Instance), Error> {
		let (namespace, schema) = self.schema_path().resolve(registry)?;
		let instance = schema.instance(self.instance_id).ok_or(Error::NotFound)?;
		Ok((namespace, schema, instance))
	}

	pub fn schema_path(&self) -> SchemaPath {
		SchemaPath {
			namespace_id: self.namespace_id,
			schema_id: self.schema_id,
		}
	}

	/// The path of `parameter` on this instance
	pub fn parameter(&self, parameter: ResourceId) -> ParameterPath {
		ParameterPath {
			namespace_id: self.namespace_id,
			schema_id: self.schema_id,
			instance_id: self.instance_id,
			parameter_id: parameter,
		}
	}
}

impl GroupPath {
	pub fn resolve<'r>(
		&self,
		registry: &'r Registry,
	) -> Result<(&'r Namespace, &'r Schema, &'r Instance, &'r Group), Error> {
		let (namespace, schema, instance) = self.instance_path().resolve(registry)?;
		let group = schema.group(self.group_id).ok_or(Error::NotFound)?;
		Ok((namespace, schema, instance, group))
	}

	pub fn instance_path(&self) -> InstancePath {
		InstancePath {
			namespace_id: self.namespace_id,
			schema_id: self.schema_id,
			instance_id: self.instance_id,
		}
	}
}

impl ParameterPath {
	pub fn resolve<'r>(
		&self,
		registry: &'r Registry,
	) -> Result<(&'r Namespace, &'r Schema, &'r Instance, &'r Parameter), Error> {
		let (namespace, schema, instance) = self.instance_path().resolve(registry)?;
		let parameter = schema.parameter(self.parameter_id).ok_or(Error::NotFound)?;
		Ok((namespace, schema, instance, parameter))
	}

	pub fn instance_path(&self) -> InstancePath {
		InstancePath {
			namespace_id: self.namespace_id,
			schema_id: self.schema_id,
			instance_id: self.instance_id,
		}
	}
}

impl GroupOrParameterPath {
	pub fn resolve<'r>(
		&self,
		registry: &'r Registry,
	) -> Result<(&'r Namespace, &'r Schema, &'r Instance, GroupOrParameter<'r>), Error> {
		let (namespace, schema, instance) = self.instance_path().resolve(registry)?;
		if let Some(parameter) = schema.parameter(self.resource_id) {
			return Ok((
				namespace,
				schema,
				instance,
				GroupOrParameter::Parameter(parameter),
			));
		}
		if let Some(group) = schema.group(self.resource_id) {
			return Ok((namespace, schema, instance, GroupOrParameter::Group(group)));
		}
		Err(Error::NotFound)
	}

	pub fn instance_path(&self) -> InstancePath {
		InstancePath {
			namespace_id: self.namespace_id,
			schema_id: self.schema_id,
			instance_id: self.instance_id,
		}
	}
}

impl std::fmt::Display for NamespacePath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.namespace_id)
	}
}

impl std::fmt::Display for SchemaPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.namespace_id, self.schema_id)
	}
}

impl std::fmt::Display for InstancePath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{}/{}/{}",
			self.namespace_id, self.schema_id, self.instance_id
		)
	}
}

impl std::fmt::Display for GroupPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.instance_path(), self.group_id)
	}
}

impl std::fmt::Display for ParameterPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.instance_path(), self.parameter_id)
	}
}

impl std::fmt::Display for GroupOrParameterPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.instance_path(), self.resource_id)
	}
}

impl std::fmt::Display for Path {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Path::Namespace(path) => std::fmt::Display::fmt(path, f),
			Path::Schema(path) => std::fmt::Display::fmt(path, f),
			Path::Instance(path) => std::fmt::Display::fmt(path, f),
			Path::Group(path) => std::fmt::Display::fmt(path, f),
			Path::Parameter(path) => std::fmt::Display::fmt(path, f),
			Path::GroupOrParameter(path) => std::fmt::Display::fmt(path, f),
		}
	}
}

fn parse_segments<const N: usize>(s: &str) -> Result<[u32; N], Error> {
	let s = s.strip_prefix('/').unwrap_or(s);
	let mut out = [0u32; N];
	let mut segments = s.split('/');
	for slot in &mut out {
		*slot = segments
			.next()
			.and_then(|segment| segment.parse().ok())
			.ok_or(Error::Invalid)?;
	}
	if segments.next().is_some() {
		return Err(Error::Invalid);
	}
	Ok(out)
}

impl std::str::FromStr for ParameterPath {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let [namespace_id, schema_id, instance_id, parameter_id] = parse_segments(s)?;
		Ok(Self {
			namespace_id: NamespaceId(namespace_id),
			schema_id: SchemaId(schema_id),
			instance_id: InstanceId(instance_id),
			parameter_id: ResourceId(parameter_id),
		})
	}
}

impl std::str::FromStr for Path {
	type Err = Error;

	/// Parses `a[/b[/c[/d]]]`, with the path type given by the number of
	/// segments; a fourth id always parses as group-or-parameter since the
	/// two share one id space
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.strip_prefix('/').unwrap_or(s);
		Ok(match trimmed.split('/').count() {
			1 => {
				let [namespace_id] = parse_segments(trimmed)?;
				Path::Namespace(NamespacePath {
					namespace_id: NamespaceId(namespace_id),
				})
			}
			2 => {
				let [namespace_id, schema_id] = parse_segments(trimmed)?;
				Path::Schema(SchemaPath {
					namespace_id: NamespaceId(namespace_id),
					schema_id: SchemaId(schema_id),
				})
			}
			3 => {
				let [namespace_id, schema_id, instance_id] = parse_segments(trimmed)?;
				Path::Instance(InstancePath {
					namespace_id: NamespaceId(namespace_id),
					schema_id: SchemaId(schema_id),
					instance_id: InstanceId(instance_id),
				})
			}
			4 => {
				let [namespace_id, schema_id, instance_id, resource_id] = parse_segments(trimmed)?;
				Path::GroupOrParameter(GroupOrParameterPath {
					namespace_id: NamespaceId(namespace_id),
					schema_id: SchemaId(schema_id),
					instance_id: InstanceId(instance_id),
					resource_id: ResourceId(resource_id),
				})
			}
			_ => return Err(Error::Invalid),
		})
	}
}
