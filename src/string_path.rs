//! Slash-delimited, human-readable path encoding
//!
//! `/{namespace}/{schema}/{instance}/{group...}/{parameter}`: by-name
//! lookups over the same graph primitives the integer paths use. Names are
//! unique within any one parent, which registration enforces. An instance
//! without a name cannot be addressed this way.

use crate::{
	error::Error,
	registry::Registry,
	schema::{Group, GroupOrParameter, Instance, Namespace, Parameter, Schema},
};

impl Registry {
	/// `/{namespace}`
	pub fn namespace_string_path(&self, namespace: &Namespace) -> String {
		format!("/{}", namespace.name())
	}

	/// `/{namespace}/{schema}`
	pub fn schema_string_path(&self, schema: &Schema) -> Result<String, Error> {
		let namespace = self.namespace(schema.namespace_id())?;
		Ok(format!("/{}/{}", namespace.name(), schema.name()))
	}

	/// `/{namespace}/{schema}/{instance}`
	pub fn instance_string_path(&self, instance: &Instance) -> Result<String, Error> {
		let (_, schema, _) = instance.path().resolve(self)?;
		let namespace = self.namespace(schema.namespace_id())?;
		let name = instance.name().ok_or(Error::NotFound)?;
		Ok(format!("/{}/{}/{}", namespace.name(), schema.name(), name))
	}

	/// `/{namespace}/{schema}/{instance}/{group...}`
	pub fn group_string_path(&self, instance: &Instance, group: &Group) -> Result<String, Error> {
		let mut path = self.instance_string_path(instance)?;
		let schema = self.schema_of(instance)?;
		let mut trail = Vec::new();
		if !group_trail(schema.groups(), group, &mut trail) {
			return Err(Error::NotFound);
		}
		for name in trail {
			path.push('/');
			path.push_str(name);
		}
		Ok(path)
	}

	/// `/{namespace}/{schema}/{instance}/{group...}/{parameter}`
	pub fn parameter_string_path(
		&self,
		instance: &Instance,
		parameter: &Parameter,
	) -> Result<String, Error> {
		let mut path = self.instance_string_path(instance)?;
		let schema = self.schema_of(instance)?;
		let mut trail = Vec::new();
		if !parameter_trail(schema.groups(), schema.parameters(), parameter, &mut trail) {
			return Err(Error::NotFound);
		}
		for name in trail {
			path.push('/');
			path.push_str(name);
		}
		Ok(path)
	}

	/// Resolve `/{namespace}`
	pub fn from_namespace_string_path(&self, path: &str) -> Result<&Namespace, Error> {
		let mut segments = segments(path)?;
		let namespace = self.segment_namespace(&mut segments)?;
		end(segments)?;
		Ok(namespace)
	}

	/// Resolve `/{namespace}/{schema}`
	pub fn from_schema_string_path(&self, path: &str) -> Result<(&Namespace, &Schema), Error> {
		let mut segments = segments(path)?;
		let namespace = self.segment_namespace(&mut segments)?;
		let schema = segment_schema(namespace, &mut segments)?;
		end(segments)?;
		Ok((namespace, schema))
	}

	/// Resolve `/{namespace}/{schema}/{instance}`
	pub fn from_instance_string_path(
		&self,
		path: &str,
	) -> Result<(&Namespace, &Schema, &Instance), Error> {
		let mut segments = segments(path)?;
		let namespace = self.segment_namespace(&mut segments)?;
		let schema = segment_schema(namespace, &mut segments)?;
		let instance = segment_instance(schema, &mut segments)?;
		end(segments)?;
		Ok((namespace, schema, instance))
	}

	/// Resolve `/{namespace}/{schema}/{instance}/{group...}`
	pub fn from_group_string_path(
		&self,
		path: &str,
	) -> Result<(&Namespace, &Schema, &Instance, &Group), Error> {
		let (namespace, schema, instance, found) = self.from_group_or_parameter_string_path(path)?;
		match found {
			GroupOrParameter::Group(group) => Ok((namespace, schema, instance, group)),
			GroupOrParameter::Parameter(_) => Err(Error::NotFound),
		}
	}

	/// Resolve `/{namespace}/{schema}/{instance}/{group...}/{parameter}`
	///
	/// Fails with [`Error::GroupIsNotAParameter`] if the path designates a
	/// group.
	pub fn from_parameter_string_path(
		&self,
		path: &str,
	) -> Result<(&Namespace, &Schema, &Instance, &Parameter), Error> {
		let (namespace, schema, instance, found) = self.from_group_or_parameter_string_path(path)?;
		match found {
			GroupOrParameter::Parameter(parameter) => Ok((namespace, schema, instance, parameter)),
			GroupOrParameter::Group(_) => Err(Error::GroupIsNotAParameter),
		}
	}

	/// Resolve a path whose final segment may name either a group or a
	/// parameter
	pub fn from_group_or_parameter_string_path(
		&self,
		path: &str,
	) -> Result<(&Namespace, &Schema, &Instance, GroupOrParameter<'_>), Error> {
		let mut segments = segments(path)?;
		let namespace = self.segment_namespace(&mut segments)?;
		let schema = segment_schema(namespace, &mut segments)?;
		let instance = segment_instance(schema, &mut segments)?;
		let rest: Vec<&str> = segments.collect();
		let found = descend(schema, &rest)?;
		Ok((namespace, schema, instance, found))
	}

	fn segment_namespace<'r, 's>(
		&'r self,
		segments: &mut impl Iterator<Item = &'s str>,
	) -> Result<&'r Namespace, Error> {
		let name = segments.next().ok_or(Error::Invalid)?;
		self.namespace_by_name(name)
	}
}

fn segments(path: &str) -> Result<std::str::Split<'_, char>, Error> {
	let path = path.strip_prefix('/').ok_or(Error::Invalid)?;
	if path.is_empty() {
		return Err(Error::Invalid);
	}
	Ok(path.split('/'))
}

fn end<'s>(mut segments: impl Iterator<Item = &'s str>) -> Result<(), Error> {
	match segments.next() {
		None => Ok(()),
		Some(_) => Err(Error::Invalid),
	}
}

fn segment_schema<'r, 's>(
	namespace: &'r Namespace,
	segments: &mut impl Iterator<Item = &'s str>,
) -> Result<&'r Schema, Error> {
	let name = segments.next().ok_or(Error::Invalid)?;
	namespace.schema_by_name(name).ok_or(Error::NotFound)
}

fn segment_instance<'r, 's>(
	schema: &'r Schema,
	segments: &mut impl Iterator<Item = &'s str>,
) -> Result<&'r Instance, Error> {
	let name = segments.next().ok_or(Error::Invalid)?;
	schema.instance_by_name(name).ok_or(Error::NotFound)
}

/// Walk group names down the tree; the final segment resolves as a
/// parameter first, then as a group
fn descend<'a>(schema: &'a Schema, names: &[&str]) -> Result<GroupOrParameter<'a>, Error> {
	let (last, dirs) = names.split_last().ok_or(Error::Invalid)?;
	let mut groups = schema.groups();
	let mut parameters = schema.parameters();
	for dir in dirs {
		let group = groups
			.iter()
			.find(|group| group.name() == *dir)
			.ok_or(Error::NotFound)?;
		groups = group.groups();
		parameters = group.parameters();
	}
	if let Some(parameter) = parameters.iter().find(|parameter| parameter.name() == *last) {
		return Ok(GroupOrParameter::Parameter(parameter));
	}
	if let Some(group) = groups.iter().find(|group| group.name() == *last) {
		return Ok(GroupOrParameter::Group(group));
	}
	Err(Error::NotFound)
}

fn group_trail<'a>(groups: &'a [Group], target: &Group, trail: &mut Vec<&'a str>) -> bool {
	for group in groups {
		trail.push(group.name());
		if std::ptr::eq(group, target) {
			return true;
		}
		if group_trail(group.groups(), target, trail) {
			return true;
		}
		trail.pop();
	}
	false
}

fn parameter_trail<'a>(
	groups: &'a [Group],
	parameters: &'a [Parameter],
	target: &Parameter,
	trail: &mut Vec<&'a str>,
) -> bool {
	if let Some(parameter) = parameters.iter().find(|parameter| std::ptr::eq(*parameter, target)) {
		trail.push(parameter.name());
		return true;
	}
	for group in groups {
		trail.push(group.name());
		if parameter_trail(group.groups(), group.parameters(), target, trail) {
			return true;
		}
		trail.pop();
	}
	false
}
