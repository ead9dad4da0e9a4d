//! The `registry` shell command
//!
//! One entry point, [`execute`], drives a single invocation of the command
//! against a registry, so that it can be wired into whatever shell or
//! argv-style dispatcher the surrounding firmware uses:
//!
//! ```text
//! registry get <path>
//! registry set <path> <value>
//! registry commit <path>
//! registry export [path] [-r <depth>]
//! registry load
//! registry save [path]
//! ```
//!
//! Paths are accepted in both encodings: a path whose first segment is
//! numeric is an integer path (`0/0/0/2`), anything else is a string path
//! (`/sys/rgb-led/led-0/red`). The number of segments picks the level; a
//! fourth-level id resolves as group-or-parameter. `export` prints one
//! `(id name)` line per visited node, indented per level.

use std::io::Write;

use clap::Parser;

use crate::{
	error::Error,
	path::{InstancePath, Path},
	registry::{ExportData, Registry},
	schema::{GroupOrParameter, NamespaceId, ResourceId},
	value::parse_value,
};

#[derive(Parser)]
#[command(name = "registry", about = "Access runtime configurations")]
struct RegistryCli {
	#[command(subcommand)]
	command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
	/// Print the current value of a parameter
	Get { path: String },
	/// Parse a value string and stage it into a parameter
	Set { path: String, value: String },
	/// Fire the commit handlers for everything under a path
	Commit { path: String },
	/// Pretty-print the configuration tree
	Export {
		path: Option<String>,
		/// Levels to descend; 0 means unlimited
		#[arg(short = 'r', long = "recursion-depth", default_value_t = 0)]
		depth: u8,
	},
	/// Restore persisted values from all storage sources
	Load,
	/// Persist everything under a path to the destination storage
	Save { path: Option<String> },
}

/// The level and ids a shell path resolved to
#[derive(Clone, Copy)]
enum Target {
	Namespace(NamespaceId),
	Schema(crate::path::SchemaPath),
	Instance(InstancePath),
	Group(InstancePath, ResourceId),
	Parameter(InstancePath, ResourceId),
}

/// Run one `registry` invocation
///
/// `args` are the arguments after the command name itself. Output (and
/// error reporting) goes to `out`; the return value is the process-style
/// exit code: 0 on success, 1 on any error.
pub fn execute(registry: &mut Registry, args: &[&str], out: &mut dyn Write) -> i32 {
	let cli = match RegistryCli::try_parse_from(std::iter::once("registry").chain(args.iter().copied()))
	{
		Ok(cli) => cli,
		Err(error) => {
			let _ = writeln!(out, "{error}");
			return 1;
		}
	};
	match run(registry, cli.command, out) {
		Ok(()) => 0,
		Err(error) => {
			let _ = writeln!(out, "error: {error}");
			1
		}
	}
}

fn run(registry: &mut Registry, command: Command, out: &mut dyn Write) -> Result<(), Error> {
	match command {
		Command::Get { path } => {
			let (instance, parameter) = resolve_parameter(registry, &path)?;
			let text = registry.get(instance, parameter)?.to_str()?;
			writeln!(out, "{text}")?;
			Ok(())
		}
		Command::Set { path, value } => {
			let (instance, parameter) = resolve_parameter(registry, &path)?;
			let current = registry.get(instance, parameter)?;
			let (type_, capacity) = (current.type_, current.bytes.len());
			let mut staged = vec![0u8; capacity];
			let written = parse_value(type_, &value, &mut staged)?;
			registry.set(instance, parameter, &staged[..written])
		}
		Command::Commit { path } => match resolve_target(registry, &path)? {
			Target::Namespace(namespace) => registry.commit_namespace(namespace),
			Target::Schema(schema) => registry.commit_schema(schema),
			Target::Instance(instance) => registry.commit_instance(instance),
			Target::Group(instance, group) => registry.commit_group(instance, group),
			Target::Parameter(instance, parameter) => {
				registry.commit_parameter(instance, parameter)
			}
		},
		Command::Export { path, depth } => {
			let mut print = |data: &ExportData<'_>| print_node(data, out);
			match path {
				None => registry.export(&mut print, depth),
				Some(path) => match resolve_target(registry, &path)? {
					Target::Namespace(namespace) => {
						let namespace = registry.namespace(namespace)?;
						registry.export_namespace(namespace, &mut print, depth)
					}
					Target::Schema(schema) => {
						let (_, schema) = schema.resolve(registry)?;
						registry.export_schema(schema, &mut print, depth)
					}
					Target::Instance(instance) => {
						let (_, _, instance) = instance.resolve(registry)?;
						registry.export_instance(instance, &mut print, depth)
					}
					Target::Group(instance, group) => {
						let (_, schema, instance) = instance.resolve(registry)?;
						let group = schema.group(group).ok_or(Error::NotFound)?;
						registry.export_group(instance, group, &mut print, depth)
					}
					Target::Parameter(instance, parameter) => {
						let (_, schema, instance) = instance.resolve(registry)?;
						let parameter = schema.parameter(parameter).ok_or(Error::NotFound)?;
						registry.export_parameter(instance, parameter, &mut print)
					}
				},
			}
		}
		Command::Load => registry.load(),
		Command::Save { path } => match path {
			None => registry.save(),
			Some(path) => match resolve_target(registry, &path)? {
				Target::Namespace(namespace) => registry.save_namespace(namespace),
				Target::Schema(schema) => registry.save_schema(schema),
				Target::Instance(instance) => registry.save_instance(instance),
				Target::Group(instance, group) => registry.save_group(instance, group),
				Target::Parameter(instance, parameter) => {
					registry.save_parameter(instance, parameter)
				}
			},
		},
	}
}

fn print_node(data: &ExportData<'_>, out: &mut dyn Write) -> Result<(), Error> {
	let (level, id, name): (usize, u32, &str) = match data {
		ExportData::Namespace(namespace) => (0, namespace.id().0, namespace.name()),
		ExportData::Schema(schema) => (1, schema.id().0, schema.name()),
		ExportData::Instance(instance) => (2, instance.id().0, instance.name().unwrap_or("")),
		ExportData::Group(group) => (3, group.id().0, group.name()),
		ExportData::Parameter { parameter, .. } => (4, parameter.id().0, parameter.name()),
	};
	writeln!(out, "{:indent$}({id} {name})", "", indent = level * 2)?;
	Ok(())
}

fn resolve_parameter(registry: &Registry, path: &str) -> Result<(InstancePath, ResourceId), Error> {
	match resolve_target(registry, path)? {
		Target::Parameter(instance, parameter) => Ok((instance, parameter)),
		Target::Group(..) => Err(Error::GroupIsNotAParameter),
		_ => Err(Error::Invalid),
	}
}

fn resolve_target(registry: &Registry, path: &str) -> Result<Target, Error> {
	let trimmed = path.strip_prefix('/').unwrap_or(path);
	let numeric = trimmed
		.split('/')
		.next()
		.is_some_and(|first| !first.is_empty() && first.bytes().all(|b| b.is_ascii_digit()));
	if numeric {
		resolve_int_target(registry, trimmed)
	} else {
		resolve_string_target(registry, path)
	}
}

fn resolve_int_target(registry: &Registry, path: &str) -> Result<Target, Error> {
	Ok(match path.parse::<Path>()? {
		Path::Namespace(path) => {
			path.resolve(registry)?;
			Target::Namespace(path.namespace_id)
		}
		Path::Schema(path) => {
			path.resolve(registry)?;
			Target::Schema(path)
		}
		Path::Instance(path) => {
			path.resolve(registry)?;
			Target::Instance(path)
		}
		Path::GroupOrParameter(path) => match path.resolve(registry)?.3 {
			GroupOrParameter::Group(group) => Target::Group(path.instance_path(), group.id()),
			GroupOrParameter::Parameter(parameter) => {
				Target::Parameter(path.instance_path(), parameter.id())
			}
		},
		Path::Group(path) => {
			path.resolve(registry)?;
			Target::Group(path.instance_path(), path.group_id)
		}
		Path::Parameter(path) => {
			path.resolve(registry)?;
			Target::Parameter(path.instance_path(), path.parameter_id)
		}
	})
}

fn resolve_string_target(registry: &Registry, path: &str) -> Result<Target, Error> {
	let levels = path
		.strip_prefix('/')
		.ok_or(Error::Invalid)?
		.split('/')
		.count();
	Ok(match levels {
		1 => Target::Namespace(registry.from_namespace_string_path(path)?.id()),
		2 => {
			let (_, schema) = registry.from_schema_string_path(path)?;
			Target::Schema(schema.path())
		}
		3 => {
			let (_, _, instance) = registry.from_instance_string_path(path)?;
			Target::Instance(instance.path())
		}
		_ => {
			let (_, _, instance, found) = registry.from_group_or_parameter_string_path(path)?;
			match found {
				GroupOrParameter::Group(group) => Target::Group(instance.path(), group.id()),
				GroupOrParameter::Parameter(parameter) => {
					Target::Parameter(instance.path(), parameter.id())
				}
			}
		}
	})
}
