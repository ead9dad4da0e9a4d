//! # Getting started
//!
//! A registry decouples who *owns* a configuration value (a driver's data
//! struct) from who reads, writes and persists it (shell, storage, remote
//! management). Drivers declare a [`Schema`] describing their parameters
//! and implement a [`Mapping`](schema::Mapping) that resolves parameter
//! ids to the byte windows backing them; everything else goes through the
//! uniform [`Registry`] interface:
//!
//! ```
//! use std::any::Any;
//!
//! use confreg::{
//! 	constraint::Constraints,
//! 	path::SchemaPath,
//! 	schema::{Instance, Mapping, Namespace, Parameter, ResourceId, Schema, SchemaId},
//! 	Registry,
//! };
//!
//! struct BoardLed {
//! 	// boolean parameters are backed by a u8 holding 0 or 1
//! 	enabled: u8,
//! }
//!
//! struct BoardLedMapping;
//!
//! impl Mapping for BoardLedMapping {
//! 	fn window<'a>(&self, parameter: ResourceId, data: &'a dyn Any) -> Option<&'a [u8]> {
//! 		let led = data.downcast_ref::<BoardLed>()?;
//! 		match parameter {
//! 			ResourceId(0) => Some(bytemuck::bytes_of(&led.enabled)),
//! 			_ => None,
//! 		}
//! 	}
//!
//! 	fn window_mut<'a>(
//! 		&self,
//! 		parameter: ResourceId,
//! 		data: &'a mut dyn Any,
//! 	) -> Option<&'a mut [u8]> {
//! 		let led = data.downcast_mut::<BoardLed>()?;
//! 		match parameter {
//! 			ResourceId(0) => Some(bytemuck::bytes_of_mut(&mut led.enabled)),
//! 			_ => None,
//! 		}
//! 	}
//! }
//!
//! let mut registry = Registry::new();
//! let schema = Schema::new(
//! 	SchemaId(0),
//! 	"board-led",
//! 	"Enable or disable the board LED",
//! 	BoardLedMapping,
//! 	vec![],
//! 	vec![Parameter::new(ResourceId(0), "enabled", "LED on?", Constraints::bool())],
//! );
//! registry.register_namespace(Namespace::new("sys", "Board configuration", vec![schema]))?;
//!
//! let led = registry.add_schema_instance(
//! 	SchemaPath { namespace_id: confreg::schema::NamespaceId(0), schema_id: SchemaId(0) },
//! 	Instance::new(BoardLed { enabled: 0 }).with_name("led-0"),
//! )?;
//!
//! registry.set(led, ResourceId(0), &[1])?;
//! assert_eq!(registry.get(led, ResourceId(0))?.bytes, &[1][..]);
//! assert_eq!(registry.get(led, ResourceId(0))?.to_str()?, "1");
//! # Ok::<(), confreg::Error>(())
//! ```
//!
//! Writes are staged: [`set`](Registry::set) validates and copies bytes but
//! has no side effect on the hardware. Drivers attach a
//! [`CommitHandler`](schema::CommitHandler) to their instances and apply
//! staged values when one of the `commit_*` entry points fires.
//!
//! # Persistence
//!
//! The [`storage`] module adds any number of load [sources and one save
//! destination](storage::Storage); `save_*` reuses the [export
//! traversal](Registry::export), so persistence follows exactly the same
//! tree-walk rules as every other introspection.
//!
//! # Paths
//!
//! Two independent encodings address the same graph: compact integer
//! tuples ([`path`]) and human-readable slash paths
//! ([by name](Registry::from_parameter_string_path)). The [`cli`] module
//! (feature `cli`, enabled by default) exposes both through a
//! shell-friendly `registry` command.

#[cfg(feature = "cli")]
pub mod cli;
pub mod constraint;
mod error;
pub mod path;
pub mod registry;
pub mod schema;
pub mod storage;
mod string_path;
pub mod value;

pub use {
	error::Error,
	registry::{ExportCallback, ExportData, Registry},
	schema::{Group, Instance, Namespace, Parameter, Schema},
	value::{Type, Value},
};
