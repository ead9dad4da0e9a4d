//! Fixture schemas shared by the integration tests
#![allow(dead_code)] // not every test exercises every fixture

use std::{any::Any, cell::RefCell, rc::Rc};

use confreg::{
	constraint::{BytesConstraints, Constraints, NumericConstraints, StringConstraints},
	path::{InstancePath, SchemaPath},
	schema::{
		CommitHandler, CommitScope, Group, Instance, Mapping, Namespace, NamespaceId, Parameter,
		ResourceId, Schema, SchemaId,
	},
	Registry,
};

pub const TESTS: NamespaceId = NamespaceId(0);
pub const NESTED: SchemaPath = SchemaPath {
	namespace_id: TESTS,
	schema_id: SchemaId(0),
};
pub const CONSTRAINED: SchemaPath = SchemaPath {
	namespace_id: TESTS,
	schema_id: SchemaId(1),
};
pub const FULL: SchemaPath = SchemaPath {
	namespace_id: TESTS,
	schema_id: SchemaId(2),
};

/* nested: one top-level parameter plus one group holding one parameter */

pub const NESTED_PARAMETER: ResourceId = ResourceId(0);
pub const NESTED_GROUP: ResourceId = ResourceId(1);
pub const NESTED_GROUP_PARAMETER: ResourceId = ResourceId(2);

pub struct NestedData {
	pub parameter: u8,
	pub group_parameter: u8,
}

impl Default for NestedData {
	fn default() -> Self {
		Self {
			parameter: 9,
			group_parameter: 5,
		}
	}
}

struct NestedMapping;

impl Mapping for NestedMapping {
	fn window<'a>(&self, parameter: ResourceId, data: &'a dyn Any) -> Option<&'a [u8]> {
		let data = data.downcast_ref::<NestedData>()?;
		match parameter {
			NESTED_PARAMETER => Some(bytemuck::bytes_of(&data.parameter)),
			NESTED_GROUP_PARAMETER => Some(bytemuck::bytes_of(&data.group_parameter)),
			_ => None,
		}
	}

	fn window_mut<'a>(
		&self,
		parameter: ResourceId,
		data: &'a mut dyn Any,
	) -> Option<&'a mut [u8]> {
		let data = data.downcast_mut::<NestedData>()?;
		match parameter {
			NESTED_PARAMETER => Some(bytemuck::bytes_of_mut(&mut data.parameter)),
			NESTED_GROUP_PARAMETER => Some(bytemuck::bytes_of_mut(&mut data.group_parameter)),
			_ => None,
		}
	}
}

pub fn nested_schema() -> Schema {
	Schema::new(
		NESTED.schema_id,
		"nested",
		"Schema with one level of nesting",
		NestedMapping,
		vec![Group::new(
			NESTED_GROUP,
			"group",
			"",
			vec![],
			vec![Parameter::new(
				NESTED_GROUP_PARAMETER,
				"parameter",
				"",
				Constraints::u8(),
			)],
		)],
		vec![Parameter::new(
			NESTED_PARAMETER,
			"parameter",
			"",
			Constraints::u8(),
		)],
	)
}

/* constrained: every constraint class on a small set of parameters */

pub const CONSTRAINED_LEVEL: ResourceId = ResourceId(0);
pub const CONSTRAINED_MODE: ResourceId = ResourceId(1);
pub const CONSTRAINED_CHANNEL: ResourceId = ResourceId(2);
pub const CONSTRAINED_KEY: ResourceId = ResourceId(3);

pub struct ConstrainedData {
	pub level: u8,
	pub mode: [u8; 16],
	pub channel: u8,
	pub key: [u8; 4],
}

impl Default for ConstrainedData {
	fn default() -> Self {
		Self {
			level: 10,
			mode: *b"on\0\0\0\0\0\0\0\0\0\0\0\0\0\0",
			channel: 1,
			key: [1, 2, 3, 4],
		}
	}
}

struct ConstrainedMapping;

impl Mapping for ConstrainedMapping {
	fn window<'a>(&self, parameter: ResourceId, data: &'a dyn Any) -> Option<&'a [u8]> {
		let data = data.downcast_ref::<ConstrainedData>()?;
		match parameter {
			CONSTRAINED_LEVEL => Some(bytemuck::bytes_of(&data.level)),
			CONSTRAINED_MODE => Some(&data.mode),
			CONSTRAINED_CHANNEL => Some(bytemuck::bytes_of(&data.channel)),
			CONSTRAINED_KEY => Some(&data.key),
			_ => None,
		}
	}

	fn window_mut<'a>(
		&self,
		parameter: ResourceId,
		data: &'a mut dyn Any,
	) -> Option<&'a mut [u8]> {
		let data = data.downcast_mut::<ConstrainedData>()?;
		match parameter {
			CONSTRAINED_LEVEL => Some(bytemuck::bytes_of_mut(&mut data.level)),
			CONSTRAINED_MODE => Some(&mut data.mode),
			CONSTRAINED_CHANNEL => Some(bytemuck::bytes_of_mut(&mut data.channel)),
			CONSTRAINED_KEY => Some(&mut data.key),
			_ => None,
		}
	}
}

pub fn constrained_schema() -> Schema {
	Schema::new(
		CONSTRAINED.schema_id,
		"constrained",
		"Schema exercising every constraint class",
		ConstrainedMapping,
		vec![],
		vec![
			Parameter::new(
				CONSTRAINED_LEVEL,
				"level",
				"",
				Constraints::U8(NumericConstraints {
					min: Some(7),
					max: Some(18),
					..Default::default()
				}),
			),
			Parameter::new(
				CONSTRAINED_MODE,
				"mode",
				"",
				Constraints::String(StringConstraints {
					allowed: vec!["on".to_owned(), "off".to_owned()],
					..Default::default()
				}),
			),
			Parameter::new(
				CONSTRAINED_CHANNEL,
				"channel",
				"",
				Constraints::U8(NumericConstraints {
					forbidden: vec![13],
					..Default::default()
				}),
			),
			Parameter::new(
				CONSTRAINED_KEY,
				"key",
				"",
				Constraints::Opaque(BytesConstraints {
					allowed: vec![vec![1, 2, 3, 4], vec![4, 3, 2, 1]],
					..Default::default()
				}),
			),
		],
	)
}

/* full: one parameter of every primitive type */

pub const FULL_OPAQUE: ResourceId = ResourceId(0);
pub const FULL_STRING: ResourceId = ResourceId(1);
pub const FULL_BOOLEAN: ResourceId = ResourceId(2);
pub const FULL_U8: ResourceId = ResourceId(3);
pub const FULL_U16: ResourceId = ResourceId(4);
pub const FULL_U32: ResourceId = ResourceId(5);
#[cfg(feature = "uint64")]
pub const FULL_U64: ResourceId = ResourceId(6);
pub const FULL_I8: ResourceId = ResourceId(7);
pub const FULL_I16: ResourceId = ResourceId(8);
pub const FULL_I32: ResourceId = ResourceId(9);
#[cfg(feature = "int64")]
pub const FULL_I64: ResourceId = ResourceId(10);
#[cfg(feature = "float32")]
pub const FULL_F32: ResourceId = ResourceId(11);
#[cfg(feature = "float64")]
pub const FULL_F64: ResourceId = ResourceId(12);

#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct FullOpaque {
	pub value: u8,
}

pub struct FullData {
	pub opaque: FullOpaque,
	pub string: [u8; 50],
	pub boolean: u8,
	pub u8_value: u8,
	pub u16_value: u16,
	pub u32_value: u32,
	#[cfg(feature = "uint64")]
	pub u64_value: u64,
	pub i8_value: i8,
	pub i16_value: i16,
	pub i32_value: i32,
	#[cfg(feature = "int64")]
	pub i64_value: i64,
	#[cfg(feature = "float32")]
	pub f32_value: f32,
	#[cfg(feature = "float64")]
	pub f64_value: f64,
}

impl Default for FullData {
	fn default() -> Self {
		Self {
			opaque: FullOpaque { value: 0 },
			string: [0; 50],
			boolean: 0,
			u8_value: 0,
			u16_value: 0,
			u32_value: 0,
			#[cfg(feature = "uint64")]
			u64_value: 0,
			i8_value: 0,
			i16_value: 0,
			i32_value: 0,
			#[cfg(feature = "int64")]
			i64_value: 0,
			#[cfg(feature = "float32")]
			f32_value: 0.0,
			#[cfg(feature = "float64")]
			f64_value: 0.0,
		}
	}
}

struct FullMapping;

impl Mapping for FullMapping {
	fn window<'a>(&self, parameter: ResourceId, data: &'a dyn Any) -> Option<&'a [u8]> {
		let data = data.downcast_ref::<FullData>()?;
		match parameter {
			FULL_OPAQUE => Some(bytemuck::bytes_of(&data.opaque)),
			FULL_STRING => Some(&data.string),
			FULL_BOOLEAN => Some(bytemuck::bytes_of(&data.boolean)),
			FULL_U8 => Some(bytemuck::bytes_of(&data.u8_value)),
			FULL_U16 => Some(bytemuck::bytes_of(&data.u16_value)),
			FULL_U32 => Some(bytemuck::bytes_of(&data.u32_value)),
			#[cfg(feature = "uint64")]
			FULL_U64 => Some(bytemuck::bytes_of(&data.u64_value)),
			FULL_I8 => Some(bytemuck::bytes_of(&data.i8_value)),
			FULL_I16 => Some(bytemuck::bytes_of(&data.i16_value)),
			FULL_I32 => Some(bytemuck::bytes_of(&data.i32_value)),
			#[cfg(feature = "int64")]
			FULL_I64 => Some(bytemuck::bytes_of(&data.i64_value)),
			#[cfg(feature = "float32")]
			FULL_F32 => Some(bytemuck::bytes_of(&data.f32_value)),
			#[cfg(feature = "float64")]
			FULL_F64 => Some(bytemuck::bytes_of(&data.f64_value)),
			_ => None,
		}
	}

	fn window_mut<'a>(
		&self,
		parameter: ResourceId,
		data: &'a mut dyn Any,
	) -> Option<&'a mut [u8]> {
		let data = data.downcast_mut::<FullData>()?;
		match parameter {
			FULL_OPAQUE => Some(bytemuck::bytes_of_mut(&mut data.opaque)),
			FULL_STRING => Some(&mut data.string),
			FULL_BOOLEAN => Some(bytemuck::bytes_of_mut(&mut data.boolean)),
			FULL_U8 => Some(bytemuck::bytes_of_mut(&mut data.u8_value)),
			FULL_U16 => Some(bytemuck::bytes_of_mut(&mut data.u16_value)),
			FULL_U32 => Some(bytemuck::bytes_of_mut(&mut data.u32_value)),
			#[cfg(feature = "uint64")]
			FULL_U64 => Some(bytemuck::bytes_of_mut(&mut data.u64_value)),
			FULL_I8 => Some(bytemuck::bytes_of_mut(&mut data.i8_value)),
			FULL_I16 => Some(bytemuck::bytes_of_mut(&mut data.i16_value)),
			FULL_I32 => Some(bytemuck::bytes_of_mut(&mut data.i32_value)),
			#[cfg(feature = "int64")]
			FULL_I64 => Some(bytemuck::bytes_of_mut(&mut data.i64_value)),
			#[cfg(feature = "float32")]
			FULL_F32 => Some(bytemuck::bytes_of_mut(&mut data.f32_value)),
			#[cfg(feature = "float64")]
			FULL_F64 => Some(bytemuck::bytes_of_mut(&mut data.f64_value)),
			_ => None,
		}
	}
}

pub fn full_schema() -> Schema {
	let mut parameters = vec![
		Parameter::new(FULL_OPAQUE, "opaque", "", Constraints::opaque()),
		Parameter::new(FULL_STRING, "string", "", Constraints::string()),
		Parameter::new(FULL_BOOLEAN, "boolean", "", Constraints::bool()),
		Parameter::new(FULL_U8, "u8", "", Constraints::u8()),
		Parameter::new(FULL_U16, "u16", "", Constraints::u16()),
		Parameter::new(FULL_U32, "u32", "", Constraints::u32()),
		Parameter::new(FULL_I8, "i8", "", Constraints::i8()),
		Parameter::new(FULL_I16, "i16", "", Constraints::i16()),
		Parameter::new(FULL_I32, "i32", "", Constraints::i32()),
	];
	#[cfg(feature = "uint64")]
	parameters.push(Parameter::new(FULL_U64, "u64", "", Constraints::u64()));
	#[cfg(feature = "int64")]
	parameters.push(Parameter::new(FULL_I64, "i64", "", Constraints::i64()));
	#[cfg(feature = "float32")]
	parameters.push(Parameter::new(FULL_F32, "f32", "", Constraints::f32()));
	#[cfg(feature = "float64")]
	parameters.push(Parameter::new(FULL_F64, "f64", "", Constraints::f64()));
	Schema::new(
		FULL.schema_id,
		"full",
		"Schema with one parameter of every type",
		FullMapping,
		vec![],
		parameters,
	)
}

/* registry assembly */

pub fn tests_namespace() -> Namespace {
	Namespace::new(
		"tests",
		"Schemas for exercising the registry",
		vec![nested_schema(), constrained_schema(), full_schema()],
	)
}

pub fn test_registry() -> Registry {
	let mut registry = Registry::new();
	registry
		.register_namespace(tests_namespace())
		.expect("fixture namespace should register");
	registry
}

pub fn add_nested_instance(registry: &mut Registry, name: &str) -> InstancePath {
	registry
		.add_schema_instance(NESTED, Instance::new(NestedData::default()).with_name(name))
		.expect("nested schema should exist")
}

pub fn add_constrained_instance(registry: &mut Registry, name: &str) -> InstancePath {
	registry
		.add_schema_instance(
			CONSTRAINED,
			Instance::new(ConstrainedData::default()).with_name(name),
		)
		.expect("constrained schema should exist")
}

pub fn add_full_instance(registry: &mut Registry, name: &str) -> InstancePath {
	registry
		.add_schema_instance(FULL, Instance::new(FullData::default()).with_name(name))
		.expect("full schema should exist")
}

/* commit recording */

/// Commit handler that records every `(scope, id)` it receives
#[derive(Clone, Default)]
pub struct CommitRecorder {
	events: Rc<RefCell<Vec<CommitScope>>>,
}

impl CommitRecorder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<CommitScope> {
		self.events.borrow().clone()
	}

	pub fn clear(&self) {
		self.events.borrow_mut().clear();
	}
}

impl CommitHandler for CommitRecorder {
	fn commit(&mut self, scope: CommitScope, _data: &dyn Any) -> Result<(), confreg::Error> {
		self.events.borrow_mut().push(scope);
		Ok(())
	}
}

pub fn add_recorded_nested_instance(
	registry: &mut Registry,
	name: &str,
) -> (InstancePath, CommitRecorder) {
	let recorder = CommitRecorder::new();
	let path = registry
		.add_schema_instance(
			NESTED,
			Instance::new(NestedData::default())
				.with_name(name)
				.with_commit_handler(recorder.clone()),
		)
		.expect("nested schema should exist");
	(path, recorder)
}
