//! String path encoding: by-name resolution and path building

mod common;

use common::*;
use confreg::{schema::GroupOrParameter, Error, Instance};
use pretty_assertions::assert_eq;

#[test]
fn parameter_paths_resolve_all_four_objects() {
	let mut registry = test_registry();
	add_nested_instance(&mut registry, "instance-1");

	let (namespace, schema, instance, parameter) = registry
		.from_parameter_string_path("/tests/nested/instance-1/group/parameter")
		.unwrap();
	assert_eq!(namespace.name(), "tests");
	assert_eq!(schema.name(), "nested");
	assert_eq!(instance.name(), Some("instance-1"));
	assert_eq!(parameter.name(), "parameter");
	assert_eq!(parameter.id(), NESTED_GROUP_PARAMETER);
}

#[test]
fn top_level_parameters_resolve_without_a_group_segment() {
	let mut registry = test_registry();
	add_nested_instance(&mut registry, "instance-1");

	let (_, _, _, parameter) = registry
		.from_parameter_string_path("/tests/nested/instance-1/parameter")
		.unwrap();
	assert_eq!(parameter.id(), NESTED_PARAMETER);
}

#[test]
fn namespace_schema_and_instance_levels_resolve() {
	let mut registry = test_registry();
	add_nested_instance(&mut registry, "instance-1");

	assert_eq!(
		registry.from_namespace_string_path("/tests").unwrap().name(),
		"tests"
	);
	let (_, schema) = registry.from_schema_string_path("/tests/nested").unwrap();
	assert_eq!(schema.name(), "nested");
	let (_, _, instance) = registry
		.from_instance_string_path("/tests/nested/instance-1")
		.unwrap();
	assert_eq!(instance.name(), Some("instance-1"));
}

#[test]
fn group_paths_resolve_to_groups() {
	let mut registry = test_registry();
	add_nested_instance(&mut registry, "instance-1");

	let (_, _, _, group) = registry
		.from_group_string_path("/tests/nested/instance-1/group")
		.unwrap();
	assert_eq!(group.id(), NESTED_GROUP);

	match registry
		.from_group_or_parameter_string_path("/tests/nested/instance-1/group")
		.unwrap()
		.3
	{
		GroupOrParameter::Group(group) => assert_eq!(group.id(), NESTED_GROUP),
		GroupOrParameter::Parameter(_) => panic!("expected a group"),
	}
}

#[test]
fn a_group_path_is_not_a_parameter_path() {
	let mut registry = test_registry();
	add_nested_instance(&mut registry, "instance-1");

	assert!(matches!(
		registry.from_parameter_string_path("/tests/nested/instance-1/group"),
		Err(Error::GroupIsNotAParameter)
	));
}

#[test]
fn unknown_names_are_not_found() {
	let mut registry = test_registry();
	add_nested_instance(&mut registry, "instance-1");

	assert!(matches!(
		registry.from_namespace_string_path("/nope"),
		Err(Error::NotFound)
	));
	assert!(matches!(
		registry.from_schema_string_path("/tests/nope"),
		Err(Error::NotFound)
	));
	assert!(matches!(
		registry.from_instance_string_path("/tests/nested/nope"),
		Err(Error::NotFound)
	));
	assert!(matches!(
		registry.from_parameter_string_path("/tests/nested/instance-1/nope"),
		Err(Error::NotFound)
	));
}

#[test]
fn paths_must_start_with_a_slash() {
	let registry = test_registry();
	assert!(matches!(
		registry.from_namespace_string_path("tests"),
		Err(Error::Invalid)
	));
}

#[test]
fn building_paths_inverts_resolution() {
	let mut registry = test_registry();
	let path = add_nested_instance(&mut registry, "instance-1");
	let (namespace, schema, instance) = path.resolve(&registry).unwrap();
	let group = schema.group(NESTED_GROUP).unwrap();
	let nested_parameter = schema.parameter(NESTED_GROUP_PARAMETER).unwrap();
	let top_parameter = schema.parameter(NESTED_PARAMETER).unwrap();

	assert_eq!(registry.namespace_string_path(namespace), "/tests");
	assert_eq!(registry.schema_string_path(schema).unwrap(), "/tests/nested");
	assert_eq!(
		registry.instance_string_path(instance).unwrap(),
		"/tests/nested/instance-1"
	);
	assert_eq!(
		registry.group_string_path(instance, group).unwrap(),
		"/tests/nested/instance-1/group"
	);
	assert_eq!(
		registry
			.parameter_string_path(instance, nested_parameter)
			.unwrap(),
		"/tests/nested/instance-1/group/parameter"
	);
	assert_eq!(
		registry
			.parameter_string_path(instance, top_parameter)
			.unwrap(),
		"/tests/nested/instance-1/parameter"
	);

	// and resolving what was built yields the same objects back
	let (_, _, _, resolved) = registry
		.from_parameter_string_path(
			&registry
				.parameter_string_path(instance, nested_parameter)
				.unwrap(),
		)
		.unwrap();
	assert!(std::ptr::eq(resolved, nested_parameter));
}

#[test]
fn unnamed_instances_have_no_string_path() {
	let mut registry = test_registry();
	let path = registry
		.add_schema_instance(NESTED, Instance::new(NestedData::default()))
		.unwrap();
	let (_, _, instance) = path.resolve(&registry).unwrap();

	assert!(matches!(
		registry.instance_string_path(instance),
		Err(Error::NotFound)
	));
}
