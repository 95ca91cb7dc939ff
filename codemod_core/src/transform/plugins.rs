use tree_sitter::Node;

use super::append_element;
use super::config_object;
use super::element_separator;
use super::factory_call;
use super::find_plugins_array;
use super::first_plugins_array;
use super::unsupported;
use crate::BundlerConfig;
use crate::CodemodResult;
use crate::SyntaxTree;
use crate::TextEdit;
use crate::nodes;

type Locate = for<'t> fn(&str, Node<'t>) -> CodemodResult<Node<'t>>;

/// Insert the factory call before the trailing config callback of
/// `composePlugins(..)`, or last when there is no callback.
pub(super) fn compose_plugins(tree: &mut SyntaxTree, config: &BundlerConfig) -> CodemodResult<()> {
	let call = factory_call(config);
	let edit = {
		let source = tree.source();
		let compose = nodes::find_call(source, tree.root(), "composePlugins")
			.ok_or_else(|| unsupported("no `composePlugins(..)` call"))?;
		let arguments = compose
			.child_by_field_name("arguments")
			.filter(|arguments| arguments.kind() == "arguments")
			.ok_or_else(|| unsupported("`composePlugins` is not called with an argument list"))?;

		match nodes::named_children(arguments).last() {
			Some(last) if nodes::is_function(nodes::unwrap_expression(*last)) => {
				let separator = element_separator(source, *last);
				TextEdit::insert(last.start_byte(), format!("{call},{separator}"))
			}
			_ => append_element(source, arguments, &call),
		}
	};

	tree.apply_edits(vec![edit])
}

/// Append to the `plugins` array of the exported config object.
pub(super) fn plugins_array(tree: &mut SyntaxTree, config: &BundlerConfig) -> CodemodResult<()> {
	append_to(tree, config, exported_plugins)
}

/// Append to the `plugins` array of the object passed to `defineConfig`.
pub(super) fn define_config_object(
	tree: &mut SyntaxTree,
	config: &BundlerConfig,
) -> CodemodResult<()> {
	append_to(tree, config, define_config_plugins)
}

/// Append to the `plugins` array of the object returned by the function
/// passed to `defineConfig`.
pub(super) fn define_config_function(
	tree: &mut SyntaxTree,
	config: &BundlerConfig,
) -> CodemodResult<()> {
	append_to(tree, config, define_config_function_plugins)
}

/// Append the factory call as the last argument of the composition call an
/// exported function returns.
pub(super) fn rollup_function(tree: &mut SyntaxTree, config: &BundlerConfig) -> CodemodResult<()> {
	append_to(tree, config, returned_call_arguments)
}

/// Append to the `plugins` array of the first config in an exported array.
pub(super) fn rollup_array_config(
	tree: &mut SyntaxTree,
	config: &BundlerConfig,
) -> CodemodResult<()> {
	append_to(tree, config, first_array_config_plugins)
}

fn append_to(tree: &mut SyntaxTree, config: &BundlerConfig, locate: Locate) -> CodemodResult<()> {
	let call = factory_call(config);
	let edit = {
		let source = tree.source();
		let list = locate(source, tree.root())?;
		append_element(source, list, &call)
	};

	tree.apply_edits(vec![edit])
}

/// The `plugins` array of the exported config object. The whole file is
/// searched only when the export does not resolve to an object literal.
fn exported_plugins<'t>(source: &str, root: Node<'t>) -> CodemodResult<Node<'t>> {
	let object = nodes::export_site(source, root)
		.and_then(|site| config_object(source, root, site.value()));

	match object {
		Some(object) => {
			find_plugins_array(source, root, object)
				.ok_or_else(|| unsupported("the exported config has no `plugins` array"))
		}
		None => {
			first_plugins_array(source, root)
				.ok_or_else(|| unsupported("no `plugins` array in the exported config"))
		}
	}
}

fn define_config_plugins<'t>(source: &str, root: Node<'t>) -> CodemodResult<Node<'t>> {
	let object = match nodes::find_call(source, root, "defineConfig") {
		Some(call) => config_object(source, root, call),
		None => nodes::export_site(source, root).and_then(|site| config_object(source, root, site.value())),
	};
	let object = object.ok_or_else(|| unsupported("no config object passed to `defineConfig`"))?;

	find_plugins_array(source, root, object)
		.ok_or_else(|| unsupported("the config object has no `plugins` array"))
}

fn define_config_function_plugins<'t>(source: &str, root: Node<'t>) -> CodemodResult<Node<'t>> {
	let call = nodes::find_call(source, root, "defineConfig")
		.ok_or_else(|| unsupported("no `defineConfig(..)` call"))?;
	let argument = nodes::call_arguments(call)
		.into_iter()
		.next()
		.ok_or_else(|| unsupported("`defineConfig` is called without a config"))?;

	let function = nodes::resolve_value(source, root, argument);
	if !is_callable(function) {
		return Err(unsupported("`defineConfig` is not called with a function"));
	}

	let returned = nodes::returned_expression(function)
		.ok_or_else(|| unsupported("the config function has no `return` statement"))?;
	let object = nodes::resolve_value(source, root, returned);
	if object.kind() != "object" {
		return Err(unsupported("the config function does not return an object literal"));
	}

	find_plugins_array(source, root, object)
		.ok_or_else(|| unsupported("the returned config has no `plugins` array"))
}

fn returned_call_arguments<'t>(source: &str, root: Node<'t>) -> CodemodResult<Node<'t>> {
	let site = nodes::export_site(source, root)
		.ok_or_else(|| unsupported("no `export default` or `module.exports`"))?;
	let function = nodes::resolve_value(source, root, site.value());
	if !is_callable(function) {
		return Err(unsupported("the exported config is not a function"));
	}

	let returned = nodes::returned_expression(function)
		.ok_or_else(|| unsupported("the config function has no `return` statement"))?;
	let call = nodes::resolve_value(source, root, returned);
	if call.kind() != "call_expression" {
		return Err(unsupported("the config function does not return a call"));
	}

	call.child_by_field_name("arguments")
		.filter(|arguments| arguments.kind() == "arguments")
		.ok_or_else(|| unsupported("the returned call has no argument list"))
}

fn first_array_config_plugins<'t>(source: &str, root: Node<'t>) -> CodemodResult<Node<'t>> {
	let site = nodes::export_site(source, root)
		.ok_or_else(|| unsupported("no `export default` or `module.exports`"))?;
	let array = nodes::resolve_value(source, root, site.value());
	if array.kind() != "array" {
		return Err(unsupported("the exported config is not an array"));
	}

	let first = nodes::named_children(array)
		.into_iter()
		.next()
		.ok_or_else(|| unsupported("the exported config array is empty"))?;
	let object = config_object(source, root, first)
		.ok_or_else(|| unsupported("the first exported config is not an object"))?;

	find_plugins_array(source, root, object)
		.ok_or_else(|| unsupported("the first exported config has no `plugins` array"))
}

fn is_callable(node: Node<'_>) -> bool {
	nodes::is_function(node)
		|| matches!(
			node.kind(),
			"function_declaration" | "generator_function_declaration"
		)
}
