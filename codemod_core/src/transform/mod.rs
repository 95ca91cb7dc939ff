//! One mutation per recognized config shape.
//!
//! Handlers plan their complete edit set from the current tree and apply it
//! in one batch, so a shape that turns out to be unsupported leaves the
//! document untouched.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tree_sitter::Node;

use crate::BundlerConfig;
use crate::CodemodError;
use crate::CodemodResult;
use crate::Document;
use crate::JsonDocument;
use crate::SyntaxTree;
use crate::TextEdit;
use crate::nodes;

mod parcel;
mod plugins;
mod rsbuild;
mod wrap;

/// The closed set of transforms a catalog pattern can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
	/// `composePlugins(a(), b(), (config) => config)`
	ComposePlugins,
	/// An exported object with a `plugins` array.
	PluginsArray,
	/// `defineConfig({ plugins: [...] })`
	DefineConfigObject,
	/// `defineConfig(() => ({ plugins: [...] }))`
	DefineConfigFunction,
	/// An exported function returning a composition call.
	RollupFunction,
	/// `export default [{ plugins: [...] }]`
	RollupArrayConfig,
	/// `export default { ... }`
	WrapExportDefault,
	/// `module.exports = { ... }`
	WrapModuleExports,
	/// `export default config`
	WrapExportedFunction,
	/// The `reporters` list of a `.parcelrc`.
	ParcelReporters,
	/// A synthesized Rsbuild plugin wrapping the Rspack config.
	RsbuildPlugin,
}

pub type ScriptHandler = fn(&mut SyntaxTree, &BundlerConfig) -> CodemodResult<()>;
pub type JsonHandler = fn(&mut JsonDocument, &BundlerConfig) -> CodemodResult<()>;

/// A transform implementation for one document format.
#[derive(Debug, Clone, Copy)]
pub enum Handler {
	Script(ScriptHandler),
	Json(JsonHandler),
}

impl TransformKind {
	pub const ALL: [Self; 11] = [
		Self::ComposePlugins,
		Self::PluginsArray,
		Self::DefineConfigObject,
		Self::DefineConfigFunction,
		Self::RollupFunction,
		Self::RollupArrayConfig,
		Self::WrapExportDefault,
		Self::WrapModuleExports,
		Self::WrapExportedFunction,
		Self::ParcelReporters,
		Self::RsbuildPlugin,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::ComposePlugins => "compose-plugins",
			Self::PluginsArray => "plugins-array",
			Self::DefineConfigObject => "define-config-object",
			Self::DefineConfigFunction => "define-config-function",
			Self::RollupFunction => "rollup-function",
			Self::RollupArrayConfig => "rollup-array-config",
			Self::WrapExportDefault => "wrap-export-default",
			Self::WrapModuleExports => "wrap-module-exports",
			Self::WrapExportedFunction => "wrap-exported-function",
			Self::ParcelReporters => "parcel-reporters",
			Self::RsbuildPlugin => "rsbuild-plugin",
		}
	}

	pub fn handler(self) -> Handler {
		match self {
			Self::ComposePlugins => Handler::Script(plugins::compose_plugins),
			Self::PluginsArray => Handler::Script(plugins::plugins_array),
			Self::DefineConfigObject => Handler::Script(plugins::define_config_object),
			Self::DefineConfigFunction => Handler::Script(plugins::define_config_function),
			Self::RollupFunction => Handler::Script(plugins::rollup_function),
			Self::RollupArrayConfig => Handler::Script(plugins::rollup_array_config),
			Self::WrapExportDefault => Handler::Script(wrap::wrap_export_default),
			Self::WrapModuleExports => Handler::Script(wrap::wrap_module_exports),
			Self::WrapExportedFunction => Handler::Script(wrap::wrap_exported_function),
			Self::ParcelReporters => Handler::Json(parcel::parcel_reporters),
			Self::RsbuildPlugin => Handler::Script(rsbuild::rsbuild_plugin),
		}
	}
}

impl fmt::Display for TransformKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Run the transform named by `kind` against `document`.
pub fn apply_transform(
	kind: TransformKind,
	document: &mut Document,
	config: &BundlerConfig,
) -> CodemodResult<()> {
	match (kind.handler(), document) {
		(Handler::Script(handler), Document::Script(tree)) => handler(tree, config),
		(Handler::Json(handler), Document::Json(json)) => handler(json, config),
		(Handler::Script(_), Document::Json(_)) => {
			Err(CodemodError::UnsupportedShape(format!(
				"`{kind}` expects a JavaScript or TypeScript file"
			)))
		}
		(Handler::Json(_), Document::Script(_)) => {
			Err(CodemodError::UnsupportedShape(format!(
				"`{kind}` expects a JSON file"
			)))
		}
	}
}

/// `withZephyr()` for the default catalog.
pub(crate) fn factory_call(config: &BundlerConfig) -> String {
	format!("{}()", config.import_name)
}

pub(crate) fn unsupported(reason: impl Into<String>) -> CodemodError {
	CodemodError::UnsupportedShape(reason.into())
}

/// Plan `element` as the new last entry of an array or argument list.
///
/// Multi-line lists get the element on its own line at the indentation of
/// the current last entry. A trailing comma stays trailing.
pub(crate) fn append_element(source: &str, list: Node<'_>, element: &str) -> TextEdit {
	let items = nodes::named_children(list);
	let Some(last) = items.last() else {
		return TextEdit::insert(list.start_byte() + 1, element.to_string());
	};

	let separator = element_separator(source, *last);
	match nodes::next_token(*last) {
		Some(token) if token.kind() == "," => {
			TextEdit::insert(token.end_byte(), format!("{separator}{element},"))
		}
		_ => TextEdit::insert(last.end_byte(), format!(",{separator}{element}")),
	}
}

/// Whitespace that puts a new entry where `neighbour` sits: a newline and
/// its indentation when it starts a line, a single space otherwise.
pub(crate) fn element_separator(source: &str, neighbour: Node<'_>) -> String {
	let start = neighbour.start_byte();
	if nodes::starts_line(source, start) {
		format!("\n{}", nodes::line_indent(source, start))
	} else {
		" ".to_string()
	}
}

/// The config object behind an exported value: an object literal, the
/// object passed to a call such as `defineConfig({ .. })`, or the object a
/// function returns. Identifiers are followed to their bindings.
pub(crate) fn config_object<'t>(source: &str, root: Node<'t>, value: Node<'t>) -> Option<Node<'t>> {
	let mut current = nodes::resolve_value(source, root, value);
	for _ in 0..4 {
		match current.kind() {
			"object" => return Some(current),
			"call_expression" => {
				let argument = nodes::call_arguments(current).into_iter().next()?;
				current = nodes::resolve_value(source, root, argument);
			}
			"arrow_function"
			| "function_expression"
			| "function"
			| "function_declaration"
			| "generator_function" => {
				let returned = nodes::returned_expression(current)?;
				current = nodes::resolve_value(source, root, returned);
			}
			_ => return None,
		}
	}

	None
}

/// The array literal holding an object's plugins. Follows identifiers and
/// looks through `[..].filter(Boolean)` style chains.
pub(crate) fn find_plugins_array<'t>(source: &str, root: Node<'t>, object: Node<'t>) -> Option<Node<'t>> {
	let value = nodes::property_value(source, object, "plugins")?;
	let mut current = nodes::resolve_value(source, root, value);
	while current.kind() == "call_expression" {
		let function = current.child_by_field_name("function")?;
		if function.kind() != "member_expression" {
			return None;
		}
		current = nodes::resolve_value(source, root, function.child_by_field_name("object")?);
	}

	(current.kind() == "array").then_some(current)
}

/// The first `plugins: [..]` property anywhere in the file.
pub(crate) fn first_plugins_array<'t>(source: &str, root: Node<'t>) -> Option<Node<'t>> {
	let mut stack = vec![root];
	while let Some(node) = stack.pop() {
		if node.kind() == "object" {
			if let Some(array) = find_plugins_array(source, root, node) {
				return Some(array);
			}
		}

		let mut kids = nodes::named_children(node);
		kids.reverse();
		stack.extend(kids);
	}

	None
}
