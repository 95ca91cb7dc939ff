use tree_sitter::Node;

use super::append_element;
use super::config_object;
use super::find_plugins_array;
use super::unsupported;
use crate::BundlerConfig;
use crate::CodemodResult;
use crate::SyntaxTree;
use crate::TextEdit;
use crate::nodes;

/// Name of the synthesized Rsbuild plugin factory.
pub(crate) const RSBUILD_PLUGIN_NAME: &str = "zephyrRSbuildPlugin";

const RSBUILD_CORE: &str = "@rsbuild/core";
const RSBUILD_PLUGIN_TYPE: &str = "RsbuildPlugin";
const DEFAULT_INDENT: &str = "  ";

/// Rsbuild has no native plugin, so the Rspack plugin is applied from a small
/// Rsbuild plugin that hooks `modifyRspackConfig`. The factory is declared
/// before the exported statement unless it already exists, and its call is
/// appended to `plugins` unless already listed.
pub(super) fn rsbuild_plugin(tree: &mut SyntaxTree, config: &BundlerConfig) -> CodemodResult<()> {
	let typescript = tree.dialect().is_typescript();
	let mut edits = Vec::new();
	{
		let source = tree.source();
		let root = tree.root();
		let site = nodes::export_site(source, root)
			.ok_or_else(|| unsupported("no `export default` or `module.exports`"))?;
		let plugins = config_object(source, root, site.value())
			.and_then(|object| find_plugins_array(source, root, object))
			.ok_or_else(|| unsupported("the exported Rsbuild config has no `plugins` array"))?;

		if !nodes::declares_function(source, root, RSBUILD_PLUGIN_NAME) {
			if typescript && !tree.imports_symbol(RSBUILD_CORE, RSBUILD_PLUGIN_TYPE) {
				edits.push(tree.plan_import(RSBUILD_CORE, RSBUILD_PLUGIN_TYPE, true));
			}

			let statement = site.statement();
			let indent = nodes::line_indent(source, statement.start_byte());
			let unit = indent_unit(source, indent, plugins);
			edits.push(TextEdit::insert(
				statement.start_byte(),
				format!(
					"{}\n\n{indent}",
					plugin_source(&config.import_name, typescript, unit)
				),
			));
		}

		let listed = nodes::named_children(plugins).into_iter().any(|element| {
			nodes::is_call_to(source, nodes::unwrap_expression(element), RSBUILD_PLUGIN_NAME)
		});
		if !listed {
			edits.push(append_element(
				source,
				plugins,
				&format!("{RSBUILD_PLUGIN_NAME}()"),
			));
		}
	}

	tree.apply_edits(edits)
}

/// One level of indentation, taken from the `plugins` property relative to
/// the exported statement. Two spaces when the file does not show one.
fn indent_unit<'s>(source: &'s str, statement_indent: &str, plugins: Node<'_>) -> &'s str {
	let Some(property) = plugins.parent() else {
		return DEFAULT_INDENT;
	};

	let start = property.start_byte();
	if !nodes::starts_line(source, start) {
		return DEFAULT_INDENT;
	}

	let inner = nodes::line_indent(source, start);
	match inner.strip_prefix(statement_indent) {
		Some(unit) if unit.starts_with('\t') => "\t",
		Some(unit) if !unit.is_empty() => unit,
		_ => DEFAULT_INDENT,
	}
}

fn plugin_source(factory: &str, typescript: bool, unit: &str) -> String {
	let annotation = if typescript {
		format!(": {RSBUILD_PLUGIN_TYPE}")
	} else {
		String::new()
	};
	let i1 = unit;
	let i2 = unit.repeat(2);
	let i3 = unit.repeat(3);
	let i4 = unit.repeat(4);

	format!(
		"function {RSBUILD_PLUGIN_NAME}(){annotation} {{
{i1}return {{
{i2}name: 'zephyr-rsbuild-plugin',
{i2}setup(api) {{
{i3}api.modifyRspackConfig(async (config) => {{
{i4}const zephyrConfig = await {factory}()(config);
{i4}return zephyrConfig;
{i3}}});
{i2}}},
{i1}}};
}}"
	)
}
