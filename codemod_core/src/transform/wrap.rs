use super::factory_call;
use super::unsupported;
use crate::BundlerConfig;
use crate::CodemodResult;
use crate::SyntaxTree;
use crate::TextEdit;
use crate::nodes;
use crate::nodes::ExportSite;

/// `export default { .. }` becomes `export default withZephyr()({ .. })`.
pub(super) fn wrap_export_default(tree: &mut SyntaxTree, config: &BundlerConfig) -> CodemodResult<()> {
	let edits = {
		let source = tree.source();
		let site = nodes::export_site(source, tree.root())
			.filter(|site| !matches!(site, ExportSite::ModuleExports { .. }))
			.ok_or_else(|| unsupported("no `export default` statement"))?;
		wrap_site(source, site, &factory_call(config))?
	};

	tree.apply_edits(edits)
}

/// `module.exports = value` becomes `module.exports = withZephyr()(value)`.
pub(super) fn wrap_module_exports(tree: &mut SyntaxTree, config: &BundlerConfig) -> CodemodResult<()> {
	let edits = {
		let source = tree.source();
		let site = nodes::export_site(source, tree.root())
			.filter(|site| matches!(site, ExportSite::ModuleExports { .. }))
			.ok_or_else(|| unsupported("no `module.exports` assignment"))?;
		wrap_site(source, site, &factory_call(config))?
	};

	tree.apply_edits(edits)
}

/// Wrap whatever the module exports: an identifier, an inline function, or a
/// named `export default function` (which is re-exported wrapped).
///
/// A conditional export that already calls the factory in one of its
/// branches is left as written.
pub(super) fn wrap_exported_function(
	tree: &mut SyntaxTree,
	config: &BundlerConfig,
) -> CodemodResult<()> {
	let edits = {
		let source = tree.source();
		let site = nodes::export_site(source, tree.root())
			.ok_or_else(|| unsupported("no `export default` or `module.exports`"))?;

		let value = nodes::unwrap_expression(site.value());
		if value.kind() == "ternary_expression"
			&& nodes::contains_call_to(source, value, &config.import_name)
		{
			return Ok(());
		}

		wrap_site(source, site, &factory_call(config))?
	};

	tree.apply_edits(edits)
}

fn wrap_site(source: &str, site: ExportSite<'_>, factory: &str) -> CodemodResult<Vec<TextEdit>> {
	match site {
		ExportSite::Default { value, .. } | ExportSite::ModuleExports { value, .. } => {
			Ok(vec![
				TextEdit::insert(value.start_byte(), format!("{factory}(")),
				TextEdit::insert(value.end_byte(), ")"),
			])
		}
		ExportSite::DefaultDeclaration {
			statement,
			declaration,
		} => {
			let name = declaration
				.child_by_field_name("name")
				.map(|name| nodes::text(source, name))
				.ok_or_else(|| unsupported("the default export declaration has no name"))?;

			Ok(vec![
				TextEdit::replace(statement.start_byte()..declaration.start_byte(), ""),
				TextEdit::insert(
					statement.end_byte(),
					format!("\n\nexport default {factory}({name});"),
				),
			])
		}
	}
}
