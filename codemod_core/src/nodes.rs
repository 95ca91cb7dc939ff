//! Navigation helpers over tree-sitter JavaScript / TypeScript nodes.
//!
//! Everything here is read-only and works on node kinds shared by the
//! `tree-sitter-javascript` and `tree-sitter-typescript` grammars.

use tree_sitter::Node;

/// Resolution through identifiers and returns stops after this many hops so
/// that self-referencing bindings cannot loop.
const MAX_RESOLVE_DEPTH: usize = 8;

/// Named children of `node`, without comments.
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
	let mut cursor = node.walk();
	node.named_children(&mut cursor)
		.filter(|child| !child.is_extra())
		.collect()
}

/// All children of `node` (including punctuation), without comments.
pub(crate) fn children(node: Node<'_>) -> Vec<Node<'_>> {
	let mut cursor = node.walk();
	node.children(&mut cursor)
		.filter(|child| !child.is_extra())
		.collect()
}

/// Source text covered by `node`.
pub(crate) fn text<'s>(source: &'s str, node: Node<'_>) -> &'s str {
	&source[node.byte_range()]
}

/// The unquoted value of a plain string literal.
pub(crate) fn string_value<'s>(source: &'s str, node: Node<'_>) -> Option<&'s str> {
	if node.kind() != "string" {
		return None;
	}

	let raw = text(source, node);
	if raw.len() < 2 {
		return None;
	}

	Some(&raw[1..raw.len() - 1])
}

/// Strip parentheses and TypeScript-only wrappers (`as`, `satisfies`, `!`).
pub(crate) fn unwrap_expression(node: Node<'_>) -> Node<'_> {
	let mut current = node;
	loop {
		match current.kind() {
			"parenthesized_expression"
			| "as_expression"
			| "satisfies_expression"
			| "non_null_expression" => {
				let Some(inner) = named_children(current).into_iter().next() else {
					return current;
				};
				current = inner;
			}
			_ => return current,
		}
	}
}

/// The identifier a call expression invokes, e.g. `defineConfig` in
/// `defineConfig({})`.
pub(crate) fn callee_name<'s>(source: &'s str, call: Node<'_>) -> Option<&'s str> {
	if call.kind() != "call_expression" {
		return None;
	}

	let function = call.child_by_field_name("function")?;
	(function.kind() == "identifier").then(|| text(source, function))
}

/// Whether `node` is a call whose callee is the identifier `name`.
pub(crate) fn is_call_to(source: &str, node: Node<'_>, name: &str) -> bool {
	callee_name(source, node) == Some(name)
}

/// Preorder search for the first call to `name` at or below `node`.
pub(crate) fn find_call<'t>(source: &str, node: Node<'t>, name: &str) -> Option<Node<'t>> {
	let mut stack = vec![node];
	while let Some(current) = stack.pop() {
		if is_call_to(source, current, name) {
			return Some(current);
		}

		let mut kids = named_children(current);
		kids.reverse();
		stack.extend(kids);
	}

	None
}

/// Whether any call to `name` appears at or below `node`.
pub(crate) fn contains_call_to(source: &str, node: Node<'_>, name: &str) -> bool {
	find_call(source, node, name).is_some()
}

/// The argument nodes of a call expression (empty for tagged templates).
pub(crate) fn call_arguments(call: Node<'_>) -> Vec<Node<'_>> {
	call.child_by_field_name("arguments")
		.filter(|args| args.kind() == "arguments")
		.map(named_children)
		.unwrap_or_default()
}

pub(crate) fn is_function(node: Node<'_>) -> bool {
	matches!(
		node.kind(),
		"arrow_function" | "function_expression" | "function" | "generator_function"
	)
}

/// Where a config file hands its value to the build tool.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ExportSite<'t> {
	/// `export default <value>;`
	Default { statement: Node<'t>, value: Node<'t> },
	/// `export default function name() {}`
	DefaultDeclaration {
		statement: Node<'t>,
		declaration: Node<'t>,
	},
	/// `module.exports = <value>;`
	ModuleExports { statement: Node<'t>, value: Node<'t> },
}

impl<'t> ExportSite<'t> {
	/// The top-level statement that performs the export.
	pub(crate) fn statement(&self) -> Node<'t> {
		match self {
			Self::Default { statement, .. }
			| Self::DefaultDeclaration { statement, .. }
			| Self::ModuleExports { statement, .. } => *statement,
		}
	}

	/// The exported expression or declaration, as written.
	pub(crate) fn value(&self) -> Node<'t> {
		match self {
			Self::Default { value, .. } | Self::ModuleExports { value, .. } => *value,
			Self::DefaultDeclaration { declaration, .. } => *declaration,
		}
	}
}

/// The default export of the module, or the `module.exports` assignment when
/// there is none.
pub(crate) fn export_site<'t>(source: &str, root: Node<'t>) -> Option<ExportSite<'t>> {
	default_export(root).or_else(|| module_exports(source, root))
}

fn default_export(root: Node<'_>) -> Option<ExportSite<'_>> {
	named_children(root).into_iter().find_map(|statement| {
		if statement.kind() != "export_statement" {
			return None;
		}

		if !children(statement)
			.iter()
			.any(|child| child.kind() == "default")
		{
			return None;
		}

		if let Some(value) = statement.child_by_field_name("value") {
			return Some(ExportSite::Default { statement, value });
		}

		statement
			.child_by_field_name("declaration")
			.map(|declaration| {
				ExportSite::DefaultDeclaration {
					statement,
					declaration,
				}
			})
	})
}

fn module_exports<'t>(source: &str, root: Node<'t>) -> Option<ExportSite<'t>> {
	named_children(root).into_iter().find_map(|statement| {
		if statement.kind() != "expression_statement" {
			return None;
		}

		let assignment = named_children(statement).into_iter().next()?;
		if assignment.kind() != "assignment_expression" {
			return None;
		}

		let left = assignment.child_by_field_name("left")?;
		if !is_module_exports(source, left) {
			return None;
		}

		let value = assignment.child_by_field_name("right")?;
		Some(ExportSite::ModuleExports { statement, value })
	})
}

fn is_module_exports(source: &str, node: Node<'_>) -> bool {
	if node.kind() != "member_expression" {
		return false;
	}

	let object = node.child_by_field_name("object");
	let property = node.child_by_field_name("property");
	match (object, property) {
		(Some(object), Some(property)) => {
			text(source, object) == "module" && text(source, property) == "exports"
		}
		_ => false,
	}
}

/// The value bound to a top-level `const`/`let`/`var` or the function
/// declaration named `name`.
pub(crate) fn resolve_binding<'t>(source: &str, root: Node<'t>, name: &str) -> Option<Node<'t>> {
	for statement in named_children(root) {
		let declaration = if statement.kind() == "export_statement" {
			match statement.child_by_field_name("declaration") {
				Some(declaration) => declaration,
				None => continue,
			}
		} else {
			statement
		};

		match declaration.kind() {
			"lexical_declaration" | "variable_declaration" => {
				for declarator in named_children(declaration) {
					if declarator.kind() != "variable_declarator" {
						continue;
					}

					let bound = declarator
						.child_by_field_name("name")
						.is_some_and(|id| id.kind() == "identifier" && text(source, id) == name);
					if bound {
						return declarator.child_by_field_name("value");
					}
				}
			}
			"function_declaration" | "generator_function_declaration" => {
				let named = declaration
					.child_by_field_name("name")
					.is_some_and(|id| text(source, id) == name);
				if named {
					return Some(declaration);
				}
			}
			_ => {}
		}
	}

	None
}

/// Follow wrappers and identifier bindings until reaching a concrete value.
pub(crate) fn resolve_value<'t>(source: &str, root: Node<'t>, node: Node<'t>) -> Node<'t> {
	let mut current = unwrap_expression(node);
	for _ in 0..MAX_RESOLVE_DEPTH {
		if current.kind() != "identifier" {
			break;
		}

		match resolve_binding(source, root, text(source, current)) {
			Some(bound) => current = unwrap_expression(bound),
			None => break,
		}
	}

	current
}

/// The expression a function hands back: the body of a concise arrow, or the
/// argument of the last top-level `return` in a block body.
pub(crate) fn returned_expression(function: Node<'_>) -> Option<Node<'_>> {
	let body = function.child_by_field_name("body")?;
	if body.kind() != "statement_block" {
		return Some(body);
	}

	named_children(body)
		.into_iter()
		.rev()
		.find(|statement| statement.kind() == "return_statement")
		.and_then(|statement| named_children(statement).into_iter().next())
}

/// The value of the property `key` in an object literal. A shorthand property
/// returns its identifier.
pub(crate) fn property_value<'t>(source: &str, object: Node<'t>, key: &str) -> Option<Node<'t>> {
	if object.kind() != "object" {
		return None;
	}

	named_children(object)
		.into_iter()
		.find_map(|property| {
			match property.kind() {
				"pair" => {
					let name = property.child_by_field_name("key")?;
					let matches = match name.kind() {
						"property_identifier" => text(source, name) == key,
						"string" => string_value(source, name) == Some(key),
						_ => false,
					};
					if matches {
						property.child_by_field_name("value")
					} else {
						None
					}
				}
				"shorthand_property" if text(source, property) == key => {
					named_children(property).into_iter().next()
				}
				_ => None,
			}
		})
}

/// Whether a function named `name` is declared at the top level, either as a
/// function declaration or as a binding initialized with a function.
pub(crate) fn declares_function(source: &str, root: Node<'_>, name: &str) -> bool {
	resolve_binding(source, root, name).is_some_and(|value| {
		let value = unwrap_expression(value);
		is_function(value)
			|| matches!(
				value.kind(),
				"function_declaration" | "generator_function_declaration"
			)
	})
}

/// Byte offset of the start of the line containing `offset`.
pub(crate) fn line_start(source: &str, offset: usize) -> usize {
	source[..offset].rfind('\n').map_or(0, |index| index + 1)
}

/// Leading whitespace of the line containing `offset`.
pub(crate) fn line_indent(source: &str, offset: usize) -> &str {
	let start = line_start(source, offset);
	let line = &source[start..];
	let width = line
		.find(|c: char| c != ' ' && c != '\t')
		.unwrap_or(line.len());
	&line[..width]
}

/// Whether only whitespace precedes `offset` on its line.
pub(crate) fn starts_line(source: &str, offset: usize) -> bool {
	source[line_start(source, offset)..offset].trim().is_empty()
}

/// The next sibling that is not a comment.
pub(crate) fn next_token(node: Node<'_>) -> Option<Node<'_>> {
	let mut sibling = node.next_sibling();
	while let Some(candidate) = sibling {
		if !candidate.is_extra() {
			return Some(candidate);
		}
		sibling = candidate.next_sibling();
	}

	None
}
