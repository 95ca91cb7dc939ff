use std::fmt;
use std::ops::Range;
use std::path::Path;

use serde_json::Value;
use tree_sitter::Language;
use tree_sitter::Node;
use tree_sitter::Parser;
use tree_sitter::Tree;

use crate::CodemodError;
use crate::CodemodResult;
use crate::ConfigFormat;
use crate::nodes;

/// The grammar a script config is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
	/// JavaScript modules and CommonJS scripts, JSX allowed.
	JavaScript,
	TypeScript,
	Tsx,
}

impl Dialect {
	/// Pick the dialect from a file extension: `ts`, `mts` and `cts` are
	/// TypeScript, `tsx` is TSX and everything else is JavaScript.
	pub fn from_path(path: &Path) -> Self {
		match path.extension().and_then(|ext| ext.to_str()) {
			Some("ts" | "mts" | "cts") => Self::TypeScript,
			Some("tsx") => Self::Tsx,
			_ => Self::JavaScript,
		}
	}

	pub fn is_typescript(self) -> bool {
		matches!(self, Self::TypeScript | Self::Tsx)
	}

	fn language(self) -> Language {
		match self {
			Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
			Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
			Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
		}
	}
}

/// A replacement of a byte range in the source. Insertions use an empty
/// range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
	pub range: Range<usize>,
	pub text: String,
}

impl TextEdit {
	pub fn insert(offset: usize, text: impl Into<String>) -> Self {
		Self {
			range: offset..offset,
			text: text.into(),
		}
	}

	pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
		Self {
			range,
			text: text.into(),
		}
	}
}

/// The source of one script config together with its concrete syntax tree.
///
/// The text is the source of truth: edits rewrite it and the tree is rebuilt
/// from the result, so serializing never reformats anything outside the
/// edited ranges.
#[derive(Clone)]
pub struct SyntaxTree {
	source: String,
	tree: Tree,
	dialect: Dialect,
}

impl fmt::Debug for SyntaxTree {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SyntaxTree")
			.field("dialect", &self.dialect)
			.field("source", &self.source)
			.finish_non_exhaustive()
	}
}

impl SyntaxTree {
	/// Parse `source`, failing with the position of the first syntax error.
	pub fn parse(source: impl Into<String>, dialect: Dialect) -> CodemodResult<Self> {
		let source = source.into();
		let tree = parse_tree(&source, dialect)?;

		Ok(Self {
			source,
			tree,
			dialect,
		})
	}

	pub fn dialect(&self) -> Dialect {
		self.dialect
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn root(&self) -> Node<'_> {
		self.tree.root_node()
	}

	/// Source text covered by `node`.
	pub fn text(&self, node: Node<'_>) -> &str {
		nodes::text(&self.source, node)
	}

	/// The current source text, byte-identical to the input outside edited
	/// regions.
	pub fn serialize(&self) -> String {
		self.source.clone()
	}

	pub fn into_source(self) -> String {
		self.source
	}

	/// Apply a batch of edits atomically. Edits are applied from the end of
	/// the file backwards so earlier offsets stay valid; edits at the same
	/// offset keep their relative order. The tree is left untouched when the
	/// edits overlap or the result does not parse.
	pub fn apply_edits(&mut self, mut edits: Vec<TextEdit>) -> CodemodResult<()> {
		if edits.is_empty() {
			return Ok(());
		}

		edits.reverse();
		edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));

		let mut source = self.source.clone();
		let mut floor = source.len();
		for edit in &edits {
			if edit.range.start > edit.range.end || edit.range.end > floor {
				return Err(CodemodError::UnsupportedShape(format!(
					"overlapping edits at byte {}",
					edit.range.start
				)));
			}

			source.replace_range(edit.range.clone(), &edit.text);
			floor = edit.range.start;
		}

		let tree = parse_tree(&source, self.dialect).map_err(|error| {
			match error {
				CodemodError::Parse { line, column } => CodemodError::InvalidEdit { line, column },
				other => other,
			}
		})?;

		self.source = source;
		self.tree = tree;

		Ok(())
	}

	/// Whether the file has any top-level `import` or `export` statement.
	pub fn uses_module_syntax(&self) -> bool {
		nodes::named_children(self.root())
			.iter()
			.any(|node| matches!(node.kind(), "import_statement" | "export_statement"))
	}

	/// Whether `symbol` is bound, unaliased, by an import or destructured
	/// require of exactly `package`.
	pub fn imports_symbol(&self, package: &str, symbol: &str) -> bool {
		let imported = self.import_statements(package).into_iter().any(|statement| {
			let Some(clause) = import_clause(statement) else {
				return false;
			};

			nodes::named_children(clause).into_iter().any(|part| {
				match part.kind() {
					"identifier" => self.text(part) == symbol,
					"named_imports" => {
						nodes::named_children(part)
							.into_iter()
							.any(|specifier| self.binds_unaliased(specifier, symbol))
					}
					_ => false,
				}
			})
		});

		imported
			|| self
				.require_patterns(package)
				.into_iter()
				.any(|pattern| self.pattern_binds(pattern, symbol))
	}

	/// Add an import (module files) or a destructured require (CommonJS
	/// files) of `symbol` from `package`. Does nothing when the symbol is
	/// already bound.
	pub fn insert_import(&mut self, package: &str, symbol: &str) -> CodemodResult<()> {
		if self.imports_symbol(package, symbol) {
			return Ok(());
		}

		let edit = if self.uses_module_syntax() {
			self.plan_import(package, symbol, false)
		} else {
			self.plan_require(package, symbol)
		};

		self.apply_edits(vec![edit])
	}

	/// Plan an `import { symbol } from 'package'`, or an `import type` when
	/// `type_only` is set. Merges into an existing named import of the same
	/// package when there is one.
	pub(crate) fn plan_import(&self, package: &str, symbol: &str, type_only: bool) -> TextEdit {
		for statement in self.import_statements(package) {
			let statement_is_type = nodes::children(statement)
				.iter()
				.any(|child| child.kind() == "type");
			if statement_is_type && !type_only {
				continue;
			}

			let Some(named) = import_clause(statement).and_then(|clause| {
				nodes::named_children(clause)
					.into_iter()
					.find(|part| part.kind() == "named_imports")
			}) else {
				continue;
			};

			let specifier = if type_only && !statement_is_type {
				format!("type {symbol}")
			} else {
				symbol.to_string()
			};

			return match nodes::named_children(named).last() {
				Some(last) => TextEdit::insert(last.end_byte(), format!(", {specifier}")),
				None => TextEdit::insert(named.start_byte() + 1, format!(" {specifier} ")),
			};
		}

		let quote = self.preferred_quote();
		let semi = if self.uses_semicolons() { ";" } else { "" };
		let keyword = if type_only { "import type" } else { "import" };
		let statement = format!("{keyword} {{ {symbol} }} from {quote}{package}{quote}{semi}");

		let last_import = nodes::named_children(self.root())
			.into_iter()
			.rev()
			.find(|node| node.kind() == "import_statement");

		match last_import {
			Some(node) => TextEdit::insert(node.end_byte(), format!("\n{statement}")),
			None => self.leading_statement(statement),
		}
	}

	fn plan_require(&self, package: &str, symbol: &str) -> TextEdit {
		if let Some(pattern) = self.require_patterns(package).into_iter().next() {
			if let Some(last) = nodes::named_children(pattern).last() {
				return TextEdit::insert(last.end_byte(), format!(", {symbol}"));
			}
		}

		let quote = self.preferred_quote();
		let semi = if self.uses_semicolons() { ";" } else { "" };
		let statement = format!("const {{ {symbol} }} = require({quote}{package}{quote}){semi}");

		let last_require = nodes::named_children(self.root())
			.into_iter()
			.rev()
			.find(|node| self.requires_anything(*node));

		match last_require {
			Some(node) => TextEdit::insert(node.end_byte(), format!("\n{statement}")),
			None => self.leading_statement(statement),
		}
	}

	/// Insert `statement` on its own line before the first real statement,
	/// after any hashbang, leading comments and directive prologue.
	fn leading_statement(&self, statement: String) -> TextEdit {
		let first = nodes::named_children(self.root()).into_iter().find(|node| {
			node.kind() != "hash_bang_line" && !self.is_directive(*node)
		});

		match first {
			Some(node) => TextEdit::insert(node.start_byte(), format!("{statement}\n")),
			None => {
				let separator = if self.source.is_empty() || self.source.ends_with('\n') {
					""
				} else {
					"\n"
				};
				TextEdit::insert(self.source.len(), format!("{separator}{statement}\n"))
			}
		}
	}

	fn is_directive(&self, node: Node<'_>) -> bool {
		node.kind() == "expression_statement"
			&& nodes::named_children(node)
				.first()
				.is_some_and(|expression| expression.kind() == "string")
	}

	fn import_statements(&self, package: &str) -> Vec<Node<'_>> {
		nodes::named_children(self.root())
			.into_iter()
			.filter(|node| node.kind() == "import_statement")
			.filter(|node| {
				node.child_by_field_name("source")
					.and_then(|source| nodes::string_value(&self.source, source))
					== Some(package)
			})
			.collect()
	}

	fn binds_unaliased(&self, specifier: Node<'_>, symbol: &str) -> bool {
		if specifier.kind() != "import_specifier" {
			return false;
		}

		let named = specifier
			.child_by_field_name("name")
			.is_some_and(|name| self.text(name) == symbol);
		let alias_ok = specifier
			.child_by_field_name("alias")
			.is_none_or(|alias| self.text(alias) == symbol);

		named && alias_ok
	}

	/// Object patterns of top-level `const { .. } = require('package')`
	/// declarations.
	fn require_patterns(&self, package: &str) -> Vec<Node<'_>> {
		let mut patterns = Vec::new();
		for statement in nodes::named_children(self.root()) {
			if !matches!(statement.kind(), "lexical_declaration" | "variable_declaration") {
				continue;
			}

			for declarator in nodes::named_children(statement) {
				let Some(value) = declarator.child_by_field_name("value") else {
					continue;
				};
				if self.required_package(value) != Some(package) {
					continue;
				}

				if let Some(name) = declarator.child_by_field_name("name") {
					if name.kind() == "object_pattern" {
						patterns.push(name);
					}
				}
			}
		}

		patterns
	}

	fn pattern_binds(&self, pattern: Node<'_>, symbol: &str) -> bool {
		nodes::named_children(pattern).into_iter().any(|property| {
			match property.kind() {
				"shorthand_property_identifier_pattern" => self.text(property) == symbol,
				"pair_pattern" => {
					let key = property.child_by_field_name("key");
					let value = property.child_by_field_name("value");
					key.is_some_and(|key| self.text(key) == symbol)
						&& value.is_some_and(|value| self.text(value) == symbol)
				}
				_ => false,
			}
		})
	}

	/// The package named by `require('...')`, if `value` is such a call.
	fn required_package(&self, value: Node<'_>) -> Option<&str> {
		let call = nodes::unwrap_expression(value);
		if !nodes::is_call_to(&self.source, call, "require") {
			return None;
		}

		nodes::call_arguments(call)
			.first()
			.and_then(|argument| nodes::string_value(&self.source, *argument))
	}

	fn requires_anything(&self, statement: Node<'_>) -> bool {
		matches!(statement.kind(), "lexical_declaration" | "variable_declaration")
			&& nodes::named_children(statement).into_iter().any(|declarator| {
				declarator
					.child_by_field_name("value")
					.is_some_and(|value| self.required_package(value).is_some())
			})
	}

	/// The quote character used by the first import or require source, or the
	/// first string literal in the file. Defaults to single quotes.
	fn preferred_quote(&self) -> char {
		let root = self.root();
		let from_modules = nodes::named_children(root).into_iter().find_map(|node| {
			if node.kind() == "import_statement" {
				return node.child_by_field_name("source");
			}

			if matches!(node.kind(), "lexical_declaration" | "variable_declaration") {
				return nodes::named_children(node).into_iter().find_map(|declarator| {
					let value = nodes::unwrap_expression(declarator.child_by_field_name("value")?);
					nodes::is_call_to(&self.source, value, "require")
						.then(|| nodes::call_arguments(value).into_iter().next())
						.flatten()
						.filter(|argument| argument.kind() == "string")
				});
			}

			None
		});

		let literal = from_modules.or_else(|| first_string(root));
		match literal.map(|node| self.text(node)) {
			Some(text) if text.starts_with('"') => '"',
			_ => '\'',
		}
	}

	/// Whether the file terminates its statements with semicolons, judged by
	/// the first import, declaration or expression statement.
	fn uses_semicolons(&self) -> bool {
		nodes::named_children(self.root())
			.into_iter()
			.find(|node| {
				matches!(
					node.kind(),
					"import_statement"
						| "lexical_declaration"
						| "variable_declaration"
						| "expression_statement"
				)
			})
			.is_none_or(|node| self.text(node).ends_with(';'))
	}
}

fn import_clause(statement: Node<'_>) -> Option<Node<'_>> {
	nodes::named_children(statement)
		.into_iter()
		.find(|child| child.kind() == "import_clause")
}

fn first_string(root: Node<'_>) -> Option<Node<'_>> {
	let mut stack = vec![root];
	while let Some(node) = stack.pop() {
		if node.kind() == "string" {
			return Some(node);
		}

		let mut kids = nodes::named_children(node);
		kids.reverse();
		stack.extend(kids);
	}

	None
}

fn parse_tree(source: &str, dialect: Dialect) -> CodemodResult<Tree> {
	let mut parser = Parser::new();
	parser
		.set_language(&dialect.language())
		.map_err(|error| CodemodError::Grammar(error.to_string()))?;

	let Some(tree) = parser.parse(source, None) else {
		return Err(CodemodError::Grammar("the parser produced no tree".to_string()));
	};

	if let Some(node) = first_error(tree.root_node()) {
		let position = node.start_position();
		return Err(CodemodError::Parse {
			line: position.row + 1,
			column: position.column + 1,
		});
	}

	Ok(tree)
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
	if !root.has_error() {
		return None;
	}

	let mut stack = vec![root];
	while let Some(node) = stack.pop() {
		if node.is_error() || node.is_missing() {
			return Some(node);
		}

		if !node.has_error() {
			continue;
		}

		let mut cursor = node.walk();
		let kids: Vec<_> = node.children(&mut cursor).collect();
		stack.extend(kids.into_iter().rev());
	}

	Some(root)
}

/// A JSON config file (`.parcelrc`). Key order is preserved on output.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
	value: Value,
}

impl JsonDocument {
	pub fn parse(source: &str) -> CodemodResult<Self> {
		serde_json::from_str(source)
			.map(|value| Self { value })
			.map_err(|error| CodemodError::JsonParse(error.to_string()))
	}

	pub fn value(&self) -> &Value {
		&self.value
	}

	pub fn value_mut(&mut self) -> &mut Value {
		&mut self.value
	}

	/// Pretty-printed JSON with two-space indentation and a trailing newline.
	pub fn serialize(&self) -> CodemodResult<String> {
		let mut output = serde_json::to_string_pretty(&self.value)
			.map_err(|error| CodemodError::JsonParse(error.to_string()))?;
		output.push('\n');

		Ok(output)
	}
}

/// A parsed config file of either format.
#[derive(Debug, Clone)]
pub enum Document {
	Script(SyntaxTree),
	Json(JsonDocument),
}

impl Document {
	/// Parse `source` as the given format, taking the script dialect from
	/// `path`.
	pub fn parse(source: &str, path: &Path, format: ConfigFormat) -> CodemodResult<Self> {
		match format {
			ConfigFormat::Script => {
				SyntaxTree::parse(source, Dialect::from_path(path)).map(Self::Script)
			}
			ConfigFormat::Json => JsonDocument::parse(source).map(Self::Json),
		}
	}

	pub fn serialize(&self) -> CodemodResult<String> {
		match self {
			Self::Script(tree) => Ok(tree.serialize()),
			Self::Json(document) => document.serialize(),
		}
	}
}
