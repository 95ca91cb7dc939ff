use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
#[allow(variant_size_differences)]
pub enum CodemodError {
	#[error(transparent)]
	#[diagnostic(code(codemod::io_error))]
	Io(#[from] std::io::Error),

	#[error("syntax error at line {line}, column {column}")]
	#[diagnostic(
		code(codemod::parse),
		help("the file must be valid JavaScript or TypeScript before it can be transformed")
	)]
	Parse { line: usize, column: usize },

	#[error("failed to parse JSON config: {0}")]
	#[diagnostic(code(codemod::json_parse))]
	JsonParse(String),

	#[error("unsupported config shape: {0}")]
	#[diagnostic(
		code(codemod::unsupported_shape),
		help("add the plugin call manually or restructure the config into a recognized shape")
	)]
	UnsupportedShape(String),

	#[error("edit would leave the file unparsable (line {line}, column {column})")]
	#[diagnostic(code(codemod::invalid_edit))]
	InvalidEdit { line: usize, column: usize },

	#[error("failed to write `{path}`: {reason}")]
	#[diagnostic(code(codemod::write))]
	Write { path: String, reason: String },

	#[error("no transform patterns are configured for bundler `{0}`")]
	#[diagnostic(code(codemod::no_pattern))]
	NoPattern(String),

	#[error("unknown bundler: `{0}`")]
	#[diagnostic(
		code(codemod::unknown_bundler),
		help("run `zephyr-codemod --list-bundlers` to see the supported bundlers")
	)]
	UnknownBundler(String),

	#[error("invalid matcher `{pattern}`: {reason}")]
	#[diagnostic(code(codemod::invalid_matcher))]
	InvalidMatcher { pattern: String, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(codemod::config_parse),
		help("check that zephyr-codemod.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("failed to load grammar: {0}")]
	#[diagnostic(code(codemod::grammar))]
	Grammar(String),
}

impl CodemodError {
	/// Whether this error means the file could not be read as source at all.
	/// These are reported as warnings and counted apart from other failures.
	pub fn is_parse_failure(&self) -> bool {
		matches!(self, Self::Parse { .. } | Self::JsonParse(_))
	}
}

pub type CodemodResult<T> = Result<T, CodemodError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
