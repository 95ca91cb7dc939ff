use regex::Regex;
use serde::Deserialize;

use crate::CodemodError;
use crate::CodemodResult;
use crate::TransformKind;

/// The symbol every built-in plugin package exports.
pub const DEFAULT_IMPORT_NAME: &str = "withZephyr";

/// How a config file is parsed.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
	/// JavaScript or TypeScript source.
	#[default]
	Script,
	/// A JSON document (`.parcelrc`).
	Json,
}

/// A raw-text matcher paired with the transform to run when it matches.
#[derive(Debug, Clone)]
pub struct BundlerPattern {
	pub matcher: Regex,
	pub transform: TransformKind,
}

impl BundlerPattern {
	pub fn new(matcher: &str, transform: TransformKind) -> CodemodResult<Self> {
		Ok(Self {
			matcher: compile(matcher)?,
			transform,
		})
	}
}

/// Everything the engine needs to know about one build tool.
#[derive(Debug, Clone)]
pub struct BundlerConfig {
	/// File-name globs, in discovery order.
	pub files: Vec<String>,
	/// The package that provides the plugin factory.
	pub plugin: String,
	/// The symbol bound by the inserted import or require.
	pub import_name: String,
	pub format: ConfigFormat,
	/// When set, files whose raw text does not match are skipped as belonging
	/// to another tool.
	pub marker: Option<Regex>,
	/// When set, files whose raw text matches are skipped as belonging to
	/// another build tool that shares this tool's file names.
	pub exclude_marker: Option<Regex>,
	/// Recognized shapes, first match wins.
	pub patterns: Vec<BundlerPattern>,
}

impl BundlerConfig {
	/// Whether the raw text belongs to this build tool: the marker (if any)
	/// matches and the exclude marker (if any) does not.
	pub fn matches_marker(&self, raw: &str) -> bool {
		let claimed = self
			.marker
			.as_ref()
			.is_none_or(|marker| marker.is_match(raw));
		let excluded = self
			.exclude_marker
			.as_ref()
			.is_some_and(|marker| marker.is_match(raw));

		claimed && !excluded
	}
}

/// A named catalog entry.
#[derive(Debug, Clone)]
pub struct Bundler {
	pub name: String,
	pub config: BundlerConfig,
}

/// The registry of supported build tools. Iteration order is significant:
/// it is the order files are discovered and processed in.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
	bundlers: Vec<Bundler>,
}

impl Catalog {
	/// The built-in build tools.
	pub fn builtin() -> CodemodResult<Self> {
		let mut catalog = Self::default();
		for entry in BUILTIN {
			let patterns = entry
				.patterns
				.iter()
				.map(|(matcher, transform)| BundlerPattern::new(matcher, *transform))
				.collect::<CodemodResult<Vec<_>>>()?;
			let marker = entry.marker.map(compile).transpose()?;
			let exclude_marker = entry.exclude_marker.map(compile).transpose()?;

			catalog.insert(Bundler {
				name: entry.name.to_string(),
				config: BundlerConfig {
					files: entry.files.iter().map(ToString::to_string).collect(),
					plugin: entry.plugin.to_string(),
					import_name: DEFAULT_IMPORT_NAME.to_string(),
					format: entry.format,
					marker,
					exclude_marker,
					patterns,
				},
			});
		}

		Ok(catalog)
	}

	pub fn bundlers(&self) -> &[Bundler] {
		&self.bundlers
	}

	pub fn len(&self) -> usize {
		self.bundlers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bundlers.is_empty()
	}

	pub fn get(&self, name: &str) -> Option<&BundlerConfig> {
		self.bundlers
			.iter()
			.find(|bundler| bundler.name == name)
			.map(|bundler| &bundler.config)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.bundlers.iter().map(|bundler| bundler.name.as_str())
	}

	/// Add an entry, replacing an existing entry of the same name in place.
	pub fn insert(&mut self, bundler: Bundler) {
		match self
			.bundlers
			.iter_mut()
			.find(|existing| existing.name == bundler.name)
		{
			Some(existing) => *existing = bundler,
			None => self.bundlers.push(bundler),
		}
	}

	/// A catalog restricted to `names`, keeping catalog order. Fails on the
	/// first unknown name.
	pub fn select<S: AsRef<str>>(&self, names: &[S]) -> CodemodResult<Self> {
		for name in names {
			let name = name.as_ref();
			if self.get(name).is_none() {
				return Err(CodemodError::UnknownBundler(name.to_string()));
			}
		}

		let bundlers = self
			.bundlers
			.iter()
			.filter(|bundler| names.iter().any(|name| name.as_ref() == bundler.name))
			.cloned()
			.collect();

		Ok(Self { bundlers })
	}
}

pub(crate) fn compile(pattern: &str) -> CodemodResult<Regex> {
	Regex::new(pattern).map_err(|error| {
		CodemodError::InvalidMatcher {
			pattern: pattern.to_string(),
			reason: error.to_string(),
		}
	})
}

struct BuiltinEntry {
	name: &'static str,
	files: &'static [&'static str],
	plugin: &'static str,
	format: ConfigFormat,
	marker: Option<&'static str>,
	exclude_marker: Option<&'static str>,
	patterns: &'static [(&'static str, TransformKind)],
}

const EXPORTED_FUNCTION: &str = r"(?m)^\s*(?:export\s+default|module\.exports\s*=)\s*(?:[A-Za-z_$][\w$]*\s*;?\s*$|(?:async\s+)?function\b|(?:async\s+)?\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)";
const EXPORTED_CALLBACK: &str = r"(?:export\s+default|module\.exports\s*=)\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)";
const REPACK_MARKER: &str = r"@callstack/repack";
const PLUGINS_ARRAY: &str = r"plugins\s*:\s*\[";
const DEFINE_CONFIG_OBJECT: &str = r"defineConfig\s*\(\s*\{";
const DEFINE_CONFIG_FUNCTION: &str =
	r"defineConfig\s*\(\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)";

const WEBPACK_PATTERNS: &[(&str, TransformKind)] = &[
	(r"composePlugins\s*\(", TransformKind::ComposePlugins),
	(PLUGINS_ARRAY, TransformKind::PluginsArray),
	(r"module\.exports\s*=", TransformKind::WrapModuleExports),
	(r"export\s+default", TransformKind::WrapExportDefault),
];

const BUILTIN: &[BuiltinEntry] = &[
	BuiltinEntry {
		name: "repack",
		files: &[
			"rspack.config.js",
			"rspack.config.mjs",
			"rspack.config.ts",
			"webpack.config.js",
			"webpack.config.mjs",
			"webpack.config.ts",
		],
		plugin: "zephyr-repack-plugin",
		format: ConfigFormat::Script,
		marker: Some(REPACK_MARKER),
		exclude_marker: None,
		patterns: &[
			(EXPORTED_FUNCTION, TransformKind::WrapExportedFunction),
			(r"export\s+default\s*\{", TransformKind::WrapExportDefault),
		],
	},
	BuiltinEntry {
		name: "webpack",
		files: &[
			"webpack.config.js",
			"webpack.config.ts",
			"webpack.config.mjs",
			"webpack.config.cjs",
		],
		plugin: "zephyr-webpack-plugin",
		format: ConfigFormat::Script,
		marker: None,
		exclude_marker: Some(REPACK_MARKER),
		patterns: WEBPACK_PATTERNS,
	},
	BuiltinEntry {
		name: "rspack",
		files: &[
			"rspack.config.js",
			"rspack.config.ts",
			"rspack.config.mjs",
			"rspack.config.cjs",
		],
		plugin: "zephyr-rspack-plugin",
		format: ConfigFormat::Script,
		marker: None,
		exclude_marker: Some(REPACK_MARKER),
		patterns: WEBPACK_PATTERNS,
	},
	BuiltinEntry {
		name: "vite",
		files: &[
			"vite.config.js",
			"vite.config.ts",
			"vite.config.mjs",
			"vite.config.mts",
		],
		plugin: "vite-plugin-zephyr",
		format: ConfigFormat::Script,
		marker: None,
		exclude_marker: None,
		patterns: &[
			(DEFINE_CONFIG_OBJECT, TransformKind::DefineConfigObject),
			(DEFINE_CONFIG_FUNCTION, TransformKind::DefineConfigFunction),
		],
	},
	BuiltinEntry {
		name: "rollup",
		files: &["rollup.config.js", "rollup.config.ts", "rollup.config.mjs"],
		plugin: "rollup-plugin-zephyr",
		format: ConfigFormat::Script,
		marker: None,
		exclude_marker: None,
		patterns: &[
			(r"export\s+default\s*\[", TransformKind::RollupArrayConfig),
			(EXPORTED_CALLBACK, TransformKind::RollupFunction),
			(PLUGINS_ARRAY, TransformKind::PluginsArray),
		],
	},
	BuiltinEntry {
		name: "rolldown",
		files: &[
			"rolldown.config.js",
			"rolldown.config.ts",
			"rolldown.config.mjs",
		],
		plugin: "zephyr-rolldown-plugin",
		format: ConfigFormat::Script,
		marker: None,
		exclude_marker: None,
		patterns: &[
			(DEFINE_CONFIG_OBJECT, TransformKind::DefineConfigObject),
			(PLUGINS_ARRAY, TransformKind::PluginsArray),
		],
	},
	BuiltinEntry {
		name: "rsbuild",
		files: &["rsbuild.config.js", "rsbuild.config.ts", "rsbuild.config.mjs"],
		plugin: "zephyr-rspack-plugin",
		format: ConfigFormat::Script,
		marker: None,
		exclude_marker: None,
		patterns: &[(PLUGINS_ARRAY, TransformKind::RsbuildPlugin)],
	},
	BuiltinEntry {
		name: "modernjs",
		files: &["modern.config.js", "modern.config.ts"],
		plugin: "zephyr-modernjs-plugin",
		format: ConfigFormat::Script,
		marker: None,
		exclude_marker: None,
		patterns: &[(DEFINE_CONFIG_OBJECT, TransformKind::DefineConfigObject)],
	},
	BuiltinEntry {
		name: "rspress",
		files: &["rspress.config.js", "rspress.config.ts"],
		plugin: "zephyr-rspress-plugin",
		format: ConfigFormat::Script,
		marker: None,
		exclude_marker: None,
		patterns: &[(DEFINE_CONFIG_OBJECT, TransformKind::DefineConfigObject)],
	},
	BuiltinEntry {
		name: "parcel",
		files: &[".parcelrc", ".parcelrc.json"],
		plugin: "parcel-reporter-zephyr",
		format: ConfigFormat::Json,
		marker: None,
		exclude_marker: None,
		patterns: &[(r#""reporters""#, TransformKind::ParcelReporters)],
	},
];
