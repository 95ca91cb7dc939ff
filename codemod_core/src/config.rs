use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::Bundler;
use crate::BundlerConfig;
use crate::BundlerPattern;
use crate::Catalog;
use crate::CodemodError;
use crate::CodemodResult;
use crate::ConfigFormat;
use crate::DEFAULT_IMPORT_NAME;
use crate::TransformKind;
use crate::catalog::compile;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["zephyr-codemod.toml", ".zephyr-codemod.toml"];

/// Configuration loaded from a `zephyr-codemod.toml` file.
///
/// ```toml
/// bundlers = ["vite", "webpack"]
/// disable_gitignore = false
///
/// [exclude]
/// patterns = ["legacy/", "*.old.js"]
///
/// [bundler.custom]
/// files = ["custom.config.js"]
/// plugin = "zephyr-webpack-plugin"
/// patterns = [{ matcher = "plugins:\\s*\\[", transform = "plugins-array" }]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CodemodConfig {
	/// Only process these build tools. Empty means all of them.
	#[serde(default)]
	pub bundlers: Vec<String>,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Catalog entries to add, or to replace when a name is already built in.
	#[serde(default)]
	pub bundler: BTreeMap<String, CustomBundler>,
}

/// Configuration for excluding files and directories from discovery.
///
/// Patterns follow gitignore syntax and are applied on top of any
/// `.gitignore` rules (unless `disable_gitignore` is set).
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Examples: `"legacy/"`, `"*.old.js"`, `"!keep.config.js"`.
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// A user-defined catalog entry from a `[bundler.<name>]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomBundler {
	pub files: Vec<String>,
	pub plugin: String,
	#[serde(default = "default_import_name")]
	pub import_name: String,
	#[serde(default)]
	pub format: ConfigFormat,
	#[serde(default)]
	pub marker: Option<String>,
	/// Files matching this regex are left to another build tool.
	#[serde(default)]
	pub exclude_marker: Option<String>,
	pub patterns: Vec<CustomPattern>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomPattern {
	pub matcher: String,
	pub transform: TransformKind,
}

fn default_import_name() -> String {
	DEFAULT_IMPORT_NAME.to_string()
}

impl CodemodConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is no config file.
	pub fn load(root: &Path) -> CodemodResult<Option<Self>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		Self::parse(&content).map(Some)
	}

	pub fn parse(content: &str) -> CodemodResult<Self> {
		toml::from_str(content).map_err(|e| CodemodError::ConfigParse(e.to_string()))
	}

	/// Add the `[bundler.*]` entries to `catalog`, in name order.
	pub fn apply_to(&self, catalog: &mut Catalog) -> CodemodResult<()> {
		for (name, custom) in &self.bundler {
			catalog.insert(Bundler {
				name: name.clone(),
				config: custom.compile()?,
			});
		}

		Ok(())
	}
}

impl CustomBundler {
	/// Compile the matchers into a catalog entry.
	pub fn compile(&self) -> CodemodResult<BundlerConfig> {
		let patterns = self
			.patterns
			.iter()
			.map(|pattern| BundlerPattern::new(&pattern.matcher, pattern.transform))
			.collect::<CodemodResult<Vec<_>>>()?;
		let marker = self.marker.as_deref().map(compile).transpose()?;
		let exclude_marker = self.exclude_marker.as_deref().map(compile).transpose()?;

		Ok(BundlerConfig {
			files: self.files.clone(),
			plugin: self.plugin.clone(),
			import_name: self.import_name.clone(),
			format: self.format,
			marker,
			exclude_marker,
			patterns,
		})
	}
}
