use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobMatcher;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::BundlerConfig;
use crate::Catalog;
use crate::CodemodConfig;
use crate::CodemodError;
use crate::CodemodResult;

/// Options for controlling how a project is searched for config files.
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
	/// Gitignore-style patterns to exclude.
	pub exclude_patterns: Vec<String>,
	/// When true, `.gitignore` files are not used for filtering.
	pub disable_gitignore: bool,
}

impl DiscoverOptions {
	pub fn from_config(config: &CodemodConfig) -> Self {
		Self {
			exclude_patterns: config.exclude.patterns.clone(),
			disable_gitignore: config.disable_gitignore,
		}
	}
}

/// A config file paired with the catalog entry it was matched by.
#[derive(Debug, Clone)]
pub struct ConfigFile<'a> {
	pub path: PathBuf,
	pub bundler: &'a str,
	pub config: &'a BundlerConfig,
}

/// Find every config file below `root` whose file name matches a catalog
/// glob.
///
/// Entries come in catalog order, then glob order, then path order. A file
/// matched by two build tools is listed once per tool; a file matched by two
/// globs of the same tool is listed once.
pub fn discover<'a>(
	root: &Path,
	catalog: &'a Catalog,
	options: &DiscoverOptions,
) -> CodemodResult<Vec<ConfigFile<'a>>> {
	if !root.is_dir() {
		return Err(CodemodError::Io(std::io::Error::new(
			std::io::ErrorKind::NotFound,
			format!("`{}` is not a directory", root.display()),
		)));
	}

	let files = collect_files(root, &options.exclude_patterns, options.disable_gitignore)?;
	let mut found = Vec::new();

	for bundler in catalog.bundlers() {
		let mut seen = HashSet::new();
		for pattern in &bundler.config.files {
			let matcher = file_matcher(pattern)?;
			for path in &files {
				let matched = path
					.file_name()
					.is_some_and(|name| matcher.is_match(Path::new(name)));
				if matched && seen.insert(path) {
					tracing::debug!(path = %path.display(), bundler = %bundler.name, "found config file");
					found.push(ConfigFile {
						path: path.clone(),
						bundler: &bundler.name,
						config: &bundler.config,
					});
				}
			}
		}
	}

	Ok(found)
}

fn file_matcher(pattern: &str) -> CodemodResult<GlobMatcher> {
	Glob::new(pattern)
		.map(|glob| glob.compile_matcher())
		.map_err(|e| {
			CodemodError::InvalidMatcher {
				pattern: pattern.to_string(),
				reason: e.to_string(),
			}
		})
}

/// Build a `Gitignore` matcher from the `[exclude]` patterns. These follow
/// `.gitignore` syntax and are applied on top of any `.gitignore` rules.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> CodemodResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			CodemodError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| CodemodError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		if let Some(error) = builder.add(&gitignore_path) {
			tracing::warn!(path = %gitignore_path.display(), %error, "could not read .gitignore");
		}
	}
	builder.build().unwrap_or_else(|error| {
		tracing::warn!(%error, "could not build .gitignore rules, ignoring them");
		Gitignore::empty()
	})
}

/// Collect every file below `root`, sorted.
fn collect_files(
	root: &Path,
	exclude_patterns: &[String],
	disable_gitignore: bool,
) -> CodemodResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();

	let gitignore = if disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, exclude_patterns)?;

	walk_dir(root, &mut files, &gitignore, &custom_exclude, &mut visited_dirs)?;
	files.sort();
	Ok(files)
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules"
}

fn walk_dir(
	dir: &Path,
	files: &mut Vec<PathBuf>,
	gitignore: &Gitignore,
	custom_exclude: &Gitignore,
	visited_dirs: &mut HashSet<PathBuf>,
) -> CodemodResult<()> {
	// Symlinked directories can loop back onto an ancestor.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		tracing::debug!(path = %dir.display(), "skipping already visited directory");
		return Ok(());
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		let is_dir = path.is_dir();

		if is_dir
			&& path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(is_ignored_directory_name)
		{
			continue;
		}

		if gitignore.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if custom_exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			walk_dir(&path, files, gitignore, custom_exclude, visited_dirs)?;
		} else if path.is_file() {
			files.push(path);
		}
	}

	Ok(())
}
