use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::CodemodError;
use crate::CodemodResult;
use crate::ConfigFile;
use crate::Document;
use crate::TransformKind;
use crate::apply_transform;
use crate::detect;
use crate::guard::already_present;

/// Options for a codemod run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
	/// Compute the changes without writing them.
	pub dry_run: bool,
}

/// What happened to one config file.
#[derive(Debug)]
#[non_exhaustive]
#[allow(variant_size_differences)]
pub enum FileOutcome {
	/// The plugin was added (or would be, in a dry run).
	Transformed { transform: TransformKind },
	/// The file already calls the plugin factory.
	AlreadyPresent,
	/// The file name matched but its contents belong to another build tool.
	UnmatchedBundler,
	Failed(CodemodError),
}

/// The result of processing one [`ConfigFile`].
#[derive(Debug)]
pub struct FileReport {
	pub path: PathBuf,
	pub bundler: String,
	/// The package the build tool's plugin comes from.
	pub plugin: String,
	pub outcome: FileOutcome,
	/// The file contents before the edit, when transformed.
	pub original: Option<String>,
	/// The file contents after the edit, when transformed.
	pub updated: Option<String>,
}

impl FileReport {
	pub fn is_transformed(&self) -> bool {
		matches!(self.outcome, FileOutcome::Transformed { .. })
	}

	pub fn is_skipped(&self) -> bool {
		matches!(
			self.outcome,
			FileOutcome::AlreadyPresent | FileOutcome::UnmatchedBundler
		)
	}

	pub fn is_parse_failure(&self) -> bool {
		matches!(&self.outcome, FileOutcome::Failed(error) if error.is_parse_failure())
	}

	pub fn is_error(&self) -> bool {
		matches!(&self.outcome, FileOutcome::Failed(error) if !error.is_parse_failure())
	}
}

/// The results of a run, in processing order.
#[derive(Debug, Default)]
pub struct RunReport {
	pub files: Vec<FileReport>,
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
	pub transformed: usize,
	pub skipped: usize,
	pub errors: usize,
	pub parse_failures: usize,
	/// Plugin packages the transformed files now import.
	pub required_plugins: BTreeSet<String>,
}

impl RunSummary {
	pub fn has_errors(&self) -> bool {
		self.errors > 0
	}
}

impl RunReport {
	pub fn summary(&self) -> RunSummary {
		let mut summary = RunSummary::default();
		for report in &self.files {
			match &report.outcome {
				FileOutcome::Transformed { .. } => {
					summary.transformed += 1;
					summary.required_plugins.insert(report.plugin.clone());
				}
				FileOutcome::AlreadyPresent | FileOutcome::UnmatchedBundler => {
					summary.skipped += 1;
				}
				FileOutcome::Failed(error) if error.is_parse_failure() => {
					summary.parse_failures += 1;
				}
				FileOutcome::Failed(_) => summary.errors += 1,
			}
		}

		summary
	}
}

/// Process every entry in order. Each entry re-reads its file, so a file
/// listed for two build tools sees the first tool's edit.
pub fn run(files: &[ConfigFile<'_>], options: &RunOptions) -> RunReport {
	RunReport {
		files: files.iter().map(|file| process_file(file, options)).collect(),
	}
}

#[allow(variant_size_differences)]
enum Processed {
	Skipped(FileOutcome),
	Transformed {
		transform: TransformKind,
		original: String,
		updated: String,
	},
}

/// Read, guard, detect, transform and (unless dry-running) write one file.
/// Failures are captured in the report rather than returned.
pub fn process_file(file: &ConfigFile<'_>, options: &RunOptions) -> FileReport {
	let mut report = FileReport {
		path: file.path.clone(),
		bundler: file.bundler.to_string(),
		plugin: file.config.plugin.clone(),
		outcome: FileOutcome::AlreadyPresent,
		original: None,
		updated: None,
	};

	match transform_file(file, options) {
		Ok(Processed::Skipped(outcome)) => report.outcome = outcome,
		Ok(Processed::Transformed {
			transform,
			original,
			updated,
		}) => {
			report.outcome = FileOutcome::Transformed { transform };
			report.original = Some(original);
			report.updated = Some(updated);
		}
		Err(failure) => {
			if failure.is_parse_failure() {
				warn!(path = %file.path.display(), error = %failure, "could not parse config file");
			} else {
				error!(path = %file.path.display(), error = %failure, "failed to transform config file");
			}
			report.outcome = FileOutcome::Failed(failure);
		}
	}

	report
}

fn transform_file(file: &ConfigFile<'_>, options: &RunOptions) -> CodemodResult<Processed> {
	let config = file.config;
	debug!(path = %file.path.display(), bundler = file.bundler, "processing config file");

	let original = std::fs::read_to_string(&file.path)?;
	let mut document = Document::parse(&original, &file.path, config.format)?;

	// Ownership is decided before the guard so the outcome depends only on
	// the file's text, whether or not another entry already edited it.
	if !config.matches_marker(&original) {
		debug!(path = %file.path.display(), bundler = file.bundler, "file belongs to another build tool");
		return Ok(Processed::Skipped(FileOutcome::UnmatchedBundler));
	}

	if already_present(&document, config) {
		debug!(path = %file.path.display(), "plugin already present");
		return Ok(Processed::Skipped(FileOutcome::AlreadyPresent));
	}

	let pattern = detect(&original, &config.patterns)
		.ok_or_else(|| CodemodError::NoPattern(file.bundler.to_string()))?;
	debug!(path = %file.path.display(), transform = %pattern.transform, "detected config shape");

	if let Document::Script(tree) = &mut document {
		tree.insert_import(&config.plugin, &config.import_name)?;
	}
	apply_transform(pattern.transform, &mut document, config)?;
	let updated = document.serialize()?;

	if options.dry_run {
		debug!(path = %file.path.display(), "dry run, not writing");
	} else {
		std::fs::write(&file.path, &updated).map_err(|e| {
			CodemodError::Write {
				path: file.path.display().to_string(),
				reason: e.to_string(),
			}
		})?;
	}

	Ok(Processed::Transformed {
		transform: pattern.transform,
		original,
		updated,
	})
}
