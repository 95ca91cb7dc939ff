use std::io;
use std::path::Path;
use std::process;

use clap::Parser;
use codemod_cli::CodemodCli;
use codemod_core::Catalog;
use codemod_core::CodemodConfig;
use codemod_core::DiscoverOptions;
use codemod_core::FileOutcome;
use codemod_core::FileReport;
use codemod_core::RunOptions;
use codemod_core::discover;
use codemod_core::missing_packages;
use codemod_core::run;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,blue) => {
		if color_enabled() {
			format!("{}", $text.blue())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,cyan) => {
		if color_enabled() {
			format!("{}", $text.cyan())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
	let args = CodemodCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = if args.list_bundlers {
		run_list(&args).map(|()| 0)
	} else {
		run_codemod(&args)
	};

	match result {
		Ok(code) => process::exit(code),
		Err(e) => {
			// Render core errors through miette for the error code and help
			// text.
			match e.downcast::<codemod_core::CodemodError>() {
				Ok(codemod_err) => {
					let report: miette::Report = (*codemod_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let level = if verbose { "debug" } else { "off" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_ansi(use_color)
		.with_writer(io::stderr)
		.init();
}

/// The built-in catalog plus the config file's entries, restricted to the
/// requested build tools. `--bundlers` overrides the config file's list.
fn load_catalog(args: &CodemodCli, config: &CodemodConfig) -> CliResult<Catalog> {
	let mut catalog = Catalog::builtin()?;
	config.apply_to(&mut catalog)?;

	let selected = match &args.bundlers {
		Some(names) => names.as_slice(),
		None => config.bundlers.as_slice(),
	};

	if selected.is_empty() {
		Ok(catalog)
	} else {
		Ok(catalog.select(selected)?)
	}
}

fn load_config(root: &Path) -> CliResult<CodemodConfig> {
	Ok(CodemodConfig::load(root)?.unwrap_or_default())
}

fn run_list(args: &CodemodCli) -> CliResult<()> {
	let config = load_config(&args.directory)?;
	let catalog = load_catalog(args, &config)?;

	println!("{}", colored!("Supported bundlers:", bold));
	println!();
	for bundler in catalog.bundlers() {
		println!(
			"  {} {}",
			colored!(format!("{:<10}", bundler.name), green),
			bundler.config.plugin
		);
		println!(
			"  {:<10} {}",
			"",
			colored!(bundler.config.files.join(", "), dimmed)
		);
	}

	Ok(())
}

fn run_codemod(args: &CodemodCli) -> CliResult<i32> {
	let root = args.directory.as_path();
	let config = load_config(root)?;
	let catalog = load_catalog(args, &config)?;

	let shown_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
	println!(
		"{}",
		colored!("🚀 Zephyr Codemod - Adding withZephyr to bundler configs", bold)
	);
	println!(
		"{}",
		colored!(format!("Directory: {}", shown_root.display()), dimmed)
	);
	if args.dry_run {
		println!(
			"{}",
			colored!("🔍 Dry run mode - no files will be modified", yellow)
		);
	}
	println!();

	let options = DiscoverOptions::from_config(&config);
	let files = discover(root, &catalog, &options)?;
	debug!(count = files.len(), "discovered config files");

	if files.is_empty() {
		println!(
			"{}",
			colored!("No bundler configuration files found.", yellow)
		);
		return Ok(0);
	}

	println!(
		"{}",
		colored!(
			format!("Found {} configuration file(s):", files.len()),
			blue
		)
	);
	println!();

	let report = run(
		&files,
		&RunOptions {
			dry_run: args.dry_run,
		},
	);

	for file in &report.files {
		print_file_report(file, root, args.diff);
	}

	let summary = report.summary();
	println!();
	println!("{}", colored!("Summary:", bold));
	println!("{} Processed: {}", colored!("✓", green), summary.transformed);
	println!("{} Skipped: {}", colored!("⏭", dimmed), summary.skipped);
	println!("{} Errors: {}", colored!("✗", red), summary.errors);
	if summary.parse_failures > 0 {
		println!(
			"{} Unparseable: {}",
			colored!("⚠", yellow),
			summary.parse_failures
		);
	}

	if args.dry_run && summary.transformed > 0 {
		println!();
		println!(
			"{}",
			colored!("Run without --dry-run to apply changes.", yellow)
		);
	}

	let missing = missing_packages(
		root,
		summary.required_plugins.iter().map(String::as_str),
	);
	if !missing.is_empty() {
		println!();
		println!(
			"{}",
			colored!("💡 Tip: install the missing plugin packages:", blue)
		);
		for package in missing {
			println!("  {}", colored!(package, dimmed));
		}
	}

	Ok(i32::from(summary.has_errors()))
}

fn print_file_report(file: &FileReport, root: &Path, show_diff: bool) {
	let rel_path = make_relative(&file.path, root);
	match &file.outcome {
		FileOutcome::Transformed { transform } => {
			println!(
				"{}",
				colored!(format!("✓ Added withZephyr to {rel_path}"), green)
			);
			debug!(path = %rel_path, %transform, "applied transform");

			if show_diff {
				if let (Some(original), Some(updated)) = (&file.original, &file.updated) {
					print_diff(&rel_path, original, updated);
				}
			}
		}
		FileOutcome::AlreadyPresent => {
			println!(
				"{}",
				colored!(
					format!("⏭ Skipping {rel_path} (already has withZephyr)"),
					dimmed
				)
			);
		}
		FileOutcome::UnmatchedBundler => {
			println!(
				"{}",
				colored!(
					format!("⏭ Skipping {rel_path} (not a {} config)", file.bundler),
					dimmed
				)
			);
		}
		FileOutcome::Failed(error) if error.is_parse_failure() => {
			println!(
				"{}",
				colored!(
					format!("⚠ Warning: could not parse {rel_path}: {error}"),
					yellow
				)
			);
		}
		FileOutcome::Failed(error) => {
			println!(
				"{}",
				colored!(format!("✗ Error transforming {rel_path}: {error}"), red)
			);
		}
		_ => {}
	}
}

/// Print a unified diff between the file before and after the edit.
fn print_diff(rel_path: &str, original: &str, updated: &str) {
	let diff = TextDiff::from_lines(original, updated);
	println!("{}", colored!(format!("--- a/{rel_path}"), red));
	println!("{}", colored!(format!("+++ b/{rel_path}"), green));

	for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
		println!("{}", colored!(hunk.header(), cyan));
		for change in hunk.iter_changes() {
			match change.tag() {
				ChangeTag::Delete => print!("{}", colored!(format!("-{change}"), red)),
				ChangeTag::Insert => print!("{}", colored!(format!("+{change}"), green)),
				ChangeTag::Equal => print!(" {change}"),
			}
			if change.missing_newline() {
				println!();
			}
		}
	}
	println!();
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
