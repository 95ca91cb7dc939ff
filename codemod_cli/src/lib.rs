use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
	name = "zephyr-codemod",
	author,
	version,
	about = "Automatically add the withZephyr plugin to your bundler configuration files.",
	long_about = "zephyr-codemod finds bundler configuration files in a project and edits them \
	              in place so they load the matching Zephyr plugin.\n\nIt adds the plugin import \
	              and registers `withZephyr()` in the shape each build tool expects: a plugins \
	              array, a `defineConfig` call, a wrapped export or a Parcel reporter.\n\nSupported \
	              build tools: webpack, rspack, repack, vite, rollup, rolldown, rsbuild, modernjs, \
	              rspress and parcel. Run with `--list-bundlers` for the file names each one \
	              uses."
)]
#[allow(clippy::struct_excessive_bools)]
pub struct CodemodCli {
	/// Directory to search for bundler configuration files.
	#[arg(default_value = ".")]
	pub directory: PathBuf,

	/// Show what would be changed without modifying files.
	#[arg(long, short, default_value_t = false)]
	pub dry_run: bool,

	/// Only process the named build tools (for example `-b vite webpack`).
	#[arg(long, short, value_name = "NAME", num_args = 1..)]
	pub bundlers: Option<Vec<String>>,

	/// Print a unified diff for every file that is (or would be) changed.
	#[arg(long, default_value_t = false)]
	pub diff: bool,

	/// List the supported build tools and exit.
	#[arg(long, default_value_t = false)]
	pub list_bundlers: bool,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}
