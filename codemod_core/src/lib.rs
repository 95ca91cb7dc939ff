//! `codemod_core` is the engine behind `zephyr-codemod`. It finds the place
//! where a build-tool config lists its plugins (or exports its config value)
//! and rewrites it in place to also call the Zephyr plugin factory, without
//! duplicating the call and without touching unrelated code.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Config file text
//!   → Syntax layer (tree-sitter JavaScript / TypeScript / TSX, or JSON)
//!   → Idempotency guard (is `withZephyr()` already called?)
//!   → Pattern detector (which known shape is this file?)
//!   → Import insertion (`import { withZephyr } from '…'` or `require`)
//!   → Transform (one bounded edit per shape)
//!   → Serialized text, byte-identical outside the edit
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: The registry of supported build tools, their file globs, plugin packages and recognized shapes.
//! - [`config`]: Configuration loading from `zephyr-codemod.toml`.
//! - [`discovery`]: Directory walking that pairs config files with catalog entries.
//! - [`packages`]: Checks whether a plugin package is already a project dependency.
//!
//! ## Key Types
//!
//! - [`SyntaxTree`]: Source text of one script config with its concrete syntax tree.
//! - [`Document`]: A parsed config, either a script or a JSON document.
//! - [`TransformKind`]: The closed set of shape transforms, each mapped to a handler.
//! - [`Catalog`]: The immutable build-tool registry shared by a run.
//! - [`FileReport`]: What happened to one config file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use codemod_core::Catalog;
//! use codemod_core::DiscoverOptions;
//! use codemod_core::RunOptions;
//! use codemod_core::discover;
//! use codemod_core::run;
//! use std::path::Path;
//!
//! let catalog = Catalog::builtin().unwrap();
//! let files = discover(Path::new("."), &catalog, &DiscoverOptions::default()).unwrap();
//! let report = run(&files, &RunOptions { dry_run: true });
//! let summary = report.summary();
//! println!("{} file(s) would be updated", summary.transformed);
//! ```

pub use catalog::*;
pub use config::*;
pub use detector::*;
pub use discovery::*;
pub use error::*;
pub use guard::*;
pub use packages::*;
pub use runner::*;
pub use syntax::*;
pub use transform::*;

pub mod catalog;
pub mod config;
mod detector;
pub mod discovery;
mod error;
mod guard;
pub(crate) mod nodes;
pub mod packages;
mod runner;
mod syntax;
mod transform;

#[cfg(test)]
mod __fixtures;
