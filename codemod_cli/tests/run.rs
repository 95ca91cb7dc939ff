mod common;

use codemod_core::AnyEmptyResult;
use common::VITE_CONFIG;
use common::VITE_CONFIG_WITH_ZEPHYR;
use common::codemod_cmd;
use common::write_file;
use predicates::prelude::PredicateBooleanExt;

#[test]
fn dry_run_reports_without_writing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "vite.config.ts", VITE_CONFIG)?;

	codemod_cmd()
		.arg(tmp.path())
		.arg("--dry-run")
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"🚀 Zephyr Codemod - Adding withZephyr to bundler configs",
		))
		.stdout(predicates::str::contains("Dry run mode"))
		.stdout(predicates::str::contains("Found 1 configuration file(s):"))
		.stdout(predicates::str::contains("✓ Added withZephyr to vite.config.ts"))
		.stdout(predicates::str::contains("Processed: 1"))
		.stdout(predicates::str::contains("Run without --dry-run to apply changes."));

	let content = std::fs::read_to_string(tmp.path().join("vite.config.ts"))?;
	assert_eq!(content, VITE_CONFIG);

	Ok(())
}

#[test]
fn writes_the_plugin_into_the_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "vite.config.ts", VITE_CONFIG)?;

	codemod_cmd()
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("✓ Added withZephyr to vite.config.ts"))
		.stdout(predicates::str::contains("Errors: 0"))
		.stdout(predicates::str::contains("Run without --dry-run").not())
		.stdout(predicates::str::contains("Tip: install the missing plugin packages"))
		.stdout(predicates::str::contains("  vite-plugin-zephyr"));

	let content = std::fs::read_to_string(tmp.path().join("vite.config.ts"))?;
	similar_asserts::assert_eq!(content, VITE_CONFIG_WITH_ZEPHYR);

	Ok(())
}

#[test]
fn second_run_skips_the_updated_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "vite.config.ts", VITE_CONFIG)?;

	codemod_cmd().arg(tmp.path()).assert().success();
	codemod_cmd()
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"⏭ Skipping vite.config.ts (already has withZephyr)",
		))
		.stdout(predicates::str::contains("Processed: 0"))
		.stdout(predicates::str::contains("Skipped: 1"));

	let content = std::fs::read_to_string(tmp.path().join("vite.config.ts"))?;
	assert_eq!(content, VITE_CONFIG_WITH_ZEPHYR);

	Ok(())
}

#[test]
fn diff_shows_the_added_lines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "vite.config.ts", VITE_CONFIG)?;

	codemod_cmd()
		.arg(tmp.path())
		.args(["--dry-run", "--diff"])
		.assert()
		.success()
		.stdout(predicates::str::contains("--- a/vite.config.ts"))
		.stdout(predicates::str::contains("+++ b/vite.config.ts"))
		.stdout(predicates::str::contains(
			"+import { withZephyr } from 'vite-plugin-zephyr';",
		))
		.stdout(predicates::str::contains("-  plugins: [react()],"))
		.stdout(predicates::str::contains("+  plugins: [react(), withZephyr()],"));

	Ok(())
}

#[test]
fn file_errors_exit_with_one() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), ".parcelrc", "{\"reporters\": \"nope\"}\n")?;
	write_file(tmp.path(), "vite.config.ts", VITE_CONFIG)?;

	codemod_cmd()
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("✗ Error transforming .parcelrc"))
		.stdout(predicates::str::contains("✓ Added withZephyr to vite.config.ts"))
		.stdout(predicates::str::contains("Errors: 1"));

	Ok(())
}

#[test]
fn parse_failures_are_warnings() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "vite.config.ts", "export default defineConfig({\n")?;

	codemod_cmd()
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("could not parse vite.config.ts"))
		.stdout(predicates::str::contains("Errors: 0"))
		.stdout(predicates::str::contains("Unparseable: 1"));

	Ok(())
}

#[test]
fn unknown_bundler_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "vite.config.ts", VITE_CONFIG)?;

	codemod_cmd()
		.arg(tmp.path())
		.args(["--bundlers", "esbuild"])
		.assert()
		.code(2)
		.stderr(predicates::str::contains("esbuild"));

	let content = std::fs::read_to_string(tmp.path().join("vite.config.ts"))?;
	assert_eq!(content, VITE_CONFIG);

	Ok(())
}

#[test]
fn missing_directory_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	codemod_cmd()
		.arg(tmp.path().join("missing"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("not a directory"));

	Ok(())
}

#[test]
fn bundlers_flag_limits_processing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "vite.config.ts", VITE_CONFIG)?;
	write_file(
		tmp.path(),
		"webpack.config.js",
		"module.exports = {\n  plugins: [],\n};\n",
	)?;

	codemod_cmd()
		.arg(tmp.path())
		.args(["-b", "webpack"])
		.assert()
		.success()
		.stdout(predicates::str::contains("Found 1 configuration file(s):"))
		.stdout(predicates::str::contains("✓ Added withZephyr to webpack.config.js"))
		.stdout(predicates::str::contains("vite.config.ts").not());

	let content = std::fs::read_to_string(tmp.path().join("vite.config.ts"))?;
	assert_eq!(content, VITE_CONFIG);

	Ok(())
}

#[test]
fn config_file_restricts_bundlers() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "vite.config.ts", VITE_CONFIG)?;
	write_file(tmp.path(), "zephyr-codemod.toml", "bundlers = [\"webpack\"]\n")?;

	codemod_cmd()
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No bundler configuration files found."));

	Ok(())
}

#[test]
fn bundlers_flag_overrides_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "vite.config.ts", VITE_CONFIG)?;
	write_file(tmp.path(), "zephyr-codemod.toml", "bundlers = [\"webpack\"]\n")?;

	codemod_cmd()
		.arg(tmp.path())
		.args(["--bundlers", "vite"])
		.assert()
		.success()
		.stdout(predicates::str::contains("✓ Added withZephyr to vite.config.ts"));

	Ok(())
}

#[test]
fn invalid_config_file_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "zephyr-codemod.toml", "bundlers = [\n")?;

	codemod_cmd().arg(tmp.path()).assert().code(2);

	Ok(())
}

#[test]
fn installed_plugins_are_not_suggested() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "vite.config.ts", VITE_CONFIG)?;
	write_file(
		tmp.path(),
		"package.json",
		"{\"devDependencies\": {\"vite-plugin-zephyr\": \"^0.1.0\"}}\n",
	)?;

	codemod_cmd()
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Processed: 1"))
		.stdout(predicates::str::contains("Tip:").not());

	Ok(())
}

#[test]
fn empty_directory_finds_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	codemod_cmd()
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No bundler configuration files found."));

	Ok(())
}

#[test]
fn dry_run_matches_real_run_for_repack_configs() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"webpack.config.mjs",
		"import * as Repack from '@callstack/repack';\n\nconst config = (env) => {\n  return {\n    plugins: [new Repack.RepackPlugin({ platform: env.platform })],\n  };\n};\n\nexport default config;\n",
	)?;

	for args in [vec!["--dry-run"], Vec::new()] {
		codemod_cmd()
			.arg(tmp.path())
			.args(&args)
			.assert()
			.success()
			.stdout(predicates::str::contains("Processed: 1"))
			.stdout(predicates::str::contains("Skipped: 1"))
			.stdout(predicates::str::contains(
				"⏭ Skipping webpack.config.mjs (not a webpack config)",
			))
			.stdout(predicates::str::contains("zephyr-webpack-plugin").not());
	}

	Ok(())
}
