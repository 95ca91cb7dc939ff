mod common;

use codemod_core::AnyEmptyResult;
use common::codemod_cmd;
use common::write_file;

#[test]
fn list_bundlers_prints_the_catalog() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let output = codemod_cmd()
		.current_dir(tmp.path())
		.args(["--list-bundlers", "-b", "parcel", "vite"])
		.output()?;
	assert!(output.status.success());

	let stdout = String::from_utf8(output.stdout)?;
	insta::assert_snapshot!(stdout, @r"
Supported bundlers:

  vite       vite-plugin-zephyr
             vite.config.js, vite.config.ts, vite.config.mjs, vite.config.mts
  parcel     parcel-reporter-zephyr
             .parcelrc, .parcelrc.json
");

	Ok(())
}

#[test]
fn list_bundlers_includes_custom_entries() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"zephyr-codemod.toml",
		"[bundler.esbuild]\nfiles = [\"esbuild.config.js\"]\nplugin = \
		 \"zephyr-esbuild-plugin\"\npatterns = [{ matcher = \"plugins:\", transform = \
		 \"plugins-array\" }]\n",
	)?;

	codemod_cmd()
		.current_dir(tmp.path())
		.arg("--list-bundlers")
		.assert()
		.success()
		.stdout(predicates::str::contains("repack"))
		.stdout(predicates::str::contains("esbuild    zephyr-esbuild-plugin"))
		.stdout(predicates::str::contains("esbuild.config.js"));

	Ok(())
}

#[test]
fn custom_bundler_transforms_its_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"zephyr-codemod.toml",
		"[bundler.esbuild]\nfiles = [\"esbuild.config.js\"]\nplugin = \
		 \"zephyr-esbuild-plugin\"\npatterns = [{ matcher = \"plugins:\", transform = \
		 \"plugins-array\" }]\n",
	)?;
	write_file(
		tmp.path(),
		"esbuild.config.js",
		"export default {\n  plugins: [],\n};\n",
	)?;

	codemod_cmd()
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("✓ Added withZephyr to esbuild.config.js"));

	let content = std::fs::read_to_string(tmp.path().join("esbuild.config.js"))?;
	assert!(content.contains("import { withZephyr } from 'zephyr-esbuild-plugin';"));
	assert!(content.contains("withZephyr()"));

	Ok(())
}
