use std::path::Path;
use std::path::PathBuf;

use crate::BundlerConfig;
use crate::Catalog;
use crate::CodemodResult;
use crate::Document;
use crate::TransformKind;
use crate::apply_transform;

pub(crate) fn builtin_catalog() -> Catalog {
	Catalog::builtin().expect("the built-in catalog compiles")
}

pub(crate) fn bundler(name: &str) -> BundlerConfig {
	builtin_catalog()
		.get(name)
		.cloned()
		.unwrap_or_else(|| panic!("`{name}` is a built-in bundler"))
}

/// Parse `source` as the file `file_name` of `bundler_name`, run one
/// transform and serialize the result.
pub(crate) fn transform_source(
	kind: TransformKind,
	bundler_name: &str,
	file_name: &str,
	source: &str,
) -> CodemodResult<String> {
	let config = bundler(bundler_name);
	let mut document = Document::parse(source, Path::new(file_name), config.format)?;
	apply_transform(kind, &mut document, &config)?;
	document.serialize()
}

pub(crate) fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
	let path = dir.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).expect("create parent directories");
	}
	std::fs::write(&path, content).expect("write fixture file");
	path
}

pub(crate) const NX_WEBPACK_CONFIG: &str = "import { composePlugins, withNx } from '@nx/webpack';
import { withReact } from '@nx/react';

export default composePlugins(
  withNx(),
  withReact(),
  (config) => config
);
";

pub(crate) const VITE_CONFIG: &str = "import { defineConfig } from 'vite';
import react from '@vitejs/plugin-react';
import { resolve } from 'path';

export default defineConfig({
  plugins: [react()],
  resolve: {
    alias: {
      '@': resolve(__dirname, 'src')
    }
  },
  server: {
    port: 3000
  }
});
";

pub(crate) const RSBUILD_CONFIG: &str = "import { defineConfig } from '@rsbuild/core';
import { pluginReact } from '@rsbuild/plugin-react';

export default defineConfig({
  plugins: [pluginReact()],
});
";

pub(crate) const REPACK_CONFIG: &str = "import * as Repack from '@callstack/repack';

const config = (env) => {
  const { mode, platform } = env;
  return {
    mode,
    entry: './index.js',
    plugins: [new Repack.RepackPlugin({ platform })],
  };
};

export default config;
";

pub(crate) const COMMONJS_WEBPACK_CONFIG: &str = "const path = require('path');

module.exports = {
  entry: './src/index.js',
  plugins: [
    new HtmlWebpackPlugin(),
  ],
};
";
