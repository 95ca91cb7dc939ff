use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// The dependency tables of a `package.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
	#[serde(default)]
	dependencies: BTreeMap<String, serde_json::Value>,
	#[serde(default)]
	dev_dependencies: BTreeMap<String, serde_json::Value>,
	#[serde(default)]
	peer_dependencies: BTreeMap<String, serde_json::Value>,
	#[serde(default)]
	optional_dependencies: BTreeMap<String, serde_json::Value>,
}

impl PackageManifest {
	fn lists(&self, name: &str) -> bool {
		[
			&self.dependencies,
			&self.dev_dependencies,
			&self.peer_dependencies,
			&self.optional_dependencies,
		]
		.iter()
		.any(|table| table.contains_key(name))
	}
}

/// Whether the project at `root` already depends on `name`: either its
/// `package.json` lists it or it is present in `node_modules`.
pub fn is_package_installed(root: &Path, name: &str) -> bool {
	if root
		.join("node_modules")
		.join(name)
		.join("package.json")
		.is_file()
	{
		return true;
	}

	let Ok(content) = std::fs::read_to_string(root.join("package.json")) else {
		return false;
	};

	serde_json::from_str::<PackageManifest>(&content).is_ok_and(|manifest| manifest.lists(name))
}

/// The packages in `names` the project at `root` does not depend on yet.
pub fn missing_packages<'a>(root: &Path, names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
	names
		.into_iter()
		.filter(|name| !is_package_installed(root, name))
		.collect()
}
