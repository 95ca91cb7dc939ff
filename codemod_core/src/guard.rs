use serde_json::Value;

use crate::BundlerConfig;
use crate::Document;
use crate::nodes;

/// Whether the document already invokes the plugin.
///
/// Scripts: any call expression anywhere in the tree whose callee is the
/// factory symbol, including the inner call of `withZephyr()(config)`.
/// JSON: the `reporters` array lists the plugin package.
pub fn already_present(document: &Document, config: &BundlerConfig) -> bool {
	match document {
		Document::Script(tree) => {
			nodes::contains_call_to(tree.source(), tree.root(), &config.import_name)
		}
		Document::Json(json) => {
			json.value()
				.get("reporters")
				.and_then(Value::as_array)
				.is_some_and(|reporters| {
					reporters
						.iter()
						.any(|reporter| reporter.as_str() == Some(config.plugin.as_str()))
				})
		}
	}
}
