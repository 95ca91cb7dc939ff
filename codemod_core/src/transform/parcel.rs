use serde_json::Value;

use super::unsupported;
use crate::BundlerConfig;
use crate::CodemodResult;
use crate::JsonDocument;

/// Append the reporter package to `reporters`. A config without reporters
/// keeps Parcel's defaults through the `"..."` entry.
pub(super) fn parcel_reporters(document: &mut JsonDocument, config: &BundlerConfig) -> CodemodResult<()> {
	let Some(object) = document.value_mut().as_object_mut() else {
		return Err(unsupported("the Parcel config is not a JSON object"));
	};

	let plugin = Value::String(config.plugin.clone());
	match object.get_mut("reporters") {
		Some(Value::Array(reporters)) => {
			if !reporters.contains(&plugin) {
				reporters.push(plugin);
			}
		}
		Some(_) => return Err(unsupported("`reporters` is not an array")),
		None => {
			object.insert(
				"reporters".to_string(),
				Value::Array(vec![Value::String("...".to_string()), plugin]),
			);
		}
	}

	Ok(())
}
