use crate::BundlerPattern;

/// Choose the pattern for a file from its raw (pre-edit) text.
///
/// Patterns are tried in catalog order and the first matcher that accepts
/// the text wins. When nothing matches, the first listed pattern is used.
/// Returns `None` only for an empty pattern list.
pub fn detect<'a>(raw: &str, patterns: &'a [BundlerPattern]) -> Option<&'a BundlerPattern> {
	patterns
		.iter()
		.find(|pattern| pattern.matcher.is_match(raw))
		.or_else(|| patterns.first())
}
