/// Splits a comma-separated tag field: entries are trimmed, empty ones
/// dropped, order and duplicates kept.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// The inverse of [`parse_tags`] for filling the tag field back in.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}
