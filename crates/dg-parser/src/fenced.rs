const FENCE: &str = "```";
const FENCE_TAG: &str = "mermaid";

/// Body of the first ```` ```mermaid ```` block, without the fences.
///
/// The opening fence must be followed by a line break; the body runs to the
/// next fence. Returns `None` when no complete block exists.
#[must_use]
pub fn extract_fenced_block(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(relative) = text[search_from..].find(FENCE) {
        let fence_start = search_from + relative;
        let after_fence = fence_start + FENCE.len();
        search_from = after_fence;

        let Some(after_tag) = text[after_fence..].strip_prefix(FENCE_TAG) else {
            continue;
        };
        let Some(newline) = after_tag.find('\n') else {
            return None;
        };
        if !after_tag[..newline].trim().is_empty() {
            continue;
        }

        let body_start = after_fence + FENCE_TAG.len() + newline + 1;
        let body_len = text[body_start..].find(FENCE)?;
        return Some(&text[body_start..body_start + body_len]);
    }
    None
}
