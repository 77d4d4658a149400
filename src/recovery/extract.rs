//! Payload extraction for raw LLM report output.

const FENCE: &str = "```";
const BOM: char = '\u{feff}';

/// Narrow raw generation output down to its most likely JSON payload.
///
/// Handles the common wrappings:
/// 1. JSON inside a fence with any info string (the closing fence may be missing
///    when the stream was cut off)
/// 2. Prose before and after the payload (first `{` to last `}`)
/// 3. A leading byte-order mark
///
/// A payload that starts with `[` is sliced to its last `]` instead. When no
/// opening brace is found the trimmed text is returned unchanged, so later
/// parse attempts fail with a meaningful error.
pub fn extract_json_payload(text: &str) -> &str {
    let mut payload = text.trim_start_matches(BOM).trim();

    if let Some(fenced) = fenced_block(payload) {
        payload = fenced;
    }

    if let Some(span) = container_span(payload) {
        payload = span;
    }

    payload.trim_start_matches(BOM)
}

/// Body of the first fence, or `None` when it holds no JSON opener
/// (e.g. a stray closing fence after an unfenced payload).
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE)?;
    let body = &text[start + FENCE.len()..];

    // Skip the info string (`json`, `jsonc`, ...) on the fence line
    let body = match body.split_once('\n') {
        Some((info, rest)) if !info.contains(['{', '[']) => rest,
        _ => body,
    };

    let body = match body.find(FENCE) {
        Some(end) => &body[..end],
        None => body,
    };
    let body = body.trim();
    body.contains(['{', '[']).then_some(body)
}

fn container_span(text: &str) -> Option<&str> {
    let (open, close) = if text.starts_with('[') {
        ('[', ']')
    } else {
        ('{', '}')
    };

    let start = text.find(open)?;
    match text.rfind(close) {
        Some(end) if end > start => Some(&text[start..=end]),
        // Truncated: keep everything from the opening brace
        _ => Some(&text[start..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let text = r#"Here's the response:
```json
{"key": "value"}
```
"#;
        assert_eq!(extract_json_payload(text), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_from_unlabelled_fence() {
        let text = "```\n{\"key\": 1}\n```";
        assert_eq!(extract_json_payload(text), r#"{"key": 1}"#);
    }

    #[test]
    fn test_extract_from_unterminated_fence() {
        let text = "Report below\n```json\n{\"summary\": \"cut off";
        assert_eq!(extract_json_payload(text), r#"{"summary": "cut off"#);
    }

    #[test]
    fn test_stray_closing_fence_keeps_payload() {
        let text = "{\"a\": 1}\n```";
        assert_eq!(extract_json_payload(text), r#"{"a": 1}"#);

        let text = "{\"a\": 1}\n```\nHope this helps!";
        assert_eq!(extract_json_payload(text), r#"{"a": 1}"#);
    }

    #[test]
    fn test_fence_info_string_is_skipped() {
        let text = "```jsonc\n{\"key\": 1}\n```";
        assert_eq!(fenced_block(text), Some(r#"{"key": 1}"#));
        assert_eq!(extract_json_payload(text), r#"{"key": 1}"#);
    }

    #[test]
    fn test_single_line_fence() {
        let text = "```{\"key\": 1}```";
        assert_eq!(extract_json_payload(text), r#"{"key": 1}"#);
    }

    #[test]
    fn test_extract_raw_json() {
        let text = r#"Some text before {"key": "value"} and after"#;
        assert_eq!(extract_json_payload(text), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_nested_json() {
        let text = r#"{"outer": {"inner": "value"}}"#;
        assert_eq!(extract_json_payload(text), r#"{"outer": {"inner": "value"}}"#);
    }

    #[test]
    fn test_extract_top_level_array() {
        let text = r#"[{"a": 1}, {"b": 2}]"#;
        assert_eq!(extract_json_payload(text), text);
    }

    #[test]
    fn test_strips_byte_order_mark() {
        let text = "\u{feff}{\"a\": 1}";
        assert_eq!(extract_json_payload(text), r#"{"a": 1}"#);
    }

    #[test]
    fn test_truncated_payload_keeps_tail() {
        let text = r#"Sure! {"a": "b", "c": "unterminated"#;
        assert_eq!(extract_json_payload(text), r#"{"a": "b", "c": "unterminated"#);
    }

    #[test]
    fn test_no_json_returns_trimmed_text() {
        let text = "  Just plain text without any JSON \n";
        assert_eq!(extract_json_payload(text), "Just plain text without any JSON");
    }
}
