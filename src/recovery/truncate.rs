//! Cut-point search for payloads whose tail is damaged beyond repair.

use crate::config::RecoveryTuning;

/// Character-indexed view over an extracted payload.
///
/// Lengths and cut points are counted in characters so reported percentages
/// do not depend on the UTF-8 width of the content.
#[derive(Debug)]
pub(crate) struct Payload<'a> {
    text: &'a str,
    chars: Vec<char>,
    boundaries: Vec<usize>,
}

impl<'a> Payload<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let (boundaries, chars): (Vec<usize>, Vec<char>) = text.char_indices().unzip();
        Self {
            text,
            chars,
            boundaries,
        }
    }

    pub(crate) fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in characters.
    pub(crate) fn len(&self) -> usize {
        self.chars.len()
    }

    /// The first `count` characters.
    pub(crate) fn prefix(&self, count: usize) -> &'a str {
        &self.text[..self.byte_offset(count)]
    }

    /// The last `count` characters.
    pub(crate) fn suffix(&self, count: usize) -> &'a str {
        let start = self.len().saturating_sub(count);
        &self.text[self.byte_offset(start)..]
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.boundaries
            .get(chars)
            .copied()
            .unwrap_or(self.text.len())
    }
}

/// Find where to cut a damaged payload, as a character count to keep.
///
/// Prefers the last closer that follows another closer (optionally with a
/// comma between), provided it lies in the back part of the text. Otherwise
/// falls back to the last comma inside the trailing window.
pub(crate) fn smart_cut(payload: &Payload<'_>, tuning: &RecoveryTuning) -> Option<usize> {
    let len = payload.len() as f64;

    if let Some(end) = last_structural_boundary(&payload.chars)
        && end as f64 >= len * tuning.smart_boundary_min_fraction
    {
        return Some(end);
    }

    let window_start = len * (1.0 - tuning.comma_window_fraction);
    payload
        .chars
        .iter()
        .rposition(|&c| c == ',')
        .filter(|&comma| comma as f64 >= window_start)
}

/// End position (exclusive) of the last `}`/`]` preceded by another closer,
/// with optional whitespace and a single comma between them.
fn last_structural_boundary(chars: &[char]) -> Option<usize> {
    (0..chars.len()).rev().find_map(|end| {
        if !is_closer(chars[end]) {
            return None;
        }
        let mut rest = chars[..end].iter().rev().skip_while(|c| c.is_whitespace()).peekable();
        if rest.peek() == Some(&&',') {
            rest.next();
        }
        let prev = rest.find(|c| !c.is_whitespace())?;
        is_closer(*prev).then_some(end + 1)
    })
}

fn is_closer(c: char) -> bool {
    matches!(c, '}' | ']')
}

fn brace_delta(c: char) -> isize {
    match c {
        '{' => 1,
        '}' => -1,
        _ => 0,
    }
}

/// Candidate prefix lengths for the aggressive scan, longest first.
///
/// Walks down from the full length to the configured floor, yielding only
/// prefixes whose raw `{`/`}` imbalance is within tolerance.
pub(crate) fn aggressive_cuts<'p>(
    payload: &'p Payload<'_>,
    tuning: &RecoveryTuning,
) -> impl Iterator<Item = usize> + use<'p> {
    let len = payload.len();
    let floor = ((len as f64 * tuning.aggressive_floor_fraction) as usize).max(1);
    let tolerance = tuning.aggressive_brace_tolerance as isize;
    let chars = &payload.chars;

    let mut balance: isize = chars.iter().copied().map(brace_delta).sum();
    (floor..=len).rev().filter_map(move |cut| {
        // `balance` describes the prefix of length `cut` on entry
        let within = balance.abs() <= tolerance;
        balance -= brace_delta(chars[cut - 1]);
        within.then_some(cut)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_counts_characters() {
        let payload = Payload::new("{\"é\": \"日本\"}");
        assert_eq!(payload.len(), 11);
        assert_eq!(payload.prefix(3), "{\"é");
        assert_eq!(payload.suffix(4), "日本\"}");
        assert_eq!(payload.prefix(100), payload.as_str());
    }

    #[test]
    fn test_structural_boundary_after_nested_close() {
        let chars: Vec<char> = r#"{"rows":[[1,2],[3,4]],"x":tru}"#.chars().collect();
        // ends right after the `]]` closing `rows`
        assert_eq!(last_structural_boundary(&chars), Some(21));
    }

    #[test]
    fn test_structural_boundary_allows_comma_between_closers() {
        let chars: Vec<char> = r#"[{"a":[1]}, ]"#.chars().collect();
        assert_eq!(last_structural_boundary(&chars), Some(chars.len()));
    }

    #[test]
    fn test_no_structural_boundary_in_flat_list() {
        let chars: Vec<char> = r#"[{"a":1},{"a":2"#.chars().collect();
        assert_eq!(last_structural_boundary(&chars), None);
    }

    #[test]
    fn test_smart_cut_falls_back_to_trailing_comma() {
        let text = format!(r#"{{"{}":1,"b"#, "a".repeat(20));
        let payload = Payload::new(&text);
        let cut = smart_cut(&payload, &RecoveryTuning::default());
        let expected = format!(r#"{{"{}":1"#, "a".repeat(20));
        assert_eq!(cut.map(|c| payload.prefix(c)), Some(expected.as_str()));
    }

    #[test]
    fn test_smart_cut_ignores_early_comma() {
        let payload = Payload::new(r#"{"a":1,"bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"#);
        assert_eq!(smart_cut(&payload, &RecoveryTuning::default()), None);
    }

    #[test]
    fn test_aggressive_cuts_descend_to_floor() {
        let payload = Payload::new("abcdefghij");
        let cuts: Vec<usize> = aggressive_cuts(&payload, &RecoveryTuning::default()).collect();
        assert_eq!(cuts, vec![10, 9, 8, 7, 6, 5, 4, 3]);
    }

    #[test]
    fn test_aggressive_cuts_skip_unbalanced_prefixes() {
        let tuning = RecoveryTuning {
            aggressive_brace_tolerance: 1,
            aggressive_floor_fraction: 0.0,
            ..RecoveryTuning::default()
        };
        let payload = Payload::new("{{{}}");
        let cuts: Vec<usize> = aggressive_cuts(&payload, &tuning).collect();
        // imbalance per prefix length: 5->1, 4->2, 3->3, 2->2, 1->1
        assert_eq!(cuts, vec![5, 1]);
    }
}
