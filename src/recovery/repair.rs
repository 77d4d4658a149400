//! Standard repair pipeline for damaged JSON payloads.
//!
//! Applied in order:
//! 1. close an unterminated string literal
//! 2. append missing `]` then missing `}`
//! 3. drop trailing commas before a closer
//! 4. strip raw control characters other than `\n`, `\r` and `\t`

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s*[}\]])").expect("invalid TRAILING_COMMA regex"));

/// String-aware delimiter census of a payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Structure {
    in_string: bool,
    pending_escape: bool,
    brackets: isize,
    braces: isize,
}

impl Structure {
    fn scan(text: &str) -> Self {
        let mut state = Self::default();
        for c in text.chars() {
            if state.in_string {
                if state.pending_escape {
                    state.pending_escape = false;
                } else if c == '\\' {
                    state.pending_escape = true;
                } else if c == '"' {
                    state.in_string = false;
                }
                continue;
            }
            match c {
                '"' => state.in_string = true,
                '[' => state.brackets += 1,
                ']' => state.brackets -= 1,
                '{' => state.braces += 1,
                '}' => state.braces -= 1,
                _ => {}
            }
        }
        state
    }

    fn missing_brackets(&self) -> usize {
        self.brackets.max(0) as usize
    }

    fn missing_braces(&self) -> usize {
        self.braces.max(0) as usize
    }
}

/// Run the full repair pipeline, returning the fixed payload.
///
/// The input is never modified; each step works on one owned buffer.
pub fn repair(text: &str) -> String {
    let structure = Structure::scan(text);

    let mut fixed = String::with_capacity(
        text.len() + structure.missing_brackets() + structure.missing_braces() + 1,
    );
    fixed.push_str(text);

    if structure.in_string {
        // A dangling backslash would escape the closing quote
        if structure.pending_escape {
            fixed.pop();
        }
        fixed.push('"');
    }

    // Brackets first: arrays are usually the innermost open structure
    fixed.push_str(&"]".repeat(structure.missing_brackets()));
    fixed.push_str(&"}".repeat(structure.missing_braces()));

    let mut fixed = TRAILING_COMMA.replace_all(&fixed, "$1").into_owned();
    fixed.retain(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'));
    fixed
}
