//! Candidate extraction from raw source text.
//!
//! Extraction is textual and language agnostic: the host file is never
//! parsed as markup or script. A candidate token is a maximal run of
//! candidate characters plus balanced `[...]` spans, delimited by
//! whitespace, quotes, and attribute-boundary punctuation. False positives
//! are expected and harmless; unknown candidates resolve to nothing.

use std::collections::HashSet;

/// Extract the distinct candidate-shaped tokens of one file, in
/// first-occurrence order. Scanning the same bytes twice yields the same
/// set in the same order.
pub fn extract_candidates(text: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    let bytes = text.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if !is_token_start(bytes[i]) {
            i += 1;
            continue;
        }

        let start = i;
        let mut valid = true;

        while i < bytes.len() {
            let b = bytes[i];
            if b == b'[' {
                // Bracket span: anything up to `]` on the same line,
                // including quotes and multibyte text
                match find_bracket_end(bytes, i + 1) {
                    Some(end) => i = end + 1,
                    None => {
                        valid = false;
                        break;
                    }
                }
            } else if is_token_byte(b) {
                i += 1;
            } else {
                break;
            }
        }

        if !valid {
            // Skip past the malformed token entirely
            while i < bytes.len() && (is_token_byte(bytes[i]) || bytes[i] == b'[') {
                i += 1;
            }
            continue;
        }

        // Token boundaries are ASCII, so this slice is valid UTF-8
        let token = trim_trailing_punctuation(&text[start..i]);
        if is_plausible_candidate(token) && seen.insert(token) {
            out.push(token.to_string());
        }
    }

    out
}

fn is_token_start(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'!' || b == b'['
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'!' | b'.' | b'/' | b'%')
}

fn find_bracket_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b']' => return Some(i),
            b'\n' | b'\r' => return None,
            _ => i += 1,
        }
    }
    None
}

/// Sentence punctuation glued onto a token (`flex.`, `underline:`) is not
/// part of the candidate.
fn trim_trailing_punctuation(token: &str) -> &str {
    token.trim_end_matches(['.', ':', '/', '-', '_'])
}

fn is_plausible_candidate(token: &str) -> bool {
    !token.is_empty() && token.bytes().any(|b| b.is_ascii_alphabetic())
}
