//! Longest-prefix matcher for caller-configured "special" tag names, whose
//! contents are opaque text until a matching close tag is seen. Grounded on
//! the teacher's fixed `SCRIPT`/`STYLE`/`TEXTAREA`/`TITLE` handling in
//! `tag_processor.rs::skip_script_data`/`skip_rcdata`, generalized from a
//! fixed tag set to the spec's caller-supplied table (§4.2).

use crate::state::is_whitespace;

/// The configured special tag names, lowercased once at construction.
/// Always contains `script` and `style`.
pub(crate) struct SpecialTagTable {
    names: Vec<Vec<u8>>,
}

impl SpecialTagTable {
    pub(crate) fn new(extra: &[String]) -> Self {
        let mut names: Vec<Vec<u8>> = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for mandatory in ["script", "style"] {
            if seen.insert(mandatory.to_string()) {
                names.push(mandatory.as_bytes().to_vec());
            }
        }

        for name in extra {
            let lower = name.to_ascii_lowercase();
            if lower.len() < 2 {
                continue;
            }
            if seen.insert(lower.clone()) {
                names.push(lower.into_bytes());
            }
        }

        Self { names }
    }

    pub(crate) fn name(&self, index: usize) -> &[u8] {
        &self.names[index]
    }

    /// Indices of every configured tag whose first byte matches `c`,
    /// case-insensitively. Used to seed the match set on `<` + first letter.
    pub(crate) fn candidates_for_first_byte(&self, c: u8) -> Vec<usize> {
        let lc = c.to_ascii_lowercase();
        self.names
            .iter()
            .enumerate()
            .filter(|(_, name)| name[0] == lc)
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClosingMatch {
    /// The candidate still matches; more characters are needed.
    Matching,
    /// The full tag name matched and the current character terminates it.
    Matched,
    NoMatch,
}

/// Compares `c` against `table.name(index)[depth]`, or -- once past the end
/// of the name -- checks whether `c` terminates a tag (`>` or whitespace).
pub(crate) fn closing_match(table: &SpecialTagTable, index: usize, depth: usize, c: u8) -> ClosingMatch {
    let name = table.name(index);
    if depth < name.len() {
        if name[depth] == c.to_ascii_lowercase() {
            ClosingMatch::Matching
        } else {
            ClosingMatch::NoMatch
        }
    } else if c == b'>' || is_whitespace(c) {
        ClosingMatch::Matched
    } else {
        ClosingMatch::NoMatch
    }
}
