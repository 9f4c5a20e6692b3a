//! Text normalizer: first pipeline stage.
//!
//! Cleans raw decoded text (whitespace collapse, de-hyphenation across
//! line breaks, bullet glyph normalization, control stripping) while
//! recording an offset map, so every downstream span stays traceable to
//! the original document. Never fails; malformed input degrades to a
//! placeholder plus a `lossy` flag.

/// Translates byte offsets in the normalized text back to byte offsets
/// in the original input. Stored as checkpoints where the linear
/// relationship between the two texts breaks.
#[derive(Debug, Clone, Default)]
pub struct OffsetMap {
    checkpoints: Vec<(usize, usize)>,
}

impl OffsetMap {
    fn record(&mut self, norm: usize, orig: usize) {
        match self.checkpoints.last() {
            None => {
                if norm != orig {
                    self.checkpoints.push((norm, orig));
                }
            }
            Some(&(n0, o0)) => {
                if orig != o0 + (norm - n0) {
                    self.checkpoints.push((norm, orig));
                }
            }
        }
    }

    /// Maps a normalized byte offset to the original byte offset.
    pub fn to_original(&self, norm: usize) -> usize {
        let idx = self.checkpoints.partition_point(|&(n, _)| n <= norm);
        match idx.checked_sub(1).and_then(|i| self.checkpoints.get(i)) {
            Some(&(n0, o0)) => o0 + (norm - n0),
            None => norm,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.checkpoints.is_empty()
    }
}

/// Output of the normalizer.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub text: String,
    pub map: OffsetMap,
    pub lossy: bool,
}

/// Glyphs rewritten to the canonical `- ` bullet marker at line starts.
fn is_bullet_glyph(c: char) -> bool {
    matches!(c, '\u{2022}' | '\u{25E6}' | '\u{25AA}' | '\u{2023}' | '\u{00B7}' | '\u{2219}' | '\u{25CF}' | '\u{2192}')
}

/// True when the hyphen at byte `i` breaks a word across a line break:
/// an alphabetic character before it, and (after the break and optional
/// indentation) a lowercase letter continuing the word.
fn hyphen_joins(input: &str, i: usize) -> bool {
    let before_alpha = input[..i].chars().next_back().is_some_and(|c| c.is_alphabetic());
    if !before_alpha {
        return false;
    }
    let mut rest = input[i + 1..].chars();
    let mut c = rest.next();
    if c == Some('\r') {
        c = rest.next();
    }
    if c != Some('\n') {
        return false;
    }
    loop {
        match rest.next() {
            Some(' ') | Some('\t') => continue,
            Some(ch) => return ch.is_lowercase() && ch.is_alphabetic(),
            None => return false,
        }
    }
}

/// Normalizes raw text. Idempotent: applying it to its own output yields
/// the same text with an identity offset map.
pub fn normalize(input: &str) -> Normalized {
    let mut out = String::with_capacity(input.len());
    let mut map = OffsetMap::default();
    let mut lossy = false;

    let mut pending_space = false;
    let mut at_line_start = true;
    let mut newline_run = 0usize;

    let mut iter = input.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        match c {
            '\r' => {
                if matches!(iter.peek(), Some((_, '\n'))) {
                    continue; // CRLF: the '\n' does the work
                }
                push_newline(&mut out, &mut map, i, &mut newline_run, &mut at_line_start);
                pending_space = false;
            }
            '\n' => {
                push_newline(&mut out, &mut map, i, &mut newline_run, &mut at_line_start);
                pending_space = false;
            }
            ' ' | '\t' => {
                pending_space = true;
            }
            '\u{FFFD}' => {
                // Decoder replacement character: keep as placeholder.
                lossy = true;
                push_char(&mut out, &mut map, i, c, &mut pending_space, &mut at_line_start);
                newline_run = 0;
            }
            '-' if !at_line_start && hyphen_joins(input, i) => {
                // Word hyphenated across a line break: drop the hyphen
                // and swallow the break plus indentation.
                while matches!(iter.peek(), Some((_, '\r' | '\n' | ' ' | '\t'))) {
                    iter.next();
                }
                pending_space = false;
            }
            c if at_line_start && (is_bullet_glyph(c) || c == '*' || c == '\u{2013}') => {
                // '*' and the en dash are bullets only when actually used
                // as markers; dedicated glyphs always are.
                let marker = is_bullet_glyph(c)
                    || matches!(iter.peek(), Some((_, ' ' | '\t')));
                if marker {
                    push_char(&mut out, &mut map, i, '-', &mut pending_space, &mut at_line_start);
                    out.push(' ');
                    while matches!(iter.peek(), Some((_, ' ' | '\t'))) {
                        iter.next();
                    }
                    pending_space = false;
                    newline_run = 0;
                } else {
                    push_char(&mut out, &mut map, i, c, &mut pending_space, &mut at_line_start);
                    newline_run = 0;
                }
            }
            c if c.is_control() => {
                // Non-printable controls are stripped; the offset map
                // records the shift.
            }
            c => {
                push_char(&mut out, &mut map, i, c, &mut pending_space, &mut at_line_start);
                newline_run = 0;
            }
        }
    }

    Normalized { text: out, map, lossy }
}

fn push_newline(
    out: &mut String,
    map: &mut OffsetMap,
    orig: usize,
    newline_run: &mut usize,
    at_line_start: &mut bool,
) {
    // Drop leading blank lines and collapse 3+ blank lines to one.
    if out.is_empty() || *newline_run >= 2 {
        return;
    }
    map.record(out.len(), orig);
    out.push('\n');
    *newline_run += 1;
    *at_line_start = true;
}

fn push_char(
    out: &mut String,
    map: &mut OffsetMap,
    orig: usize,
    c: char,
    pending_space: &mut bool,
    at_line_start: &mut bool,
) {
    if *pending_space && !*at_line_start {
        map.record(out.len(), orig);
        out.push(' ');
    }
    *pending_space = false;
    map.record(out.len(), orig);
    out.push(c);
    *at_line_start = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_repeated_spaces() {
        let n = normalize("Jane    Doe\tSmith");
        assert_eq!(n.text, "Jane Doe Smith");
        assert!(!n.lossy);
    }

    #[test]
    fn test_preserves_line_boundaries() {
        let n = normalize("Jane Doe\nEngineer");
        assert_eq!(n.text, "Jane Doe\nEngineer");
        assert!(n.map.is_identity());
    }

    #[test]
    fn test_crlf_becomes_lf() {
        let n = normalize("Jane\r\nDoe");
        assert_eq!(n.text, "Jane\nDoe");
        assert_eq!(n.map.to_original(5), 6); // 'D' sits after the CR
    }

    #[test]
    fn test_collapses_blank_line_runs() {
        let n = normalize("Skills\n\n\n\n\nPython");
        assert_eq!(n.text, "Skills\n\nPython");
    }

    #[test]
    fn test_drops_leading_blank_lines() {
        let n = normalize("\n\nJane Doe");
        assert_eq!(n.text, "Jane Doe");
        assert_eq!(n.map.to_original(0), 2);
    }

    #[test]
    fn test_rejoins_hyphenated_word_across_line_break() {
        let n = normalize("distrib-\nuted systems");
        assert_eq!(n.text, "distributed systems");
    }

    #[test]
    fn test_keeps_hyphen_before_capitalized_continuation() {
        // Not a broken word: the next line starts a new item.
        let n = normalize("self-\nStarter");
        assert_eq!(n.text, "self-\nStarter");
    }

    #[test]
    fn test_keeps_numeric_ranges_intact() {
        let n = normalize("2019-\n2021");
        assert_eq!(n.text, "2019-\n2021");
    }

    #[test]
    fn test_normalizes_bullet_glyphs() {
        let n = normalize("\u{2022} Python\n\u{25E6}Go\n* SQL");
        assert_eq!(n.text, "- Python\n- Go\n- SQL");
    }

    #[test]
    fn test_asterisk_without_space_is_not_a_bullet() {
        let n = normalize("*emphasis*");
        assert_eq!(n.text, "*emphasis*");
    }

    #[test]
    fn test_strips_control_characters() {
        let n = normalize("Jane\u{0}\u{1} Doe\u{c}");
        assert_eq!(n.text, "Jane Doe");
        assert!(!n.lossy);
    }

    #[test]
    fn test_replacement_character_flags_lossy() {
        let n = normalize("Jane \u{FFFD}Doe");
        assert!(n.lossy);
        assert!(n.text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_idempotent_on_normalized_text() {
        let first = normalize("\u{2022} Skills:   Python,  Go\r\n\r\n\r\nexam-\nple text\n");
        let second = normalize(&first.text);
        assert_eq!(first.text, second.text);
        assert!(second.map.is_identity());
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let n = normalize("");
        assert!(n.text.is_empty());
        assert!(!n.lossy);
    }

    #[test]
    fn test_offset_map_traces_collapsed_whitespace() {
        let n = normalize("a    b");
        assert_eq!(n.text, "a b");
        // 'b' is at normalized offset 2, original offset 5.
        assert_eq!(n.map.to_original(2), 5);
        assert_eq!(n.map.to_original(0), 0);
    }
}
