//! Text shaping helpers: diacritic stripping, line wrapping and width estimates.

/// Average glyph advance as a fraction of the font size.
pub const AVG_CHAR_WIDTH_FACTOR: f32 = 0.5;
/// Bold glyphs run a little wider.
pub const BOLD_CHAR_WIDTH_FACTOR: f32 = 0.56;

/// Replaces Romanian diacritics with their closest ASCII letters.
///
/// Both the comma-below (ș, ț) and the legacy cedilla (ş, ţ) forms are mapped.
/// Every other character passes through unchanged, so applying it twice
/// yields the same string as applying it once.
pub fn strip_diacritics(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'ă' | 'â' => 'a',
            'Ă' | 'Â' => 'A',
            'î' => 'i',
            'Î' => 'I',
            'ș' | 'ş' => 's',
            'Ș' | 'Ş' => 'S',
            'ț' | 'ţ' => 't',
            'Ț' | 'Ţ' => 'T',
            other => other,
        })
        .collect()
}

/// Approximate rendered width of `text` in points.
pub fn approx_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let factor = if bold { BOLD_CHAR_WIDTH_FACTOR } else { AVG_CHAR_WIDTH_FACTOR };
    text.chars().count() as f32 * font_size * factor
}

/// How many characters fit in `width` points at `font_size`.
pub fn chars_for_width(width: f32, font_size: f32, bold: bool) -> usize {
    let factor = if bold { BOLD_CHAR_WIDTH_FACTOR } else { AVG_CHAR_WIDTH_FACTOR };
    if width <= 0.0 || font_size <= 0.0 {
        return 0;
    }
    (width / (font_size * factor)) as usize
}

/// Cuts `text` so it fits in `max_chars`, marking the cut with `..`.
pub fn truncate_to(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars <= 2 {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - 2).collect();
    out.push_str("..");
    out
}

/// Formats a quantity or amount without trailing zeros (`2`, `2.5`, `2.25`).
pub fn format_number(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Wraps text into lines of approximately the given width.
///
/// The first line may be narrower than the rest (it shares its row with a
/// label). Leading whitespace of each paragraph is kept on every line it
/// produces. Words longer than their line are hard-split.
pub fn wrap_text(content: &str, first_line_chars: usize, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in content.lines() {
        let limit = if lines.is_empty() { first_line_chars } else { max_chars };

        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let trimmed = paragraph.trim_start();
        let indent = &paragraph[..paragraph.len() - trimmed.len()];

        let mut current_line = String::new();
        let mut current_limit = limit;

        for word in trimmed.split_whitespace() {
            let mut word = word.to_string();
            loop {
                let used = current_line.chars().count();
                let needed = word.chars().count();
                if current_line.is_empty() {
                    let room = current_limit.saturating_sub(indent.chars().count()).max(1);
                    if needed <= room {
                        current_line = format!("{}{}", indent, word);
                        break;
                    }
                    let head: String = word.chars().take(room).collect();
                    word = word.chars().skip(room).collect();
                    lines.push(format!("{}{}", indent, head));
                    current_limit = max_chars;
                    if word.is_empty() {
                        break;
                    }
                } else if used + 1 + needed <= current_limit {
                    current_line.push(' ');
                    current_line.push_str(&word);
                    break;
                } else {
                    lines.push(std::mem::take(&mut current_line));
                    current_limit = max_chars;
                }
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIACRITICS: [char; 14] = [
        'ă', 'â', 'î', 'ș', 'ț', 'Ă', 'Â', 'Î', 'Ș', 'Ț', 'ş', 'ţ', 'Ş', 'Ţ',
    ];

    #[test]
    fn test_strip_maps_every_diacritic() {
        assert_eq!(strip_diacritics("ăâîșț ĂÂÎȘȚ şţŞŢ"), "aaist AAIST stST");
    }

    #[test]
    fn test_strip_is_idempotent_and_total() {
        let samples = [
            "",
            "Tort cu ciocolată și frișcă",
            "ȘTEFĂNESCU Ţărână",
            "plain ascii 123 !?",
            "émoji 🎂 ñ ß",
        ];
        for s in samples {
            let once = strip_diacritics(s);
            assert_eq!(strip_diacritics(&once), once);
            assert!(!once.chars().any(|c| DIACRITICS.contains(&c)), "{once}");
        }
    }

    #[test]
    fn test_strip_leaves_other_characters_alone() {
        let input = "éàü ñ ß 🎂 - 10.5 kg";
        assert_eq!(strip_diacritics(input), input);
    }

    #[test]
    fn test_wrap_preserves_indentation() {
        let result = wrap_text("    indented line", 80, 80);
        assert_eq!(result, vec!["    indented line"]);
    }

    #[test]
    fn test_wrap_preserves_different_indent_levels() {
        let input = "no indent\n  two spaces\n    four spaces";
        let result = wrap_text(input, 80, 80);
        assert_eq!(result, vec!["no indent", "  two spaces", "    four spaces"]);
    }

    #[test]
    fn test_wrap_long_indented_line_preserves_indent_on_continuation() {
        let result = wrap_text("    word1 word2 word3 word4", 20, 20);
        assert!(result.len() >= 2);
        assert!(result[0].starts_with("    "));
        assert!(result[1].starts_with("    "));
    }

    #[test]
    fn test_wrap_empty_lines() {
        let result = wrap_text("line1\n\nline2", 80, 80);
        assert_eq!(result, vec!["line1", "", "line2"]);
    }

    #[test]
    fn test_wrap_narrow_first_line() {
        let result = wrap_text("alpha beta gamma", 6, 20);
        assert_eq!(result, vec!["alpha", "beta gamma"]);
    }

    #[test]
    fn test_wrap_word_too_long_for_first_line_is_split() {
        let result = wrap_text("ciocolata", 4, 20);
        assert_eq!(result, vec!["cioc", "olata"]);
    }

    #[test]
    fn test_wrap_hard_splits_overlong_words() {
        let result = wrap_text("abcdefghij", 4, 4);
        assert_eq!(result, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_truncate_marks_cut() {
        assert_eq!(truncate_to("Cozonac", 10), "Cozonac");
        assert_eq!(truncate_to("Cozonac cu nuca", 8), "Cozona..");
        assert_eq!(truncate_to("abc", 2), "ab");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(50.5), "50.5");
        assert_eq!(format_number(12.25), "12.25");
        assert_eq!(format_number(0.333), "0.33");
    }

    #[test]
    fn test_chars_for_width() {
        assert_eq!(chars_for_width(100.0, 10.0, false), 20);
        assert_eq!(chars_for_width(0.0, 10.0, false), 0);
        assert!(chars_for_width(100.0, 10.0, true) < 20);
    }
}
