use crate::report::layout::Font;

/// Characters of `font` at `size` that fit in `max_width` millimetres (at least one).
pub fn line_capacity(font: Font, size: f64, max_width: f64) -> usize {
    let per_char = font.char_width(size);
    if per_char <= 0.0 {
        return usize::MAX;
    }
    ((max_width / per_char).floor() as usize).max(1)
}

/// Greedy word wrap measured with the font's glyph widths. Explicit newlines
/// are kept; words wider than a line are broken between characters.
pub fn wrap_text(text: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let space = font.glyph_width(' ', size);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width = font.text_width(word, size);
            let needed = if current.is_empty() {
                word_width
            } else {
                current_width + space + word_width
            };

            if needed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width = needed;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            current_width = 0.0;
            for ch in word.chars() {
                let advance = font.glyph_width(ch, size);
                if !current.is_empty() && current_width + advance > max_width {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(ch);
                current_width += advance;
            }
        }

        lines.push(current);
    }

    lines
}

/// Wraps source code line by line, keeping indentation; tabs become two spaces.
pub fn wrap_code(code: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let capacity = line_capacity(font, size, max_width);
    let mut lines = Vec::new();

    for raw in code.lines() {
        let expanded = raw.replace('\t', "  ");
        let line = expanded.trim_end();
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for chunk in chars.chunks(capacity) {
            lines.push(chunk.iter().collect());
        }
    }

    lines
}

/// `12500` → `"12,500"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries_within_capacity() {
        // Courier 10pt: 0.6 * 10 * 25.4 / 72 ≈ 2.117mm per char, 10 chars in 22mm.
        let lines = wrap_text("alpha beta gamma delta", Font::Courier, 10.0, 22.0);
        assert_eq!(lines, vec!["alpha beta", "gamma", "delta"]);
        assert!(lines.iter().all(|line| line.chars().count() <= 10));
    }

    #[test]
    fn breaks_words_longer_than_a_line() {
        let lines = wrap_text("abcdefghijklmnopqrstuvwxyz ok", Font::Courier, 10.0, 22.0);
        assert_eq!(lines, vec!["abcdefghij", "klmnopqrst", "uvwxyz ok"]);
    }

    #[test]
    fn capitals_wrap_within_the_measured_width() {
        let title = "UNVALIDATED REDIRECT WITHIN MANAGEMENT WORKFLOW ".repeat(4);
        for font in [Font::Helvetica, Font::HelveticaBold] {
            let lines = wrap_text(&title, font, 16.0, 170.0);
            assert!(lines.len() > 1);
            assert!(lines.iter().all(|line| font.text_width(line, 16.0) <= 170.0));
        }
        let narrow = wrap_text("iiiiiiiiii iiiiiiiiii", Font::Helvetica, 10.0, 22.0);
        assert_eq!(narrow.len(), 1);
    }

    #[test]
    fn keeps_paragraph_breaks() {
        let lines = wrap_text("first\n\nsecond", Font::Helvetica, 12.0, 170.0);
        assert_eq!(lines, vec!["first", "", "second"]);
        assert!(wrap_text("", Font::Helvetica, 12.0, 170.0).is_empty());
    }

    #[test]
    fn code_wrap_keeps_indentation() {
        let code = "fn main() {\n\tlet value = 1;\n\n}";
        let lines = wrap_code(code, Font::Courier, 10.0, 160.0);
        assert_eq!(lines, vec!["fn main() {", "  let value = 1;", "", "}"]);

        let long = "x".repeat(25);
        let chunks = wrap_code(&long, Font::Courier, 10.0, 22.0);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], "xxxxx");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(12500), "12,500");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
