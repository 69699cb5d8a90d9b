//! Offsets and splitting of parameter text.
//!
//! Ranges produced here are byte ranges. [`split_to_ranges`] is relative to
//! the text it was given, [`extract_sub_parameter_ranges`] to the parameter
//! including its opening delimiter.

use ferrotex_syntax::{TextRange, TextSize};
use once_cell::sync::Lazy;
use regex::Regex;

/// Separator between the values of a multi-valued parameter, `\ref{a, b}`.
pub static PARAMETER_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("parameter separator pattern is valid"));

/// Removes the enclosing delimiters of a group. The closing delimiter is only
/// removed when it matches the opening one, so an unclosed `{chapter` at the
/// end of a document keeps `chapter` whole.
pub fn strip_group(text: &str) -> &str {
    let mut chars = text.chars();
    let Some(open) = chars.next() else {
        return "";
    };
    let rest = chars.as_str();
    let closed = match open {
        '{' => closes_brace_group(rest),
        '[' => rest.ends_with(']'),
        _ => false,
    };
    if closed {
        &rest[..rest.len() - 1]
    } else {
        rest
    }
}

/// True if the brace opened before `rest` is closed by its last character.
fn closes_brace_group(rest: &str) -> bool {
    let mut depth = 1u32;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1 == rest.len();
                }
            }
            _ => {}
        }
    }
    false
}

/// Splits `text` at every match of `separator` that is neither nested in a
/// `{...}` group nor escaped with a backslash.
///
/// Every piece is returned, including empty ones, so joining the pieces with
/// the separators that were matched gives back `text`. Empty text yields no
/// ranges.
pub fn split_to_ranges(text: &str, separator: &Regex) -> Vec<TextRange> {
    if text.is_empty() {
        return Vec::new();
    }

    let blocked = blocked_positions(text);
    let mut ranges = Vec::new();
    let mut start = 0;
    for found in separator.find_iter(text) {
        if found.is_empty() || blocked[found.range()].iter().any(|b| *b) {
            continue;
        }
        ranges.push(byte_range(start, found.start()));
        start = found.end();
    }
    ranges.push(byte_range(start, text.len()));
    ranges
}

/// Splits the interior of a delimited parameter such as `{a,b}` and returns
/// the ranges relative to the parameter text itself.
pub fn extract_sub_parameter_ranges(parameter_text: &str) -> Vec<TextRange> {
    let opening = parameter_text.chars().next().map_or(0, char::len_utf8);
    let offset = TextSize::from(opening as u32);
    split_to_ranges(strip_group(parameter_text), &PARAMETER_SPLIT)
        .into_iter()
        .map(|range| range + offset)
        .collect()
}

/// Marks the bytes a separator must not cover: everything inside a brace
/// group, and escaped characters other than whitespace (`\,` is a thin space,
/// `\ ` a control space that may still precede a separator).
fn blocked_positions(text: &str) -> Vec<bool> {
    let mut blocked = vec![false; text.len()];
    let mut depth = 0u32;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        let is_blocked = if escaped {
            escaped = false;
            depth > 0 || !c.is_whitespace()
        } else {
            match c {
                '\\' => escaped = true,
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
            (depth > 0 && c != '{') || depth > 1
        };
        blocked[i..i + c.len_utf8()].fill(is_blocked);
    }
    blocked
}

fn byte_range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comma() -> Regex {
        Regex::new(",").unwrap()
    }

    fn pieces<'a>(text: &'a str, ranges: &[TextRange]) -> Vec<&'a str> {
        ranges.iter().map(|r| &text[*r]).collect()
    }

    #[test]
    fn test_split_is_group_aware() {
        let text = "a,{b,c},d";
        let ranges = split_to_ranges(text, &comma());
        assert_eq!(pieces(text, &ranges), vec!["a", "{b,c}", "d"]);
    }

    #[test]
    fn test_split_reconstructs_text() {
        for text in ["a", "a,b", "first,second,third", ",", "a,,b", "a,", "é,ü,ß"] {
            let ranges = split_to_ranges(text, &comma());
            assert_eq!(pieces(text, &ranges).join(","), text, "{:?}", text);
        }
    }

    #[test]
    fn test_split_ranges_are_ordered_and_disjoint() {
        let text = "x , {y,z} ,w";
        let ranges = split_to_ranges(text, &PARAMETER_SPLIT);
        assert_eq!(pieces(text, &ranges), vec!["x", "{y,z}", "w"]);
        for pair in ranges.windows(2) {
            assert!(pair[0].end() <= pair[1].start());
        }
        assert!(ranges.iter().all(|r| r.end() <= TextSize::of(text)));
    }

    #[test]
    fn test_escaped_separator_does_not_split() {
        let text = r"a\,b,c";
        let ranges = split_to_ranges(text, &comma());
        assert_eq!(pieces(text, &ranges), vec![r"a\,b", "c"]);

        let text = r"a\\,b";
        let ranges = split_to_ranges(text, &comma());
        assert_eq!(pieces(text, &ranges), vec![r"a\\", "b"]);
    }

    #[test]
    fn test_escaped_braces_do_not_open_groups() {
        let text = r"\{a,b";
        let ranges = split_to_ranges(text, &comma());
        assert_eq!(pieces(text, &ranges), vec![r"\{a", "b"]);
    }

    #[test]
    fn test_nested_groups() {
        let text = "{a,{b,c}},d,{e}";
        let ranges = split_to_ranges(text, &comma());
        assert_eq!(pieces(text, &ranges), vec!["{a,{b,c}}", "d", "{e}"]);
    }

    #[test]
    fn test_unbalanced_closing_brace() {
        let text = "a},b";
        let ranges = split_to_ranges(text, &comma());
        assert_eq!(pieces(text, &ranges), vec!["a}", "b"]);
    }

    #[test]
    fn test_empty_text_has_no_ranges() {
        assert!(split_to_ranges("", &comma()).is_empty());
    }

    #[test]
    fn test_strip_group() {
        assert_eq!(strip_group("{abc}"), "abc");
        assert_eq!(strip_group("[x]"), "x");
        assert_eq!(strip_group("{}"), "");
        assert_eq!(strip_group("{"), "");
        assert_eq!(strip_group(""), "");
    }

    #[test]
    fn test_strip_unclosed_group() {
        assert_eq!(strip_group("{chapter"), "chapter");
        assert_eq!(strip_group("{a{b}"), "a{b}");
        assert_eq!(strip_group(r"{a\}"), r"a\}");
        assert_eq!(strip_group("[width=3cm"), "width=3cm");
        assert_eq!(strip_group("{a{b}c}"), "a{b}c");
    }

    #[test]
    fn test_sub_parameter_ranges_are_shifted_past_the_brace() {
        let param = "{sec:intro, fig:a}";
        let ranges = extract_sub_parameter_ranges(param);
        assert_eq!(pieces(param, &ranges), vec!["sec:intro", "fig:a"]);
        assert_eq!(ranges[0], TextRange::new(1.into(), 10.into()));
    }

    #[test]
    fn test_sub_parameter_ranges_of_degenerate_parameters() {
        assert!(extract_sub_parameter_ranges("{}").is_empty());
        assert!(extract_sub_parameter_ranges("{").is_empty());
        assert!(extract_sub_parameter_ranges("").is_empty());
        assert_eq!(extract_sub_parameter_ranges("{a}").len(), 1);

        let unclosed = "{a,b";
        let ranges = extract_sub_parameter_ranges(unclosed);
        assert_eq!(pieces(unclosed, &ranges), vec!["a", "b"]);
    }
}
