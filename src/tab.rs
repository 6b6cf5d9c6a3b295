// Centralized tab-expansion helpers (spec design note: tab semantics differ
// by context — 3 vs. 4 effective spaces — so every rule that strips leading
// whitespace goes through here instead of reimplementing its own count).
//
// Grounded in `grammar::shared::count_indentation`/`skip_indentation`
// (tab stops every 4 columns), generalized to the two call sites that need a
// *bounded* strip: block quote marker stripping (stop at 3) and list-item
// continuation dedent (stop at the item's `continue_width`, usually > 3).

/// Effective column width of the leading run of spaces/tabs in `line`,
/// expanding each tab to the next multiple of 4.
pub fn leading_width(line: &str) -> usize {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4 - (width % 4),
            _ => break,
        }
    }
    width
}

/// Strip up to `max_width` effective columns of leading whitespace from
/// `line`. If a tab would straddle the boundary (partially inside, partially
/// outside `max_width`), it is split: the covered columns are consumed and
/// the rest re-emitted as literal spaces, so no content shifts column.
///
/// Returns `(consumed_width, remainder)`.
pub fn strip_leading_width(line: &str, max_width: usize) -> (usize, String) {
    let mut width = 0;
    let mut byte_idx = 0;
    for ch in line.chars() {
        if width >= max_width {
            break;
        }
        match ch {
            ' ' => {
                width += 1;
                byte_idx += 1;
            }
            '\t' => {
                let stop = 4 - (width % 4);
                if width + stop <= max_width {
                    width += stop;
                    byte_idx += 1;
                } else {
                    // Tab straddles the boundary: consume it, re-emit the
                    // overshoot as spaces so column alignment is preserved.
                    let overshoot = (width + stop) - max_width;
                    let consumed = stop - overshoot;
                    width += consumed;
                    byte_idx += 1;
                    let mut remainder = " ".repeat(overshoot);
                    remainder.push_str(&line[byte_idx..]);
                    return (width, remainder);
                }
            }
            _ => break,
        }
    }
    (width, line[byte_idx..].to_string())
}

/// Dedent every line of a multi-line block by exactly `width` effective
/// columns (used by list-item continuation content: the first line has
/// already had its marker consumed, so only lines after the first need
/// dedenting — callers pass the full text and `width` uniformly and rely on
/// blank lines staying blank).
pub fn dedent_lines(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            // Blank lines carry no indentation to strip.
        } else {
            let (_, rest) = strip_leading_width(line, width);
            out.push_str(&rest);
        }
        if lines.peek().is_some() {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_width_expands_tabs_to_next_stop() {
        assert_eq!(leading_width("    x"), 4);
        assert_eq!(leading_width("\tx"), 4);
        assert_eq!(leading_width(" \tx"), 4);
        assert_eq!(leading_width("x"), 0);
    }

    #[test]
    fn strip_leading_width_bounds_at_three_for_blockquote_marker() {
        let (consumed, rest) = strip_leading_width("   > quote", 3);
        assert_eq!(consumed, 3);
        assert_eq!(rest, "> quote");
    }

    #[test]
    fn strip_leading_width_splits_straddling_tab() {
        // A tab at column 0 expands to 4; asking for only 3 should leave
        // one literal space behind instead of swallowing content.
        let (consumed, rest) = strip_leading_width("\tx", 3);
        assert_eq!(consumed, 3);
        assert_eq!(rest, " x");
    }

    #[test]
    fn dedent_lines_leaves_blank_lines_untouched() {
        let text = "  a\n\n  b";
        assert_eq!(dedent_lines(text, 2), "a\n\nb");
    }
}
