// Cell formatters
//
// Shared formatting utilities for table cells in the TUI and the CLI
// tables. Widths are display columns, not bytes.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format an integer part with commas for readability
///
/// # Examples
/// ```ignore
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, ch) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, ch);
    }

    result
}

/// Format a crypto target (price or percent) for a table cell
///
/// Whole numbers get separators; fractions keep up to two decimals.
pub fn format_target(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    let whole = abs.trunc() as u64;
    let cents = ((abs - abs.trunc()) * 100.0).round() as u64;
    match cents {
        0 => format!("{}{}", sign, format_number(whole)),
        100 => format!("{}{}", sign, format_number(whole + 1)),
        c if c % 10 == 0 => format!("{}{}.{}", sign, format_number(whole), c / 10),
        c => format!("{}{}.{:02}", sign, format_number(whole), c),
    }
}

pub fn active_label(active: bool) -> &'static str {
    if active {
        "● active"
    } else {
        "○ paused"
    }
}

/// Cut text to at most `width` display columns, marking the cut with '…'
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Pad text with spaces to exactly `width` display columns (truncating first)
pub fn pad_to_width(text: &str, width: usize) -> String {
    let cut = truncate_to_width(text, width);
    let pad = width.saturating_sub(cut.width());
    format!("{}{}", cut, " ".repeat(pad))
}
