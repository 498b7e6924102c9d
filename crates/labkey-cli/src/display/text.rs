use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Flatten a cell value onto one line and clip it to `max_width` display
/// columns, ending in `...` when clipped.
///
/// # Examples
/// ```ignore
/// assert_eq!(fit_cell("Specimen\ncollection", 11), "Specimen...");
/// ```
pub fn fit_cell(text: &str, max_width: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.width() <= max_width {
        return flat;
    }

    let Some(budget) = max_width.checked_sub(ELLIPSIS.len()) else {
        return ".".repeat(max_width);
    };

    let mut used = 0;
    let mut clipped: String = flat
        .chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= budget
        })
        .collect();
    clipped.push_str(ELLIPSIS);
    clipped
}
