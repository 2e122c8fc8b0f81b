//! Turns LaTeX-flavoured model output into text that reads well in a chat.

/// Delimiter wrapped around equation lines so they render monospaced.
pub const FIXED_WIDTH_FENCE: &str = "```";

/// Escape sequences and their display glyphs, applied top to bottom.
///
/// Order matters: `\\` collapses first, `\overrightarrow` runs before `\rightarrow`,
/// and the `" \"` entry runs after every named command.
const SYMBOLS: &[(&str, &str)] = &[
    ("\\\\", "\\"),
    ("\\overrightarrow", "→"),
    ("\\[", ""),
    ("\\]", ""),
    ("\\vec", "→"),
    ("_1", "₁"),
    ("_2", "₂"),
    ("_3", "₃"),
    ("_4", "₄"),
    ("\\{", "{"),
    ("\\}", "}"),
    ("\\cdot", "·"),
    ("\\times", "×"),
    ("\\rightarrow", "→"),
    ("\\leftarrow", "←"),
    ("\\Rightarrow", "⇒"),
    ("\\Leftarrow", "⇐"),
    ("\\approx", "≈"),
    ("\\neq", "≠"),
    ("\\leq", "≤"),
    ("\\geq", "≥"),
    ("\\sqrt", "√"),
    ("\\infty", "∞"),
    ("\\pi", "π"),
    (" \\", " "),
    ("\\(", "("),
    ("\\)", ")"),
];

/// Point names the models like to write without an underscore.
const POINT_SUBSCRIPTS: &[(&str, &str)] = &[("M1", "M₁"), ("M2", "M₂")];

/// Lines starting with one of these are list items and never fenced.
const LIST_MARKERS: &[&str] = &["•", "-", "1.", "2.", "3.", "4.", "5.", "6.", "7.", "8.", "9."];

pub fn normalize(text: &str) -> String {
    let mut text = text.to_string();
    for (pattern, glyph) in SYMBOLS {
        text = text.replace(pattern, glyph);
    }
    text = text.replace('\\', "");
    for (pattern, glyph) in POINT_SUBSCRIPTS {
        text = text.replace(pattern, glyph);
    }

    text.split('\n')
        .map(fence_equation)
        .collect::<Vec<_>>()
        .join("\n")
}

fn fence_equation(line: &str) -> String {
    let line = line.trim();
    if line.contains('=') && !is_list_item(line) && !is_fenced(line) {
        format!("{FIXED_WIDTH_FENCE}{line}{FIXED_WIDTH_FENCE}")
    } else {
        line.to_string()
    }
}

fn is_list_item(line: &str) -> bool {
    LIST_MARKERS.iter().any(|marker| line.starts_with(marker))
}

fn is_fenced(line: &str) -> bool {
    line.len() >= 2 * FIXED_WIDTH_FENCE.len()
        && line.starts_with(FIXED_WIDTH_FENCE)
        && line.ends_with(FIXED_WIDTH_FENCE)
}
