//! Icon mapping for tree visualization
//!
//! Maps document AST type names to single Unicode icons so node kinds can be
//! told apart at a glance.

/// Get the Unicode icon for a document AST type name (`heading`, `inlineCode`, ...)
pub fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        "root" => "⧉",
        "paragraph" => "¶",
        "heading" => "§",
        "blockquote" => "❝",
        "code" => "𝒱",
        "list" => "☰",
        "listItem" => "•",
        "table" => "▦",
        "tableRow" => "═",
        "tableCell" => "▢",
        "break" => "↵",
        "thematicBreak" => "⎯",
        "shortcode" => "⚙",
        "text" => "◦",
        "html" => "‹",
        "emphasis" => "𝐼",
        "strong" => "𝐁",
        "delete" => "∓",
        "inlineCode" => "ƒ",
        "link" => "⊕",
        "image" => "▣",
        "data" => "≔",
        _ => "○",
    }
}
