//! Rule table for property-level command classification
//!
//! Each entry pairs a handful of case-insensitive patterns with the intent
//! it drafts. The table is plain data: order matters only for
//! deduplication (the first rule to claim a `(path, action)` pair wins), so
//! more specific phrasings sit above the general ones they overlap with.

use crate::core::types::{IntentAction, IntentCategory};

/// Where a rule takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleValue {
    /// No value (relative and reset actions)
    None,
    Bool(bool),
    Text(&'static str),
    /// First capture group of the matching pattern
    Captured,
}

/// Draft intent emitted when a rule matches
#[derive(Debug, Clone, Copy)]
pub struct IntentTemplate {
    pub category: IntentCategory,
    pub action: IntentAction,
    pub path: &'static str,
    pub value: RuleValue,
    /// Append the first capture group to `path` (directional spacing)
    pub path_from_capture: bool,
}

/// One row of the table
#[derive(Debug, Clone, Copy)]
pub struct RuleEntry {
    pub patterns: &'static [&'static str],
    pub template: IntentTemplate,
}

const fn rule(
    patterns: &'static [&'static str],
    category: IntentCategory,
    action: IntentAction,
    path: &'static str,
    value: RuleValue,
) -> RuleEntry {
    RuleEntry {
        patterns,
        template: IntentTemplate {
            category,
            action,
            path,
            value,
            path_from_capture: false,
        },
    }
}

const fn directional(
    patterns: &'static [&'static str],
    action: IntentAction,
    path: &'static str,
) -> RuleEntry {
    RuleEntry {
        patterns,
        template: IntentTemplate {
            category: IntentCategory::Spacing,
            action,
            path,
            value: RuleValue::None,
            path_from_capture: true,
        },
    }
}

use IntentAction::*;
use IntentCategory::*;

pub const BLOCK_WIDTH_PATH: &str = "layout.blockSettings.blockWidth";
pub const BLOCK_HEIGHT_PATH: &str = "layout.blockSettings.height";
pub const PADDING_PATH: &str = "layout.spacing.padding";
pub const MARGIN_PATH: &str = "layout.spacing.margin";
pub const GAP_PATH: &str = "layout.spacing.gap";

/// Built-in rule table
pub static RULES: &[RuleEntry] = &[
    // === LAYOUT ===
    rule(
        &[r"not\s+full[\s-]?width", r"\bcontained\b", r"\bboxed\b", r"\bnarrower\b"],
        Layout,
        Set,
        BLOCK_WIDTH_PATH,
        RuleValue::Bool(false),
    ),
    rule(
        &[
            r"full[\s-]?width",
            r"edge[\s-]to[\s-]edge",
            r"stretch(?:ed)?\s+(?:all\s+the\s+way\s+)?across",
        ],
        Layout,
        Set,
        BLOCK_WIDTH_PATH,
        RuleValue::Bool(true),
    ),
    rule(
        &[
            r"full[\s-]?(?:height|screen)",
            r"\b100vh\b",
            r"fill\s+(?:the\s+)?(?:screen|viewport)",
        ],
        Layout,
        Set,
        BLOCK_HEIGHT_PATH,
        RuleValue::Text("full"),
    ),
    rule(
        &[r"auto(?:matic)?[\s-]?height", r"fit\s+(?:the\s+)?content"],
        Layout,
        Set,
        BLOCK_HEIGHT_PATH,
        RuleValue::Text("auto"),
    ),
    // === BACKGROUND ===
    rule(
        &[r"\b(sunset|ocean|forest|aurora|midnight|peach|lavender|fire|mint)\s+gradient"],
        Background,
        Set,
        "background.gradient",
        RuleValue::Captured,
    ),
    rule(
        &[r"\bgradient\b"],
        Background,
        Set,
        "background.type",
        RuleValue::Text("gradient"),
    ),
    rule(
        &[
            r"(?:background|bg)\s+colou?r\s+(?:to\s+)?(#[0-9a-f]{3,8}|red|orange|yellow|green|blue|purple|pink|black|white|gray|grey|navy|teal)\b",
            r"\b(red|orange|yellow|green|blue|purple|pink|black|white|gray|grey|navy|teal)\s+(?:background|bg)\b",
        ],
        Background,
        Set,
        "background.color",
        RuleValue::Captured,
    ),
    rule(
        &[r"(?:background|bg)\s+(?:image|photo|picture)", r"(?:image|photo|picture)\s+(?:background|bg)"],
        Background,
        Set,
        "background.type",
        RuleValue::Text("image"),
    ),
    rule(
        &[r"video\s+(?:background|bg)", r"(?:background|bg)\s+video"],
        Background,
        Set,
        "background.type",
        RuleValue::Text("video"),
    ),
    rule(
        &[r"(?:remove|clear|reset)\s+(?:the\s+)?(?:background|bg)\b", r"\bno\s+(?:background|bg)\b"],
        Background,
        Reset,
        "background",
        RuleValue::None,
    ),
    // === SPACING ===
    directional(
        &[r"(?:more|increase|bigger|larger)\s+(?:the\s+)?(top|bottom|left|right)\s+padding"],
        Increase,
        PADDING_PATH,
    ),
    directional(
        &[r"(?:less|decrease|reduce|smaller)\s+(?:the\s+)?(top|bottom|left|right)\s+padding"],
        Decrease,
        PADDING_PATH,
    ),
    rule(
        &[r"(?:remove|no)\s+(?:the\s+)?padding"],
        Spacing,
        Set,
        PADDING_PATH,
        RuleValue::Text("none"),
    ),
    rule(
        &[r"reset\s+(?:the\s+)?padding"],
        Spacing,
        Reset,
        PADDING_PATH,
        RuleValue::None,
    ),
    rule(
        &[
            r"more\s+(?:\w+\s+)?padding",
            r"(?:increase|bigger|larger)\s+(?:the\s+)?padding",
            r"padding\s+(?:bigger|larger)",
            r"more\s+breathing\s+room",
            r"more\s+space\s+(?:inside|around)",
        ],
        Spacing,
        Increase,
        PADDING_PATH,
        RuleValue::None,
    ),
    rule(
        &[
            r"less\s+(?:\w+\s+)?padding",
            r"(?:decrease|reduce|shrink|smaller)\s+(?:the\s+)?padding",
            r"padding\s+smaller",
            r"\btighter\b",
        ],
        Spacing,
        Decrease,
        PADDING_PATH,
        RuleValue::None,
    ),
    rule(
        &[r"more\s+(?:\w+\s+)?margin", r"(?:increase|bigger|larger)\s+(?:the\s+)?margin"],
        Spacing,
        Increase,
        MARGIN_PATH,
        RuleValue::None,
    ),
    rule(
        &[r"less\s+(?:\w+\s+)?margin", r"(?:decrease|reduce|shrink|smaller)\s+(?:the\s+)?margin"],
        Spacing,
        Decrease,
        MARGIN_PATH,
        RuleValue::None,
    ),
    rule(
        &[r"more\s+(?:space|room|gap)\s+between", r"spread\s+(?:them\s+|things\s+)?out", r"(?:increase|bigger)\s+(?:the\s+)?gap"],
        Spacing,
        Increase,
        GAP_PATH,
        RuleValue::None,
    ),
    rule(
        &[r"less\s+(?:space|room|gap)\s+between", r"closer\s+together", r"(?:decrease|reduce|smaller)\s+(?:the\s+)?gap"],
        Spacing,
        Decrease,
        GAP_PATH,
        RuleValue::None,
    ),
    // === ALIGNMENT ===
    rule(
        &[r"vertical(?:ly)?\s+(?:align\w*\s+)?(?:to\s+(?:the\s+)?)?(top|center|centre|middle|bottom)"],
        Alignment,
        Set,
        "layout.alignment.vertical",
        RuleValue::Captured,
    ),
    rule(
        &[
            r"(?:align|justify)\w*\s+(?:\w+\s+)?(?:to\s+(?:the\s+)?)?(left|center|centre|right)",
            r"\b(center|centre)\s+(?:the\s+|all\s+)?(?:text|content|everything)",
            r"\b(left|right)[\s-]align",
        ],
        Alignment,
        Set,
        "layout.alignment.text",
        RuleValue::Captured,
    ),
    // === CONTENT VISIBILITY ===
    rule(
        &[r"(?:hide|remove)\s+(?:the\s+)?(?:subtitle|subheading|tagline)"],
        Content,
        Set,
        "elements.subtitle.visible",
        RuleValue::Bool(false),
    ),
    rule(
        &[r"(?:show|display|add)\s+(?:a\s+|the\s+)?(?:subtitle|subheading|tagline)"],
        Content,
        Set,
        "elements.subtitle.visible",
        RuleValue::Bool(true),
    ),
    rule(
        &[r"(?:hide|remove)\s+(?:the\s+)?(?:button|cta)"],
        Content,
        Set,
        "elements.button.visible",
        RuleValue::Bool(false),
    ),
    rule(
        &[r"(?:show|display|add)\s+(?:a\s+|the\s+)?(?:button|cta)"],
        Content,
        Set,
        "elements.button.visible",
        RuleValue::Bool(true),
    ),
    rule(
        &[r"(?:hide|remove)\s+(?:the\s+)?(?:title|heading|headline)"],
        Content,
        Set,
        "elements.title.visible",
        RuleValue::Bool(false),
    ),
    rule(
        &[r"toggle\s+(?:the\s+)?(?:image|picture|photo)"],
        Content,
        Toggle,
        "elements.image.visible",
        RuleValue::None,
    ),
];

/// Normalize a captured value to the vocabulary stored in trees
pub fn normalize_capture(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    match lower.as_str() {
        "centre" | "middle" => "center".into(),
        "grey" => "gray".into(),
        _ => lower,
    }
}
