//! Keyword tables for target resolution
//!
//! Per block type, an ordered list of element groups. Each group maps a set
//! of keywords to a path prefix and may refine it with secondary keywords.
//! Background and layout groups are shared by every block type.

/// Secondary keyword set that narrows a group's prefix
#[derive(Debug, Clone, Copy)]
pub struct Refinement {
    pub keywords: &'static [&'static str],
    pub suffix: &'static str,
}

/// One addressable part of a block
#[derive(Debug, Clone, Copy)]
pub struct ElementGroup {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub prefix: &'static str,
    pub refinements: &'static [Refinement],
    /// Group holds an array addressable as `prefix[n]` by "item 2" phrasing
    pub indexed: bool,
}

/// Element table for one block type
#[derive(Debug, Clone, Copy)]
pub struct BlockKeywords {
    pub block_type: &'static str,
    pub elements: &'static [ElementGroup],
}

const fn refine(keywords: &'static [&'static str], suffix: &'static str) -> Refinement {
    Refinement { keywords, suffix }
}

const fn group(
    name: &'static str,
    keywords: &'static [&'static str],
    prefix: &'static str,
    refinements: &'static [Refinement],
) -> ElementGroup {
    ElementGroup {
        name,
        keywords,
        prefix,
        refinements,
        indexed: false,
    }
}

const fn indexed_group(
    name: &'static str,
    keywords: &'static [&'static str],
    prefix: &'static str,
    refinements: &'static [Refinement],
) -> ElementGroup {
    ElementGroup {
        name,
        keywords,
        prefix,
        refinements,
        indexed: true,
    }
}

const TEXT_REFINEMENTS: &[Refinement] = &[
    refine(&["text", "wording", "copy", "words"], "text"),
    refine(&["size", "bigger", "smaller", "larger"], "size"),
    refine(&["color", "colour"], "color"),
];

const TITLE: ElementGroup = group(
    "title",
    &["title", "heading", "headline", "header"],
    "elements.title",
    TEXT_REFINEMENTS,
);

const SUBTITLE: ElementGroup = group(
    "subtitle",
    &["subtitle", "subheading", "tagline", "description", "subtext"],
    "elements.subtitle",
    TEXT_REFINEMENTS,
);

const BUTTON: ElementGroup = group(
    "button",
    &["button", "cta", "link", "buttons"],
    "elements.button",
    &[
        refine(&["text", "label", "wording", "says"], "text"),
        refine(&["color", "colour", "style", "variant"], "variant"),
        refine(&["href", "url", "destination", "points to", "goes to"], "href"),
    ],
);

const IMAGE: ElementGroup = group(
    "image",
    &["image", "photo", "picture", "illustration"],
    "elements.image",
    &[
        refine(&["alt", "alt text"], "alt"),
        refine(&["src", "url", "source", "file"], "src"),
    ],
);

const ITEM_REFINEMENTS: &[Refinement] = &[
    refine(&["title", "heading", "name"], "title"),
    refine(&["description", "text", "body", "copy"], "description"),
    refine(&["icon"], "icon"),
];

/// Group keywords and refinements for the shared background subtree
pub const BACKGROUND: ElementGroup = group(
    "background",
    &["background", "bg", "backdrop", "gradient"],
    "background",
    &[
        refine(&["color", "colour"], "color"),
        refine(&["gradient"], "gradient"),
        refine(&["image", "photo", "picture"], "image"),
        refine(&["video"], "video"),
        refine(&["overlay", "tint"], "overlay"),
    ],
);

/// Group keywords and refinements for the shared layout subtree
pub const LAYOUT: ElementGroup = group(
    "layout",
    &[
        "layout", "width", "height", "padding", "margin", "spacing", "gap", "align",
        "alignment", "aligned",
    ],
    "layout",
    &[
        refine(&["width", "wide", "wider", "narrow"], "blockSettings.blockWidth"),
        refine(&["height", "tall", "taller", "shorter"], "blockSettings.height"),
        refine(&["padding"], "spacing.padding"),
        refine(&["margin"], "spacing.margin"),
        refine(&["gap", "space between"], "spacing.gap"),
        refine(&["align", "alignment", "aligned"], "alignment.text"),
    ],
);

/// Words meaning the whole block rather than one named part
pub const BLOCK_WIDE: &[&str] = &[
    "whole block",
    "entire block",
    "whole section",
    "entire section",
    "everything",
    "all of it",
    "overall",
    "redesign",
    "rewrite it",
    "the vibe",
];

pub static BLOCK_TABLES: &[BlockKeywords] = &[
    BlockKeywords {
        block_type: "hero",
        elements: &[TITLE, SUBTITLE, BUTTON, IMAGE],
    },
    BlockKeywords {
        block_type: "features",
        elements: &[
            TITLE,
            group(
                "intro",
                &["intro", "subtitle", "description", "tagline"],
                "elements.subtitle",
                TEXT_REFINEMENTS,
            ),
            indexed_group(
                "items",
                &["feature", "features", "item", "items", "card", "cards"],
                "elements.items",
                ITEM_REFINEMENTS,
            ),
        ],
    },
    BlockKeywords {
        block_type: "cta",
        elements: &[TITLE, SUBTITLE, BUTTON],
    },
    BlockKeywords {
        block_type: "testimonials",
        elements: &[
            TITLE,
            indexed_group(
                "items",
                &["testimonial", "testimonials", "quote", "quotes", "review", "reviews"],
                "elements.items",
                &[
                    refine(&["quote", "text", "wording"], "quote"),
                    refine(&["author", "name", "who"], "author"),
                    refine(&["role", "company", "position"], "role"),
                ],
            ),
        ],
    },
    BlockKeywords {
        block_type: "text",
        elements: &[
            TITLE,
            group(
                "body",
                &["body", "paragraph", "paragraphs", "content", "copy"],
                "elements.body",
                &[refine(&["text", "wording"], "text")],
            ),
        ],
    },
];

/// Lowercased words of a command, padded with spaces for phrase lookup
pub fn normalize(command: &str) -> String {
    let words: Vec<String> = command
        .split(|c: char| !c.is_alphanumeric() && c != '#')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();
    format!(" {} ", words.join(" "))
}

/// Whole-word (or whole-phrase) match against [`normalize`]d text
pub fn mentions(normalized: &str, keyword: &str) -> bool {
    normalized.contains(&format!(" {} ", keyword))
}

pub fn mentions_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| mentions(normalized, kw))
}

/// Elements assumed for block types without a dedicated table
pub static GENERIC_ELEMENTS: &[ElementGroup] = &[TITLE, SUBTITLE, BUTTON, IMAGE];

/// Element groups for a block type, falling back to the generic table
pub fn elements_for(block_type: &str) -> &'static [ElementGroup] {
    BLOCK_TABLES
        .iter()
        .find(|table| table.block_type.eq_ignore_ascii_case(block_type))
        .map_or(GENERIC_ELEMENTS, |table| table.elements)
}
