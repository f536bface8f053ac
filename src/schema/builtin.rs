//! Built-in block definitions
//!
//! Every block carries the same layout and background sections, so those
//! are appended to each definition before parsing.

use crate::schema::registry::{BlockDefinition, BlockRegistry};

const SHARED_DEFAULTS: &str = r##"
[defaults.layout.blockSettings]
blockWidth = false
height = "auto"

[defaults.layout.spacing]
padding = "md"
margin = "none"
gap = "md"

[defaults.layout.alignment]
text = "center"
vertical = "center"

[defaults.background]
type = "color"
color = "#ffffff"
"##;

const HERO: &str = r##"
[meta]
id = "hero"
name = "Hero"
summary = "Large intro section. elements.title/subtitle (text, visible), elements.button (text, href, variant, visible), elements.image (src, alt, visible)"

[defaults.elements.title]
text = "Build something people love"
visible = true

[defaults.elements.subtitle]
text = "Everything you need to launch, in one place."
visible = true

[defaults.elements.button]
text = "Get started"
href = "#"
variant = "primary"
visible = true

[defaults.elements.image]
src = ""
alt = ""
visible = false
"##;

const FEATURES: &str = r##"
[meta]
id = "features"
name = "Features"
summary = "Grid of features. elements.title, elements.subtitle, elements.items[] (title, description, icon)"

[defaults.elements.title]
text = "Why teams choose us"
visible = true

[defaults.elements.subtitle]
text = "A few of the things we do well."
visible = true

[[defaults.elements.items]]
title = "Fast"
description = "Pages load in the blink of an eye."
icon = "bolt"

[[defaults.elements.items]]
title = "Secure"
description = "Your data stays yours."
icon = "shield"

[[defaults.elements.items]]
title = "Friendly"
description = "Support from real people."
icon = "heart"
"##;

const CTA: &str = r##"
[meta]
id = "cta"
name = "Call to action"
summary = "Short prompt with one button. elements.title, elements.subtitle, elements.button (text, href, variant)"

[defaults.elements.title]
text = "Ready to get started?"
visible = true

[defaults.elements.subtitle]
text = "Join thousands of happy customers."
visible = true

[defaults.elements.button]
text = "Sign up"
href = "#"
variant = "primary"
visible = true
"##;

const TESTIMONIALS: &str = r##"
[meta]
id = "testimonials"
name = "Testimonials"
summary = "Customer quotes. elements.title, elements.items[] (quote, author, role)"

[defaults.elements.title]
text = "What our customers say"
visible = true

[[defaults.elements.items]]
quote = "It just works."
author = "Sam Lee"
role = "Founder"

[[defaults.elements.items]]
quote = "Setup took five minutes."
author = "Alex Kim"
role = "Engineer"
"##;

const TEXT: &str = r##"
[meta]
id = "text"
name = "Text"
summary = "Free-form copy. elements.title, elements.body (text)"

[defaults.elements.title]
text = "About us"
visible = true

[defaults.elements.body]
text = "Tell your story here."
"##;

/// Block types shipped with the crate
pub const BUILTIN_BLOCKS: &[&str] = &[HERO, FEATURES, CTA, TESTIMONIALS, TEXT];

impl BlockRegistry {
    /// Registry preloaded with the built-in block types
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for source in BUILTIN_BLOCKS {
            let content = format!("{}\n{}", source, SHARED_DEFAULTS);
            match BlockDefinition::from_toml_str(&content).and_then(|def| registry.register(def)) {
                Ok(id) => tracing::debug!("Registered built-in block '{}'", id),
                Err(e) => tracing::warn!("Skipping built-in block definition: {}", e),
            }
        }
        registry
    }
}
