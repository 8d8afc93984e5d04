//! Editor components (shortcodes)
//!
//! An editor component is a plugin-defined block. In Markdown it is a
//! paragraph matching the component's pattern; in the rich tree it is an
//! opaque `shortcode` block holding the component id and the data extracted
//! from the match. Components render that data back to Markdown
//! ([`EditorComponent::to_block`]) and to preview HTML
//! ([`EditorComponent::to_preview`]).

use crate::rich::ShortcodeData;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

pub trait EditorComponent: Send + Sync {
    fn id(&self) -> &str;

    fn label(&self) -> &str {
        self.id()
    }

    /// Pattern a whole paragraph must match to become this component.
    fn pattern(&self) -> &Regex;

    /// Data stored in the shortcode block for a match.
    fn from_block(&self, captures: &Captures<'_>) -> Map<String, Value>;

    /// Markdown for the stored data.
    fn to_block(&self, data: &Map<String, Value>) -> String;

    /// Preview HTML for the stored data.
    fn to_preview(&self, data: &Map<String, Value>) -> String {
        self.to_block(data)
    }
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap());

/// Fills `{{field}}` placeholders from `data`. Missing fields render empty.
pub fn render_template(template: &str, data: &Map<String, Value>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match data.get(&caps[1]) {
            Some(Value::String(value)) => value.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
        .into_owned()
}

/// A component declared as data: a pattern with named groups and templates
/// for the Markdown and preview renderings.
#[derive(Debug, Clone)]
pub struct TemplateComponent {
    id: String,
    label: String,
    pattern: Regex,
    block: String,
    preview: Option<String>,
}

impl TemplateComponent {
    pub fn new(id: impl Into<String>, pattern: &str, block: impl Into<String>) -> Result<Self, regex::Error> {
        let id = id.into();
        Ok(TemplateComponent {
            label: id.clone(),
            id,
            pattern: Regex::new(pattern)?,
            block: block.into(),
            preview: None,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }
}

impl EditorComponent for TemplateComponent {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn from_block(&self, captures: &Captures<'_>) -> Map<String, Value> {
        self.pattern
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), Value::String(m.as_str().to_string())))
            })
            .collect()
    }

    fn to_block(&self, data: &Map<String, Value>) -> String {
        render_template(&self.block, data)
    }

    fn to_preview(&self, data: &Map<String, Value>) -> String {
        match &self.preview {
            Some(preview) => render_template(preview, data),
            None => self.to_block(data),
        }
    }
}

/// Registered components, consulted in registration order.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<Arc<dyn EditorComponent>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component, replacing any component with the same id.
    pub fn register<C: EditorComponent + 'static>(&mut self, component: C) {
        self.components.retain(|c| c.id() != component.id());
        self.components.push(Arc::new(component));
    }

    pub fn get(&self, id: &str) -> Option<&dyn EditorComponent> {
        self.components
            .iter()
            .find(|c| c.id() == id)
            .map(|c| c.as_ref())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The shortcode for a block of Markdown, when one component's pattern
    /// matches all of it.
    pub fn match_block(&self, source: &str) -> Option<ShortcodeData> {
        let source = source.trim();
        self.components.iter().find_map(|component| {
            let captures = component.pattern().captures(source)?;
            let whole = captures.get(0)?;
            if whole.start() != 0 || whole.end() != source.len() {
                return None;
            }
            debug!(component = component.id(), "matched editor component");
            Some(ShortcodeData {
                shortcode: component.id().to_string(),
                shortcode_data: component.from_block(&captures),
            })
        })
    }

    pub fn to_block(&self, data: &ShortcodeData) -> String {
        match self.get(&data.shortcode) {
            Some(component) => component.to_block(&data.shortcode_data),
            None => missing(&data.shortcode),
        }
    }

    pub fn to_preview(&self, data: &ShortcodeData) -> String {
        match self.get(&data.shortcode) {
            Some(component) => component.to_preview(&data.shortcode_data),
            None => missing(&data.shortcode),
        }
    }
}

fn missing(id: &str) -> String {
    warn!(shortcode = id, "no editor component registered");
    format!("<!-- unknown editor component: {id} -->")
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.ids())
            .finish()
    }
}
