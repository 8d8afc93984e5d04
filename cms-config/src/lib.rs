//! Shared configuration loader for the cms-md toolchain.
//!
//! `defaults/cms-md.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`CmsMdConfig`].
//!
//! The [`cms`] module is a separate concern: it loads and validates the
//! configuration file of the CMS itself (backend, media, collections).

pub mod cms;

use cms_babel::formats::{HtmlFormat, MarkdownFormat, TreevizFormat};
use cms_babel::{ComponentRegistry, FormatRegistry, TemplateComponent};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/cms-md.default.toml");

/// Top-level configuration consumed by cms-md applications.
#[derive(Debug, Clone, Deserialize)]
pub struct CmsMdConfig {
    pub markdown: MarkdownConfig,
    pub preview: PreviewConfig,
    pub inspect: InspectConfig,
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

/// Markdown import/export knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub void_code_block: bool,
    pub bullet_char: char,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    pub unsafe_html: bool,
}

/// Controls inspect output.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    pub treeviz: TreevizConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreevizConfig {
    pub show_data: bool,
}

/// An editor component declared in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentConfig {
    pub id: String,
    pub pattern: String,
    pub block: String,
    pub label: Option<String>,
    pub preview: Option<String>,
}

impl TryFrom<&ComponentConfig> for TemplateComponent {
    type Error = ConfigError;

    fn try_from(config: &ComponentConfig) -> Result<Self, Self::Error> {
        let mut component = TemplateComponent::new(&config.id, &config.pattern, &config.block)
            .map_err(|e| {
                ConfigError::Message(format!("component '{}' has an invalid pattern: {e}", config.id))
            })?;
        if let Some(label) = &config.label {
            component = component.with_label(label);
        }
        if let Some(preview) = &config.preview {
            component = component.with_preview(preview);
        }
        Ok(component)
    }
}

impl CmsMdConfig {
    /// Registry holding every configured component.
    pub fn component_registry(&self) -> Result<ComponentRegistry, ConfigError> {
        let mut registry = ComponentRegistry::new();
        for component in &self.components {
            registry.register(TemplateComponent::try_from(component)?);
        }
        Ok(registry)
    }

    /// The default formats, with the configurable ones set up from this
    /// configuration.
    pub fn format_registry(&self) -> Result<FormatRegistry, ConfigError> {
        let components = self.component_registry()?;
        let markdown = MarkdownFormat::new(components.clone())
            .with_void_code_block(self.markdown.void_code_block)
            .with_bullet_char(self.markdown.bullet_char)
            .map_err(|e| ConfigError::Message(format!("markdown.bullet_char: {e}")))?;
        let html = HtmlFormat::new(components)
            .with_unsafe_html(self.preview.unsafe_html)
            .with_void_code_block(self.markdown.void_code_block);
        let treeviz = TreevizFormat::default()
            .with_show_data(self.inspect.treeviz.show_data)
            .with_void_code_block(self.markdown.void_code_block);

        let mut registry = FormatRegistry::with_defaults();
        registry.register(markdown);
        registry.register(html);
        registry.register(treeviz);
        Ok(registry)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer TOML text, e.g. settings embedded by a host application.
    pub fn with_str(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<CmsMdConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<CmsMdConfig, ConfigError> {
    Loader::new().build()
}
