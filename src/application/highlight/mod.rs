//! Syntect-backed code block rendering.
//!
//! Source text is trimmed once, tokenized line by line, and re-emitted as
//! styled fragments whose class names resolve through a shared [`StyleTable`].
//! Rendering is deterministic and side-effect free apart from the table, which
//! only ever accretes class definitions.

pub mod render;
pub mod token;

use std::fmt::Write as _;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use metrics::counter;
use once_cell::sync::{Lazy, OnceCell};
use syntect::dumps::from_uncompressed_data;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use thiserror::Error;

use crate::config::DEFAULT_SYNTAX_THEME;

pub use render::{BlockLayout, RenderedBlock, RenderedLine, StyledFragment};
pub use token::{StyleKey, StyleTable, Token, TokenLine};

use token::tokenize;

const METRIC_HIGHLIGHT_BLOCKS: &str = "vetrina_highlight_blocks_total";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HighlightError {
    #[error("failed to tokenize {language} source: {message}")]
    Tokenize { language: String, message: String },
}

/// Syntect-based highlighting service with a crate-wide style table.
pub struct SyntectHighlightService {
    syntax_set: SyntaxSet,
    theme: Theme,
    styles: RwLock<StyleTable>,
}

impl SyntectHighlightService {
    /// Construct the service from the embedded syntax pack and the configured
    /// theme, falling back to the bundled default when unconfigured.
    fn new() -> Self {
        let syntax_bytes = include_bytes!(env!("SYNTAX_PACK_FILE"));
        let syntax_set: SyntaxSet =
            from_uncompressed_data(syntax_bytes).expect("embedded syntax pack should deserialize");

        let config = active_highlight_config();
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(config.theme.as_str())
            .or_else(|| themes.themes.remove(DEFAULT_SYNTAX_THEME))
            .expect("bundled default theme must be present");

        Self {
            syntax_set,
            theme,
            styles: RwLock::new(StyleTable::default()),
        }
    }

    /// Render one code block. The source is end-trimmed exactly once before
    /// tokenization; repeated calls with the same input produce the same
    /// block.
    pub fn render(
        &self,
        source: &str,
        language: &str,
        layout: BlockLayout,
    ) -> Result<RenderedBlock, HighlightError> {
        let trimmed = source.trim_end();
        let syntax = self.find_syntax(language);

        let lines = {
            let mut table = self.styles_write();
            tokenize(trimmed, syntax, &self.syntax_set, &self.theme, &mut table)?
        };

        let block = RenderedBlock::assemble(lines, layout, language);
        counter!(METRIC_HIGHLIGHT_BLOCKS, "layout" => layout.as_str()).increment(1);
        Ok(block)
    }

    /// The stylesheet every rendered block's class names resolve against.
    /// Complete once all startup content has been rendered.
    pub fn stylesheet(&self) -> String {
        let mut css = String::new();
        if let Some(name) = &self.theme.name {
            let _ = writeln!(css, "/* syntect theme: {name} */");
        }

        css.push_str(".syntax-highlight {");
        if let Some(Color { r, g, b, .. }) = self.theme.settings.foreground {
            let _ = write!(css, " color: #{r:02x}{g:02x}{b:02x};");
        }
        if let Some(Color { r, g, b, .. }) = self.theme.settings.background {
            let _ = write!(css, " background-color: #{r:02x}{g:02x}{b:02x};");
        }
        css.push_str(" }\n");

        css.push_str(&self.styles_read().css());
        css
    }

    /// Resolve a language tag to a syntax definition, trying the token form
    /// first, then the full name, then treating the tag as a file extension.
    /// Unknown languages highlight as plain text.
    fn find_syntax(&self, language: &str) -> &SyntaxReference {
        let trimmed = language.trim();
        if trimmed.is_empty() {
            return self.syntax_set.find_syntax_plain_text();
        }

        self.syntax_set
            .find_syntax_by_token(trimmed)
            .or_else(|| self.syntax_set.find_syntax_by_name(trimmed))
            .or_else(|| {
                self.syntax_set
                    .find_syntax_by_extension(&trimmed.to_ascii_lowercase())
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn styles_read(&self) -> RwLockReadGuard<'_, StyleTable> {
        self.styles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn styles_write(&self) -> RwLockWriteGuard<'_, StyleTable> {
        self.styles.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SyntectHighlightService {
    fn default() -> Self {
        Self::new()
    }
}

static HIGHLIGHT_SERVICE: Lazy<Arc<SyntectHighlightService>> =
    Lazy::new(|| Arc::new(SyntectHighlightService::new()));

/// Access the shared highlight service instance, initialised on first use.
pub fn highlight_service() -> Arc<SyntectHighlightService> {
    Arc::clone(&HIGHLIGHT_SERVICE)
}

#[derive(Debug, Clone)]
pub struct HighlightConfig {
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: DEFAULT_SYNTAX_THEME.to_string(),
        }
    }
}

impl From<&crate::config::RenderSettings> for HighlightConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        Self {
            theme: settings.theme.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum HighlightConfigError {
    #[error("highlight service already configured")]
    AlreadyConfigured,
    #[error("syntax theme `{name}` is not bundled")]
    UnknownTheme { name: String },
}

static HIGHLIGHT_CONFIG: OnceCell<HighlightConfig> = OnceCell::new();

/// Pin the highlight configuration before the service is first used. Rejects
/// theme names absent from the bundled theme set so a typo fails startup
/// instead of silently falling back.
pub fn configure_highlighting(config: HighlightConfig) -> Result<(), HighlightConfigError> {
    if !ThemeSet::load_defaults().themes.contains_key(&config.theme) {
        return Err(HighlightConfigError::UnknownTheme { name: config.theme });
    }
    HIGHLIGHT_CONFIG
        .set(config)
        .map_err(|_| HighlightConfigError::AlreadyConfigured)
}

fn active_highlight_config() -> HighlightConfig {
    HIGHLIGHT_CONFIG.get().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let service = highlight_service();
        let block = service
            .render("plain words", "no-such-language", BlockLayout::Flow)
            .expect("plain text rendering succeeds");

        assert_eq!(block.line_count(), 1);
        assert_eq!(block.source_text(), "plain words");
    }

    #[test]
    fn source_is_end_trimmed_exactly_once() {
        let service = highlight_service();
        let source = "fn main() {}\n\n   \n";
        let block = service
            .render(source, "rust", BlockLayout::Flow)
            .expect("rendering succeeds");

        assert_eq!(block.source_text(), source.trim_end());
        assert_eq!(block.line_count(), 1);
    }

    #[test]
    fn rendered_block_round_trips_to_trimmed_source() {
        let service = highlight_service();
        let source = "let port = 3000;\n\nlet host = \"0.0.0.0\";\nstart(host, port);\n";
        let block = service
            .render(source, "rust", BlockLayout::Flow)
            .expect("rendering succeeds");

        assert_eq!(block.source_text(), source.trim_end());
    }

    #[test]
    fn rendering_is_idempotent() {
        let service = highlight_service();
        let source = "[server]\nport = 3000";
        let first = service
            .render(source, "toml", BlockLayout::LineBlocks)
            .expect("first render succeeds");
        let second = service
            .render(source, "toml", BlockLayout::LineBlocks)
            .expect("second render succeeds");

        assert_eq!(first.html(), second.html());
    }

    #[test]
    fn stylesheet_contains_theme_base_rule_and_interned_classes() {
        let service = highlight_service();
        service
            .render("fn demo() {}", "rust", BlockLayout::Flow)
            .expect("rendering succeeds");

        let css = service.stylesheet();
        assert!(css.contains(".syntax-highlight {"));
        assert!(css.contains(".syntax-"));
        assert!(!service.styles_read().is_empty());
    }

    #[test]
    fn extension_fallback_resolves_rs_tag() {
        let service = highlight_service();
        let block = service
            .render("fn x() {}", "rs", BlockLayout::Flow)
            .expect("rendering succeeds");

        assert!(block.html().contains("data-language=\"rs\""));
    }
}
