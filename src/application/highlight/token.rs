use std::collections::BTreeMap;
use std::fmt::Write as _;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Style, Theme};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::HighlightError;

/// Opaque style class identifier. Keys are derived from the resolved style
/// itself, so the same theme always produces the same key for the same
/// styling regardless of render order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleKey(String);

impl StyleKey {
    pub fn as_class(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn for_tests(class: &str) -> Self {
        Self(class.to_owned())
    }

    fn from_style(style: &Style) -> Self {
        let Color { r, g, b, .. } = style.foreground;
        let mut class = format!("syntax-{r:02x}{g:02x}{b:02x}");

        let font = style.font_style;
        if !font.is_empty() {
            class.push('-');
            if font.contains(FontStyle::BOLD) {
                class.push('b');
            }
            if font.contains(FontStyle::ITALIC) {
                class.push('i');
            }
            if font.contains(FontStyle::UNDERLINE) {
                class.push('u');
            }
        }

        Self(class)
    }
}

/// One token as produced by the tokenizer. `is_empty` marks placeholder
/// tokens carrying no text; a blank source line tokenizes to exactly one
/// such placeholder so the line itself is preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub style_key: StyleKey,
    pub is_empty: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, style_key: StyleKey) -> Self {
        let text = text.into();
        let is_empty = text.is_empty();
        Self {
            text,
            style_key,
            is_empty,
        }
    }
}

/// The tokens of one source line, line terminator excluded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenLine {
    pub tokens: Vec<Token>,
}

/// Maps style keys back to concrete styles and renders the stylesheet the
/// emitted class names resolve against.
#[derive(Clone, Debug, Default)]
pub struct StyleTable {
    rules: BTreeMap<StyleKey, Style>,
}

impl StyleTable {
    pub fn intern(&mut self, style: &Style) -> StyleKey {
        let key = StyleKey::from_style(style);
        self.rules.entry(key.clone()).or_insert(*style);
        key
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Render one CSS rule per interned key, sorted by class name.
    pub fn css(&self) -> String {
        let mut css = String::new();
        for (key, style) in &self.rules {
            let Color { r, g, b, .. } = style.foreground;
            let _ = write!(css, ".{} {{ color: #{r:02x}{g:02x}{b:02x};", key.as_class());
            if style.font_style.contains(FontStyle::BOLD) {
                css.push_str(" font-weight: bold;");
            }
            if style.font_style.contains(FontStyle::ITALIC) {
                css.push_str(" font-style: italic;");
            }
            if style.font_style.contains(FontStyle::UNDERLINE) {
                css.push_str(" text-decoration: underline;");
            }
            css.push_str(" }\n");
        }
        css
    }
}

/// Tokenize already-trimmed source into lines of styled tokens, interning
/// each distinct style into `table`. Line terminators are stripped from the
/// token texts; the renderer reintroduces them.
pub(crate) fn tokenize(
    source: &str,
    syntax: &SyntaxReference,
    syntax_set: &SyntaxSet,
    theme: &Theme,
    table: &mut StyleTable,
) -> Result<Vec<TokenLine>, HighlightError> {
    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();

    for line in LinesWithEndings::from(source) {
        let ranges = highlighter
            .highlight_line(line, syntax_set)
            .map_err(|err| HighlightError::Tokenize {
                language: syntax.name.clone(),
                message: err.to_string(),
            })?;

        let last_index = ranges.len().saturating_sub(1);
        let mut tokens = Vec::with_capacity(ranges.len());
        for (index, (style, text)) in ranges.into_iter().enumerate() {
            let text = if index == last_index {
                text.strip_suffix('\n').unwrap_or(text)
            } else {
                text
            };
            let style_key = table.intern(&style);
            tokens.push(Token::new(text, style_key));
        }

        lines.push(TokenLine { tokens });
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use syntect::highlighting::ThemeSet;
    use syntect::parsing::SyntaxSet;

    use super::*;

    fn tokenize_rust(source: &str) -> (Vec<TokenLine>, StyleTable) {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        let theme = &theme_set.themes["base16-ocean.light"];
        let syntax = syntax_set
            .find_syntax_by_token("rust")
            .expect("rust syntax available");

        let mut table = StyleTable::default();
        let lines = tokenize(source, syntax, &syntax_set, theme, &mut table)
            .expect("tokenization succeeds");
        (lines, table)
    }

    #[test]
    fn blank_line_yields_a_single_empty_placeholder() {
        let (lines, _) = tokenize_rust("let a = 1;\n\nlet b = 2;");

        assert_eq!(lines.len(), 3);
        let blank = &lines[1];
        assert_eq!(blank.tokens.len(), 1);
        assert!(blank.tokens[0].is_empty);
        assert!(blank.tokens[0].text.is_empty());
    }

    #[test]
    fn indentation_tokens_are_not_empty() {
        let (lines, _) = tokenize_rust("fn main() {\n    let x = 1;\n}");

        let indented: String = lines[1]
            .tokens
            .iter()
            .map(|token| token.text.as_str())
            .collect();
        assert_eq!(indented, "    let x = 1;");
        assert!(
            lines[1]
                .tokens
                .iter()
                .all(|token| !token.is_empty || token.text.is_empty())
        );
    }

    #[test]
    fn token_texts_reconstruct_each_line() {
        let source = "let greeting = \"hi\";\nprintln!(\"{greeting}\");";
        let (lines, _) = tokenize_rust(source);

        let rebuilt: Vec<String> = lines
            .iter()
            .map(|line| {
                line.tokens
                    .iter()
                    .map(|token| token.text.as_str())
                    .collect()
            })
            .collect();
        let expected: Vec<&str> = source.lines().collect();
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn empty_source_produces_no_lines() {
        let (lines, table) = tokenize_rust("");
        assert!(lines.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn style_keys_are_deterministic_across_runs() {
        let source = "const LIMIT: usize = 8;";
        let (first, _) = tokenize_rust(source);
        let (second, _) = tokenize_rust(source);

        let keys = |lines: &[TokenLine]| -> Vec<StyleKey> {
            lines
                .iter()
                .flat_map(|line| line.tokens.iter().map(|token| token.style_key.clone()))
                .collect()
        };
        assert_eq!(keys(&first), keys(&second));
    }

    #[test]
    fn style_table_emits_one_rule_per_key() {
        let (_, table) = tokenize_rust("fn id(x: u8) -> u8 { x }");

        assert!(!table.is_empty());
        let css = table.css();
        assert_eq!(css.lines().count(), table.len());
        assert!(css.contains("color: #"));
    }
}
