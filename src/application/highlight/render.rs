use super::token::{StyleKey, TokenLine};

/// How rendered lines are laid out inside the block container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockLayout {
    /// Fragments flow inside the container with a newline closing each line.
    #[default]
    Flow,
    /// Each line gets its own container and the container boundary acts as
    /// the line terminator.
    LineBlocks,
}

impl BlockLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::LineBlocks => "line-blocks",
        }
    }
}

/// A surviving token carrying visible text and its style class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledFragment {
    pub text: String,
    pub style_key: StyleKey,
}

/// The fragments of one rendered line. A line that tokenized to nothing but
/// placeholders keeps an empty fragment list; it still terminates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedLine {
    pub fragments: Vec<StyledFragment>,
}

/// A fully rendered code block plus the data it was rendered from.
#[derive(Clone, Debug)]
pub struct RenderedBlock {
    language: String,
    layout: BlockLayout,
    lines: Vec<RenderedLine>,
    html: String,
}

impl RenderedBlock {
    pub(crate) fn assemble(lines: Vec<TokenLine>, layout: BlockLayout, language: &str) -> Self {
        let lines = plan(lines);
        let html = emit(&lines, layout, language);
        Self {
            language: language.to_owned(),
            layout,
            lines,
            html,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn layout(&self) -> BlockLayout {
        self.layout
    }

    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Reassemble the trimmed source: fragment texts in order, one newline
    /// between consecutive lines.
    pub fn source_text(&self) -> String {
        let mut out = String::new();
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            for fragment in &line.fragments {
                out.push_str(&fragment.text);
            }
        }
        out
    }
}

/// Drop placeholder tokens, keeping every surviving fragment in source order.
fn plan(lines: Vec<TokenLine>) -> Vec<RenderedLine> {
    lines
        .into_iter()
        .map(|line| RenderedLine {
            fragments: line
                .tokens
                .into_iter()
                .filter(|token| !token.is_empty)
                .map(|token| StyledFragment {
                    text: token.text,
                    style_key: token.style_key,
                })
                .collect(),
        })
        .collect()
}

fn emit(lines: &[RenderedLine], layout: BlockLayout, language: &str) -> String {
    let lang = language.to_ascii_lowercase();
    let mut html = format!(
        "<pre class=\"syntax-highlight syntax-lang-{lang}\" data-language=\"{language}\">\
         <code class=\"language-{lang} syntax-code\">"
    );

    match layout {
        BlockLayout::Flow => {
            for line in lines {
                for fragment in &line.fragments {
                    push_span(&mut html, fragment);
                }
                html.push('\n');
            }
        }
        BlockLayout::LineBlocks => {
            for line in lines {
                html.push_str("<div class=\"syntax-line\">");
                for fragment in &line.fragments {
                    push_span(&mut html, fragment);
                }
                html.push_str("</div>");
            }
        }
    }

    html.push_str("</code></pre>");
    html
}

fn push_span(html: &mut String, fragment: &StyledFragment) {
    html.push_str("<span class=\"");
    html.push_str(fragment.style_key.as_class());
    html.push_str("\">");
    html.push_str(&html_escape::encode_text(&fragment.text));
    html.push_str("</span>");
}
