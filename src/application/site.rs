//! Assembly of rendered page content from the compiled-in catalog.

use std::sync::Arc;

use tracing::info;

use crate::application::error::AppError;
use crate::application::highlight::{BlockLayout, RenderedBlock, SyntectHighlightService};
use crate::domain::docs::{self, DocBlock, DocPage};
use crate::domain::error::DomainError;
use crate::domain::showcase::{self, Showcase};

/// A documentation block with its code already rendered.
#[derive(Debug)]
pub enum RenderedDocBlock {
    Paragraph(&'static str),
    Code(RenderedBlock),
    List(&'static [&'static str]),
}

#[derive(Debug)]
pub struct RenderedDocSection {
    pub id: &'static str,
    pub title: &'static str,
    pub blocks: Vec<RenderedDocBlock>,
}

#[derive(Debug)]
pub struct DocContent {
    pub page: &'static DocPage,
    pub sections: Vec<RenderedDocSection>,
}

pub struct LandingContent {
    pub showcase: &'static Showcase,
    pub snippet: RenderedBlock,
}

#[derive(Clone)]
pub struct SiteService {
    highlight: Arc<SyntectHighlightService>,
}

impl SiteService {
    pub fn new(highlight: Arc<SyntectHighlightService>) -> Self {
        Self { highlight }
    }

    /// Render every compiled-in page once so content errors fail startup and
    /// the style table is complete before the stylesheet is first served.
    pub fn warm(&self) -> Result<(), AppError> {
        self.landing()?;
        for page in docs::all() {
            self.doc(page.slug)?;
        }
        info!(
            target = "vetrina::site",
            pages = docs::all().len(),
            "Compiled-in content rendered"
        );
        Ok(())
    }

    /// The landing page: hero copy plus the showcase snippet rendered with
    /// per-line containers.
    pub fn landing(&self) -> Result<LandingContent, AppError> {
        let showcase = showcase::showcase();
        let snippet = self.highlight.render(
            showcase.snippet.source,
            showcase.snippet.language,
            BlockLayout::LineBlocks,
        )?;
        Ok(LandingContent { showcase, snippet })
    }

    /// A documentation page by slug, code blocks rendered in flow layout.
    pub fn doc(&self, slug: &str) -> Result<DocContent, AppError> {
        let page =
            docs::find_by_slug(slug).ok_or_else(|| DomainError::unknown_document(slug))?;

        let mut sections = Vec::with_capacity(page.sections.len());
        for section in page.sections {
            let mut blocks = Vec::with_capacity(section.blocks.len());
            for block in section.blocks {
                blocks.push(match block {
                    DocBlock::Paragraph(text) => RenderedDocBlock::Paragraph(text),
                    DocBlock::List(items) => RenderedDocBlock::List(items),
                    DocBlock::Code { language, code } => RenderedDocBlock::Code(
                        self.highlight.render(code, language, BlockLayout::Flow)?,
                    ),
                });
            }
            sections.push(RenderedDocSection {
                id: section.id,
                title: section.title,
                blocks,
            });
        }

        Ok(DocContent { page, sections })
    }

    /// Stylesheet for every code block rendered so far.
    pub fn code_stylesheet(&self) -> String {
        self.highlight.stylesheet()
    }
}
