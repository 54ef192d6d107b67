use crate::application::error::ErrorTrace;
use crate::application::newsletter::StatusView;
use crate::application::site::{DocContent, LandingContent, RenderedDocBlock};
use crate::domain::navigation::LinkTarget;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) origin: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(origin: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            origin,
            public_message,
            error,
        }
    }
}

impl IntoResponse for TemplateRenderError {
    fn into_response(self) -> Response {
        let trace = ErrorTrace::of(self.origin, &self.error);
        let mut response =
            (StatusCode::INTERNAL_SERVER_ERROR, self.public_message).into_response();
        trace.attach(&mut response);
        response
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, TemplateRenderError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorTrace::message(
        "presentation::views::render_not_found_response",
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct NavigationView {
    pub sections: Vec<NavigationSectionView>,
}

#[derive(Clone)]
pub struct NavigationSectionView {
    pub title: String,
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub target: Option<String>,
    pub rel: Option<String>,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self {
            meta: self.meta.with_canonical(canonical),
            ..self
        }
    }

    pub fn with_meta(self, meta: PageMetaView) -> Self {
        Self { meta, ..self }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct ActionButtonView {
    pub label: String,
    pub href: String,
    pub variant: &'static str,
    pub target: Option<String>,
    pub rel: Option<String>,
}

pub struct LandingContext {
    pub hero_title: String,
    pub hero_title_accent: String,
    pub tagline: String,
    pub actions: Vec<ActionButtonView>,
    pub snippet_file_name: String,
    pub snippet_html: String,
}

impl LandingContext {
    pub fn from_content(content: &LandingContent) -> Self {
        let showcase = content.showcase;
        let actions = showcase
            .actions
            .iter()
            .map(|action| {
                let (target, rel) = match action.target {
                    LinkTarget::Blank => (
                        Some(action.target.as_html_target().to_string()),
                        action.target.rel_attribute().map(str::to_string),
                    ),
                    LinkTarget::Self_ => (None, None),
                };
                ActionButtonView {
                    label: action.label.to_string(),
                    href: action.href.clone(),
                    variant: action.kind.as_variant(),
                    target,
                    rel,
                }
            })
            .collect();

        Self {
            hero_title: showcase.title.to_string(),
            hero_title_accent: showcase.title_accent.to_string(),
            tagline: showcase.tagline.to_string(),
            actions,
            snippet_file_name: showcase.snippet.file_name.to_string(),
            snippet_html: content.snippet.html().to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<LandingContext>,
}

pub enum DocBlockView {
    Paragraph(String),
    Code(String),
    List(Vec<String>),
}

pub struct DocSectionView {
    pub id: String,
    pub title: String,
    pub blocks: Vec<DocBlockView>,
}

pub struct DocPageContext {
    pub title: String,
    pub lead: String,
    pub sections: Vec<DocSectionView>,
}

impl DocPageContext {
    pub fn from_content(content: &DocContent) -> Self {
        let sections = content
            .sections
            .iter()
            .map(|section| DocSectionView {
                id: section.id.to_string(),
                title: section.title.to_string(),
                blocks: section
                    .blocks
                    .iter()
                    .map(|block| match block {
                        RenderedDocBlock::Paragraph(text) => {
                            DocBlockView::Paragraph((*text).to_string())
                        }
                        RenderedDocBlock::Code(rendered) => {
                            DocBlockView::Code(rendered.html().to_string())
                        }
                        RenderedDocBlock::List(items) => DocBlockView::List(
                            items.iter().map(|item| (*item).to_string()).collect(),
                        ),
                    })
                    .collect(),
            })
            .collect();

        Self {
            title: content.page.title.to_string(),
            lead: content.page.lead.to_string(),
            sections,
        }
    }
}

#[derive(Template)]
#[template(path = "docs_page.html")]
pub struct DocPageTemplate {
    pub view: LayoutContext<DocPageContext>,
}

/// What the newsletter status region shows. Local errors are plain text;
/// remote payloads are markup from the list service, scrubbed here whenever
/// the deployment does not extend trust to that service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NewsletterStatusView {
    Idle,
    Sending,
    LocalError(String),
    RemoteError(String),
    Confirmed(String),
}

impl NewsletterStatusView {
    pub fn from_status(status: &StatusView, trust_remote_markup: bool) -> Self {
        match status {
            StatusView::Idle => Self::Idle,
            StatusView::Sending => Self::Sending,
            StatusView::LocalError { text } => Self::LocalError(text.clone()),
            StatusView::RemoteError { markup } => {
                Self::RemoteError(prepare_markup(markup.as_deref(), trust_remote_markup))
            }
            StatusView::Confirmed { markup } => {
                Self::Confirmed(prepare_markup(markup.as_deref(), trust_remote_markup))
            }
        }
    }
}

fn prepare_markup(markup: Option<&str>, trust_remote_markup: bool) -> String {
    let markup = markup.unwrap_or_default();
    if trust_remote_markup {
        markup.to_string()
    } else {
        ammonia::clean(markup)
    }
}

#[derive(Template)]
#[template(path = "partials/newsletter_status.html")]
pub struct NewsletterStatusPartial {
    pub status: NewsletterStatusView,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "Nothing lives at this address. The link may be stale, or the page moved."
                .to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub og_title: String,
    pub og_description: String,
    pub canonical: String,
}

impl PageMetaView {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self { canonical, ..self }
    }

    pub fn with_content(self, title: String, description: String) -> Self {
        Self {
            og_title: title.clone(),
            og_description: description.clone(),
            title,
            description,
            ..self
        }
    }
}
