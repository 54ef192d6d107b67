use std::sync::OnceLock;

use url::Url;

use super::navigation::LinkTarget;

/// The landing hero: headline copy, call-to-action buttons, and the
/// terminal-style showcase panel with its snippet.
#[derive(Clone, Debug)]
pub struct Showcase {
    pub title: &'static str,
    pub title_accent: &'static str,
    pub tagline: &'static str,
    pub actions: Vec<ShowcaseAction>,
    pub snippet: Snippet,
}

#[derive(Clone, Debug)]
pub struct ShowcaseAction {
    pub label: &'static str,
    pub href: String,
    pub kind: ActionKind,
    pub target: LinkTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Primary,
    Secondary,
}

impl ActionKind {
    pub fn as_variant(&self) -> &'static str {
        match self {
            ActionKind::Primary => "primary",
            ActionKind::Secondary => "secondary",
        }
    }
}

/// The snippet shown in the showcase panel, named by its tab.
#[derive(Clone, Debug)]
pub struct Snippet {
    pub file_name: &'static str,
    pub language: &'static str,
    pub source: &'static str,
}

impl Showcase {
    pub fn compiled() -> Self {
        Self {
            title: "Your project, ",
            title_accent: "ready to show.",
            tagline: "Vetrina serves your landing page, documentation, and newsletter signup \
                      from one self-contained binary. No runtime, no database, nothing to babysit.",
            actions: vec![
                ShowcaseAction {
                    label: "Get started",
                    href: "/docs/installation".to_string(),
                    kind: ActionKind::Primary,
                    target: LinkTarget::Self_,
                },
                ShowcaseAction {
                    label: "View on GitHub",
                    href: Url::parse("https://github.com/xfyyzy/vetrina")
                        .expect("valid repository url")
                        .to_string(),
                    kind: ActionKind::Secondary,
                    target: LinkTarget::Blank,
                },
            ],
            snippet: Snippet {
                file_name: "vetrina.toml",
                language: "toml",
                source: r#"[server]
host = "0.0.0.0"
port = 8080

[newsletter]
subscribe_url = "https://example.us1.list-manage.com/subscribe/post-json?u=abc&id=def"

[site]
base_url = "https://vetrina.example.com"
"#,
            },
        }
    }
}

static SHOWCASE: OnceLock<Showcase> = OnceLock::new();

pub fn showcase() -> &'static Showcase {
    SHOWCASE.get_or_init(Showcase::compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_showcase_has_a_primary_action_first() {
        let showcase = Showcase::compiled();
        assert_eq!(showcase.actions[0].kind, ActionKind::Primary);
        assert!(showcase.actions.len() >= 2);
    }

    #[test]
    fn snippet_carries_language_and_file_name() {
        let showcase = Showcase::compiled();
        assert_eq!(showcase.snippet.language, "toml");
        assert!(showcase.snippet.file_name.ends_with(".toml"));
    }
}
