use std::sync::OnceLock;

use url::Url;

/// The site navigation tree: ordered sections of links, rendered in the docs
/// sidebar and the footer.
#[derive(Clone, Debug)]
pub struct Navigation {
    sections: Vec<NavSection>,
}

impl Navigation {
    pub fn sections(&self) -> &[NavSection] {
        &self.sections
    }

    /// The compiled-in navigation tree.
    pub fn compiled() -> Self {
        let sections = vec![
            NavSection {
                title: "Introduction".to_string(),
                links: vec![
                    NavLink {
                        label: "Welcome".to_string(),
                        destination: NavDestination::Home,
                    },
                    NavLink {
                        label: "Thank you".to_string(),
                        destination: NavDestination::internal("thank-you"),
                    },
                    NavLink {
                        label: "Licenses".to_string(),
                        destination: NavDestination::internal("licenses"),
                    },
                ],
            },
            NavSection {
                title: "Guides".to_string(),
                links: vec![
                    NavLink {
                        label: "Installation".to_string(),
                        destination: NavDestination::internal("installation"),
                    },
                    NavLink {
                        label: "Configuration".to_string(),
                        destination: NavDestination::internal("configuration"),
                    },
                    NavLink {
                        label: "Deployment".to_string(),
                        destination: NavDestination::internal("deployment"),
                    },
                ],
            },
            NavSection {
                title: "Recipes".to_string(),
                links: vec![
                    NavLink {
                        label: "Writing pages".to_string(),
                        destination: NavDestination::internal("writing-pages"),
                    },
                    NavLink {
                        label: "Newsletter setup".to_string(),
                        destination: NavDestination::internal("newsletter-setup"),
                    },
                ],
            },
            NavSection {
                title: "Support".to_string(),
                links: vec![
                    NavLink {
                        label: "Resources".to_string(),
                        destination: NavDestination::internal("resources"),
                    },
                    NavLink {
                        label: "GitHub".to_string(),
                        destination: NavDestination::External {
                            url: Url::parse("https://github.com/xfyyzy/vetrina")
                                .expect("valid repository url"),
                            target: LinkTarget::Blank,
                        },
                    },
                ],
            },
        ];

        Self { sections }
    }
}

static NAVIGATION: OnceLock<Navigation> = OnceLock::new();

pub fn navigation() -> &'static Navigation {
    NAVIGATION.get_or_init(Navigation::compiled)
}

#[derive(Clone, Debug)]
pub struct NavSection {
    pub title: String,
    pub links: Vec<NavLink>,
}

#[derive(Clone, Debug)]
pub struct NavLink {
    pub label: String,
    pub destination: NavDestination,
}

#[derive(Clone, Debug)]
pub enum NavDestination {
    /// The landing page.
    Home,
    /// A documentation page served under `/docs/{slug}`.
    Doc { slug: String },
    External { url: Url, target: LinkTarget },
}

impl NavDestination {
    fn internal(slug: &str) -> Self {
        Self::Doc {
            slug: slug.to_string(),
        }
    }

    /// The href rendered for this destination.
    pub fn href(&self) -> String {
        match self {
            NavDestination::Home => "/".to_string(),
            NavDestination::Doc { slug } => format!("/docs/{slug}"),
            NavDestination::External { url, .. } => url.to_string(),
        }
    }

    pub fn is_doc(&self, candidate: &str) -> bool {
        matches!(self, NavDestination::Doc { slug } if slug == candidate)
    }
}

#[derive(Clone, Debug)]
pub enum LinkTarget {
    Self_,
    Blank,
}

impl LinkTarget {
    pub fn as_html_target(&self) -> &'static str {
        match self {
            LinkTarget::Self_ => "_self",
            LinkTarget::Blank => "_blank",
        }
    }

    pub fn rel_attribute(&self) -> Option<&'static str> {
        match self {
            LinkTarget::Self_ => None,
            LinkTarget::Blank => Some("noopener noreferrer"),
        }
    }
}
