use crate::config::SiteSettings;
use crate::domain::navigation::{self, NavDestination, NavLink};
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, NavigationLinkView, NavigationSectionView, NavigationView,
    PageMetaView,
};

const BRAND_TITLE: &str = "Vetrina";
const FOOTER_COPY: &str = "Vetrina is built in the open and ships under the BSD-2-Clause license.";
const META_TITLE: &str = "Vetrina";
const META_DESCRIPTION: &str =
    "Self-hosted landing pages, documentation, and newsletter signup from a single binary.";

/// Which navigation entry the current request corresponds to.
#[derive(Clone, Copy, Debug)]
pub enum ActivePage<'a> {
    Landing,
    Doc(&'a str),
    None,
}

#[derive(Clone)]
pub struct ChromeService {
    site: SiteSettings,
}

impl ChromeService {
    pub fn new(site: SiteSettings) -> Self {
        Self { site }
    }

    /// Assemble the layout chrome from the compiled-in navigation tree.
    pub fn load(&self, active: ActivePage<'_>) -> LayoutChrome {
        let tree = navigation::navigation();
        let sections = tree
            .sections()
            .iter()
            .map(|section| NavigationSectionView {
                title: section.title.clone(),
                entries: section
                    .links
                    .iter()
                    .map(|link| map_navigation_link(link, active))
                    .collect(),
            })
            .collect();

        LayoutChrome {
            brand: BrandView {
                title: BRAND_TITLE.to_string(),
                href: "/".to_string(),
            },
            navigation: NavigationView { sections },
            footer: FooterView {
                copy: FOOTER_COPY.to_string(),
            },
            meta: PageMetaView {
                title: META_TITLE.to_string(),
                description: META_DESCRIPTION.to_string(),
                og_title: META_TITLE.to_string(),
                og_description: META_DESCRIPTION.to_string(),
                canonical: String::new(),
            },
        }
    }

    /// Absolute canonical URL for a site path, when a base URL is configured.
    pub fn canonical_for(&self, path: &str) -> Option<String> {
        self.site
            .base_url
            .as_ref()
            .and_then(|base| base.join(path).ok())
            .map(|url| url.to_string())
    }
}

fn map_navigation_link(link: &NavLink, active: ActivePage<'_>) -> NavigationLinkView {
    let is_active = match active {
        ActivePage::Landing => matches!(link.destination, NavDestination::Home),
        ActivePage::Doc(current) => link.destination.is_doc(current),
        ActivePage::None => false,
    };

    let (target, rel) = match &link.destination {
        NavDestination::External { target, .. } => (
            Some(target.as_html_target().to_string()),
            target.rel_attribute().map(str::to_string),
        ),
        _ => (None, None),
    };

    NavigationLinkView {
        label: link.label.clone(),
        href: link.destination.href(),
        target,
        rel,
        is_active,
    }
}
