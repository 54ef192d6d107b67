mod data;

pub use data::DOCS;

#[derive(Clone, Debug)]
pub enum DocBlock {
    Paragraph(&'static str),
    Code {
        language: &'static str,
        code: &'static str,
    },
    List(&'static [&'static str]),
}

#[derive(Clone, Debug)]
pub struct DocSection {
    pub id: &'static str,
    pub title: &'static str,
    pub blocks: &'static [DocBlock],
}

/// A compiled-in documentation page.
#[derive(Clone, Debug)]
pub struct DocPage {
    pub slug: &'static str,
    pub title: &'static str,
    pub lead: &'static str,
    pub sections: &'static [DocSection],
}

pub fn all() -> &'static [DocPage] {
    &DOCS
}

pub fn find_by_slug(slug: &str) -> Option<&'static DocPage> {
    DOCS.iter().find(|page| page.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_page_is_reachable_by_slug() {
        for page in all() {
            let found = find_by_slug(page.slug).expect("page should resolve by its own slug");
            assert_eq!(found.title, page.title);
        }
    }

    #[test]
    fn slugs_are_unique() {
        let mut slugs: Vec<&str> = all().iter().map(|page| page.slug).collect();
        slugs.sort_unstable();
        let before = slugs.len();
        slugs.dedup();
        assert_eq!(before, slugs.len());
    }

    #[test]
    fn unknown_slug_resolves_to_none() {
        assert!(find_by_slug("no-such-page").is_none());
    }
}
