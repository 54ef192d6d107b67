use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("document `{slug}` not found")]
    UnknownDocument { slug: String },
}

impl DomainError {
    pub fn unknown_document(slug: impl Into<String>) -> Self {
        Self::UnknownDocument { slug: slug.into() }
    }
}
