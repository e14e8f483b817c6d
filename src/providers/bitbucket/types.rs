use serde::Deserialize;

/// One page of a Bitbucket paged collection.
///
/// Only the fields needed to walk the collection are modeled; Bitbucket also
/// sends `size`, `limit` and `isLastPage`, which are ignored. The absence of
/// `nextPageStart` is what ends a listing.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub values: Vec<T>,
    #[serde(rename = "nextPageStart")]
    pub next_page_start: Option<u64>,
}

/// A repository entry from the project listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    /// URL-friendly name, unique within its project
    pub slug: String,
}

/// The subset of the repository detail resource used for probing.
#[derive(Debug, Deserialize)]
pub struct RepositoryDetail {
    /// Missing on servers that predate archiving; treated as not archived
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Labels are served as a paged collection but only the first page is read.
#[derive(Debug, Deserialize)]
pub struct LabelList {
    pub values: Vec<Label>,
}
