use log::debug;

use super::BitbucketClient;
use crate::error::Result;
use crate::providers::bitbucket::types::{LabelList, Page, Repository, RepositoryDetail};

impl BitbucketClient {
    /// Fetch every repository of a project, following `nextPageStart`
    /// until the server stops returning one.
    ///
    /// Repositories are returned in server page order.
    pub async fn list_repositories(&self, project_key: &str) -> Result<Vec<Repository>> {
        let listing_url = self.endpoint(&["projects", project_key, "repos"]);
        let mut repositories = Vec::new();
        let mut start: Option<u64> = None;

        loop {
            let mut url = listing_url.clone();
            if let Some(start) = start {
                url.query_pairs_mut()
                    .append_pair("start", &start.to_string());
            }

            let page: Page<Repository> = self.get_json(&url).await?;
            debug!(
                "Fetched {} repositories of {project_key} (start: {start:?})",
                page.values.len()
            );
            repositories.extend(page.values);

            match page.next_page_start {
                Some(next) => start = Some(next),
                None => break,
            }
        }

        Ok(repositories)
    }

    pub async fn is_archived(&self, project_key: &str, repo_slug: &str) -> Result<bool> {
        let url = self.endpoint(&["projects", project_key, "repos", repo_slug]);
        let detail: RepositoryDetail = self.get_json(&url).await?;
        Ok(detail.archived)
    }

    pub async fn labels(&self, project_key: &str, repo_slug: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&["projects", project_key, "repos", repo_slug, "labels"]);
        let labels: LabelList = self.get_json(&url).await?;
        Ok(labels.values.into_iter().map(|label| label.name).collect())
    }
}
