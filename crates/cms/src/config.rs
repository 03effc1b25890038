use std::time::Duration;

pub const DEFAULT_API_VERSION: &str = "2021-10-21";
pub const DEFAULT_DATASET: &str = "production";

/// Connection settings for one Sanity project/dataset.
#[derive(Debug, Clone)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Needed for mutations (comment creation) and private datasets.
    pub token: Option<String>,
    pub use_cdn: bool,
    pub timeout: Duration,
}

impl SanityConfig {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            use_cdn: true,
            timeout: Duration::from_secs(10),
        }
    }

    fn api_host(&self, cdn: bool) -> String {
        let sub = if cdn { "apicdn" } else { "api" };
        format!("https://{}.{}.sanity.io", self.project_id, sub)
    }

    // 带 token 的请求不能走 CDN
    pub fn query_url(&self) -> String {
        let cdn = self.use_cdn && self.token.is_none();
        format!(
            "{}/v{}/data/query/{}",
            self.api_host(cdn),
            self.api_version,
            self.dataset
        )
    }

    pub fn mutate_url(&self) -> String {
        format!(
            "{}/v{}/data/mutate/{}",
            self.api_host(false),
            self.api_version,
            self.dataset
        )
    }
}
