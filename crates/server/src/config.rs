use config::ConfigError;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub site: SiteSettings,
    pub cms: CmsSettings,
    pub security: SecuritySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub revalidate_secs: u64,
    pub pregenerate_concurrency: usize,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CmsMode {
    Sanity,
    Memory,
}

#[derive(Deserialize, Clone)]
pub struct CmsSettings {
    pub mode: CmsMode,
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    // 写评论需要 token
    pub token: Option<String>,
    pub use_cdn: bool,
    pub timeout_secs: u64,
    // memory 模式的数据文件
    pub fixture: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct SecuritySettings {
    // 未设置时禁用 /api/revalidate
    pub admin_token: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("site.title", "Medium Blog")?
            .set_default("site.revalidate_secs", 60)?
            .set_default("site.pregenerate_concurrency", 8)?
            .set_default("cms.mode", "sanity")?
            .set_default("cms.project_id", "")?
            .set_default("cms.dataset", cms::DEFAULT_DATASET)?
            .set_default("cms.api_version", cms::DEFAULT_API_VERSION)?
            .set_default("cms.use_cdn", true)?
            .set_default("cms.timeout_secs", 10)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(
                config::Environment::with_prefix("BLOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
