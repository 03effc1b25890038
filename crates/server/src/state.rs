use cms::ContentSource;
use pages::{PageCache, Site, SiteGenerator};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ContentSource>,
    pub site: Arc<Site>,
    pub cache: PageCache,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn ContentSource>,
        site: Arc<Site>,
        revalidate: Duration,
        admin_token: Option<String>,
    ) -> Self {
        let generator = Arc::new(SiteGenerator::new(source.clone(), site.clone()));
        Self {
            source,
            site,
            cache: PageCache::new(generator, revalidate),
            admin_token,
        }
    }
}
