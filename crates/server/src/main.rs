mod config;
mod http;
mod state;

use anyhow::Context;
use cms::{ContentSource, ImageUrlBuilder, MemorySource, SanityClient, SanityConfig};
use dotenvy::dotenv;
use pages::Site;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{CmsMode, CmsSettings, Settings};
use crate::http::router::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;

    let (source, images) = build_source(&settings.cms).await?;
    let site = Arc::new(Site::new(settings.site.title.clone(), images));

    let state = AppState::new(
        source,
        site,
        Duration::from_secs(settings.site.revalidate_secs),
        settings.security.admin_token.clone(),
    );

    // 启动时预生成所有文章页，失败则退回按需生成
    match state
        .cache
        .prerender(settings.site.pregenerate_concurrency)
        .await
    {
        Ok(n) => info!("{} page(s) ready", n),
        Err(e) => warn!("Path enumeration failed, pages will be generated on demand: {}", e),
    }

    let app = build_router(state, &settings.server.cors_origins);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn build_source(
    settings: &CmsSettings,
) -> anyhow::Result<(Arc<dyn ContentSource>, ImageUrlBuilder)> {
    let images = ImageUrlBuilder::new(&settings.project_id, &settings.dataset);

    match settings.mode {
        CmsMode::Sanity => {
            if settings.project_id.is_empty() {
                anyhow::bail!("cms.project_id is required in sanity mode (BLOG_CMS__PROJECT_ID)");
            }
            if settings.token.is_none() {
                warn!("No CMS token configured, comment submissions will fail");
            }

            let config = SanityConfig {
                project_id: settings.project_id.clone(),
                dataset: settings.dataset.clone(),
                api_version: settings.api_version.clone(),
                token: settings.token.clone(),
                use_cdn: settings.use_cdn,
                timeout: Duration::from_secs(settings.timeout_secs),
            };
            info!(
                "Using Sanity project {} (dataset {})",
                config.project_id, config.dataset
            );
            let client = SanityClient::new(config).context("Failed to build Sanity client")?;
            let source: Arc<dyn ContentSource> = Arc::new(client);
            Ok((source, images))
        }
        CmsMode::Memory => {
            let source = match &settings.fixture {
                Some(path) => MemorySource::from_fixture(path)
                    .await
                    .with_context(|| format!("Failed to load fixture {}", path))?,
                None => {
                    warn!("Memory mode without fixture, starting with no posts");
                    MemorySource::default()
                }
            };
            let source: Arc<dyn ContentSource> = Arc::new(source);
            Ok((source, images))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
