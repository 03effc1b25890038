use domain::ImageRef;

use crate::config::SanityConfig;
use crate::error::CmsError;

const IMAGE_CDN: &str = "https://cdn.sanity.io/images";

/// Builds CDN URLs from image asset references such as
/// `image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg`.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AssetRef<'a> {
    id: &'a str,
    width: u32,
    height: u32,
    format: &'a str,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    pub fn from_config(config: &SanityConfig) -> Self {
        Self::new(&config.project_id, &config.dataset)
    }

    pub fn url(&self, image: &ImageRef) -> Result<String, CmsError> {
        self.sized(image, None, None)
    }

    pub fn sized(
        &self,
        image: &ImageRef,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<String, CmsError> {
        let raw = image
            .asset
            .as_ref()
            .map(|a| a.id.as_str())
            .ok_or_else(|| CmsError::InvalidImageRef("missing asset".to_string()))?;
        let asset = parse_asset_ref(raw)?;

        let mut url = format!(
            "{}/{}/{}/{}-{}x{}.{}",
            IMAGE_CDN,
            self.project_id,
            self.dataset,
            asset.id,
            asset.width,
            asset.height,
            asset.format
        );

        let query: Vec<String> = [("w", width), ("h", height)]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| format!("{}={}", k, v)))
            .collect();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        Ok(url)
    }
}

fn parse_asset_ref(raw: &str) -> Result<AssetRef<'_>, CmsError> {
    let invalid = || CmsError::InvalidImageRef(raw.to_string());

    let rest = raw.strip_prefix("image-").ok_or_else(invalid)?;
    let mut parts = rest.rsplitn(3, '-');
    let format = parts.next().ok_or_else(invalid)?;
    let dims = parts.next().ok_or_else(invalid)?;
    let id = parts.next().ok_or_else(invalid)?;

    let (w, h) = dims.split_once('x').ok_or_else(invalid)?;
    let width = w.parse().map_err(|_| invalid())?;
    let height = h.parse().map_err(|_| invalid())?;

    if id.is_empty() || format.is_empty() {
        return Err(invalid());
    }

    Ok(AssetRef {
        id,
        width,
        height,
        format,
    })
}
