use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::ImagesResult;

pub const DEFAULT_TRANSFORM_URL: &str = "https://js.images.cloudflare.com/transform";
pub const DEFAULT_INFO_URL: &str = "https://js.images.cloudflare.com/info";

/// Endpoints the binding posts to. Missing fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingOpts {
    pub transform_url: String,
    pub info_url: String,
}

impl Default for BindingOpts {
    fn default() -> Self {
        Self {
            transform_url: DEFAULT_TRANSFORM_URL.to_string(),
            info_url: DEFAULT_INFO_URL.to_string(),
        }
    }
}

impl BindingOpts {
    pub fn from_json_file(path: &Path) -> ImagesResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read binding config '{}'", path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let opts: BindingOpts =
            serde_json::from_str(r#"{ "info_url": "http://localhost:8787/info" }"#).unwrap();
        assert_eq!(opts.info_url, "http://localhost:8787/info");
        assert_eq!(opts.transform_url, DEFAULT_TRANSFORM_URL);
    }

    #[test]
    fn empty_config_is_default() {
        let opts: BindingOpts = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, BindingOpts::default());
    }
}
