//! Cluster endpoint expansion.
//!
//! Tools receive a short cluster name; the full cluster URL is produced from a
//! template configured at startup.

use url::Url;

use crate::config::DEFAULT_ENDPOINT_TEMPLATE;

/// Placeholder replaced by the cluster name.
pub const CLUSTER_PLACEHOLDER: &str = "{cluster}";

/// Validated cluster URL template, e.g. `https://{cluster}.kusto.windows.net`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate(String);

impl EndpointTemplate {
    /// Parse a template string.
    ///
    /// The template must contain `{cluster}` and expand to an http(s) URL.
    /// A trailing slash is dropped so REST paths can be appended directly.
    pub fn parse(template: &str) -> Result<Self, String> {
        let trimmed = template.trim();
        if !trimmed.contains(CLUSTER_PLACEHOLDER) {
            return Err(format!(
                "Endpoint template must contain {CLUSTER_PLACEHOLDER}: '{trimmed}'"
            ));
        }

        let sample = trimmed.replace(CLUSTER_PLACEHOLDER, "cluster");
        let url = Url::parse(&sample).map_err(|e| format!("Invalid endpoint template: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "Endpoint template must use http or https, got '{}'",
                url.scheme()
            ));
        }

        Ok(Self(trimmed.trim_end_matches('/').to_string()))
    }

    /// Expand the template for a cluster name.
    ///
    /// The name is not validated; a malformed name surfaces later as a
    /// connection error.
    pub fn expand(&self, cluster: &str) -> String {
        self.0.replace(CLUSTER_PLACEHOLDER, cluster)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EndpointTemplate {
    fn default() -> Self {
        Self(DEFAULT_ENDPOINT_TEMPLATE.to_string())
    }
}
