//! Core admin operations.
//!
//! Thin parameter-to-querystring wrappers over the CoreAdmin handler
//! (<https://wiki.apache.org/solr/CoreAdmin>), sharing the dispatcher and
//! error taxonomy of the main client. Operations offered by Solr are
//! STATUS, CREATE, RELOAD, RENAME, SWAP and UNLOAD; LOAD is not supported
//! by any current Solr version.

use std::time::Duration;

use reqwest::header::HeaderMap;
use url::form_urlencoded;

use crate::client::Dispatcher;
use crate::error::{Result, SolrError};

/// Default per-request timeout, matching the main client.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the core admin handler.
///
/// `url` points at the admin endpoint itself, e.g.
/// `http://localhost:8983/solr/admin/cores`. Responses are returned as the
/// raw body text; the handler answers in XML by default.
#[derive(Debug, Clone)]
pub struct CoreAdmin {
    url: String,
    dispatcher: Dispatcher,
}

impl CoreAdmin {
    /// Create an admin client with the default timeout.
    pub fn new<S: Into<String>>(url: S) -> Self {
        CoreAdmin {
            url: url.into(),
            dispatcher: Dispatcher::new(DEFAULT_TIMEOUT),
        }
    }

    async fn request(&self, params: &[(&str, &str)]) -> Result<String> {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            serializer.append_pair(key, value);
        }
        let url = format!("{}?{}", self.url, serializer.finish());

        self.dispatcher
            .send("get", url, None, HeaderMap::new())
            .await
    }

    /// Report the status of all cores, or of one named core.
    pub async fn status(&self, core: Option<&str>) -> Result<String> {
        let mut params = vec![("action", "STATUS")];
        if let Some(core) = core {
            params.push(("core", core));
        }
        self.request(&params).await
    }

    /// Create a new core.
    ///
    /// `instance_dir` defaults to the core name; `config` and `schema`
    /// default to the stock `solrconfig.xml` and `schema.xml`.
    pub async fn create(
        &self,
        name: &str,
        instance_dir: Option<&str>,
        config: Option<&str>,
        schema: Option<&str>,
    ) -> Result<String> {
        self.request(&[
            ("action", "CREATE"),
            ("name", name),
            ("instanceDir", instance_dir.unwrap_or(name)),
            ("config", config.unwrap_or("solrconfig.xml")),
            ("schema", schema.unwrap_or("schema.xml")),
        ])
        .await
    }

    /// Reload a core, picking up configuration changes.
    pub async fn reload(&self, core: &str) -> Result<String> {
        self.request(&[("action", "RELOAD"), ("core", core)]).await
    }

    /// Rename a core.
    pub async fn rename(&self, core: &str, other: &str) -> Result<String> {
        self.request(&[("action", "RENAME"), ("core", core), ("other", other)])
            .await
    }

    /// Swap two cores atomically.
    pub async fn swap(&self, core: &str, other: &str) -> Result<String> {
        self.request(&[("action", "SWAP"), ("core", core), ("other", other)])
            .await
    }

    /// Unload a core.
    pub async fn unload(&self, core: &str) -> Result<String> {
        self.request(&[("action", "UNLOAD"), ("core", core)]).await
    }

    /// Load a core. Unsupported by every current Solr version.
    pub async fn load(&self, _core: &str) -> Result<String> {
        Err(SolrError::not_implemented(
            "Solr 1.4 and below do not support this operation.",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_is_not_implemented() {
        let admin = CoreAdmin::new("http://localhost:8983/solr/admin/cores");
        let err = tokio_test::block_on(admin.load("core0")).unwrap_err();
        assert!(matches!(err, SolrError::NotImplemented(_)));
    }

    #[test]
    fn test_bad_admin_url_is_classified() {
        let admin = CoreAdmin::new("admin/cores");
        let err = tokio_test::block_on(admin.status(None)).unwrap_err();
        assert!(matches!(err, SolrError::InvalidUrl { .. }));
    }
}
