//! Consul KV API

use crate::errors::DeployError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Read a raw KV value, `None` when the key does not exist
    pub async fn kv_raw(&self, key: &str) -> Result<Option<String>, DeployError> {
        let mut url = self.endpoint(
            ["v1", "kv"]
                .into_iter()
                .chain(key.trim_matches('/').split('/')),
        );
        url.set_query(Some("raw"));
        self.get_raw(url).await
    }
}
