//! 对象存储客户端
//!
//! 图片由客户端直接上传到托管存储桶，服务端负责拼接公开访问地址，以及在删除物品时清理对象。

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::StorageConfig;
use crate::error::{InfraError, Result};

/// 对象存储抽象
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 对象的公开访问地址
    fn public_url(&self, path: &str) -> String;

    /// 批量删除对象
    async fn remove(&self, paths: &[String]) -> Result<()>;
}

#[derive(Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

/// 托管存储的 HTTP 客户端
#[derive(Clone)]
pub struct StorageClient {
    http: Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl StorageClient {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            service_key: config.service_key.clone(),
        })
    }

    fn object_endpoint(&self) -> String {
        format!("{}/storage/v1/object/{}", self.base_url, self.bucket)
    }
}

#[async_trait]
impl ObjectStorage for StorageClient {
    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }

    #[instrument(skip(self), fields(count = paths.len()))]
    async fn remove(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let response = self
            .http
            .delete(self.object_endpoint())
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&RemoveRequest { prefixes: paths })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InfraError::StorageRejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Removed {} objects from bucket {}", paths.len(), self.bucket);
        Ok(())
    }
}
