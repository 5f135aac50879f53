use super::{disk_path, file_path, StorageService};
use crate::models::{AcceptedUpload, FolderCreation, Link, ResourceInfo, DEFAULT_DISK_BASE_URL};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

const SERVICE: &str = "Yandex Disk";
const DESCRIBE_PAGE_LIMIT: &str = "100";

/// REST client for the Yandex Disk resources API.
pub struct DiskClient {
    client: Client,
    token: String,
    base_url: String,
    trash_purge_delay: Duration,
}

impl DiskClient {
    pub fn new(token: String, trash_purge_delay: Duration) -> Self {
        Self::new_with_client(token, trash_purge_delay, Client::new())
    }

    pub fn new_with_client(token: String, trash_purge_delay: Duration, client: Client) -> Self {
        Self {
            client,
            token,
            base_url: DEFAULT_DISK_BASE_URL.to_string(),
            trash_purge_delay,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("OAuth {}", self.token))
            .header("Accept", "application/json")
    }

    /// Sends the request and returns status plus body, without judging the
    /// status.
    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let response = self.authorized(request).send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", SERVICE, e);
            e
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!("{} responded with status {}: {}", SERVICE, status, body);
        Ok((status, body))
    }

    fn reject(status: StatusCode, body: String) -> Error {
        tracing::error!("{} API error (status {}): {}", SERVICE, status, body);
        Error::Transport {
            service: SERVICE,
            status: status.as_u16(),
            body,
        }
    }

    async fn move_to_trash(&self, path: &str) -> Result<()> {
        info!("Deleting {} from the disk", path);
        let request = self
            .client
            .delete(self.url("resources"))
            .query(&[("path", disk_path(path))]);

        match self.send(request).await? {
            (status, _) if status.is_success() => Ok(()),
            (StatusCode::NOT_FOUND, _) => Err(Error::NotFound(path.to_string())),
            (status, body) => Err(Self::reject(status, body)),
        }
    }

    /// Permanently removes everything in the trash.
    pub async fn purge_trash(&self) -> Result<()> {
        info!("Purging the disk trash");
        let request = self.client.delete(self.url("trash/resources"));

        match self.send(request).await? {
            (status, _) if status.is_success() => Ok(()),
            (status, body) => Err(Self::reject(status, body)),
        }
    }
}

#[async_trait]
impl StorageService for DiskClient {
    async fn create_folder(&self, path: &str) -> Result<FolderCreation> {
        info!("Creating folder {} on the disk", path);
        let request = self
            .client
            .put(self.url("resources"))
            .query(&[("path", disk_path(path))]);

        match self.send(request).await? {
            (status, _) if status.is_success() => Ok(FolderCreation::Created),
            (StatusCode::CONFLICT, body) => {
                info!("Folder {} already exists: {}", path, body);
                Ok(FolderCreation::AlreadyExists)
            }
            (status, body) => Err(Self::reject(status, body)),
        }
    }

    async fn upload_from_url(
        &self,
        path: &str,
        source_url: &str,
        name: &str,
    ) -> Result<AcceptedUpload> {
        info!("Uploading {} from {} into {}", name, source_url, path);
        let destination = file_path(path, name);
        let request = self.client.post(self.url("resources/upload")).query(&[
            ("path", destination.as_str()),
            ("url", source_url),
            ("overwrite", "true"),
        ]);

        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            return Err(Self::reject(status, body));
        }

        let operation_href = serde_json::from_str::<Link>(&body)
            .ok()
            .map(|link| link.href);

        Ok(AcceptedUpload {
            path: path.to_string(),
            name: name.to_string(),
            source_url: source_url.to_string(),
            operation_href,
        })
    }

    async fn describe(&self, path: &str) -> Result<ResourceInfo> {
        info!("Requesting metadata for {}", path);
        let request = self.client.get(self.url("resources")).query(&[
            ("path", disk_path(path).as_str()),
            ("limit", DESCRIBE_PAGE_LIMIT),
        ]);

        match self.send(request).await? {
            (status, body) if status.is_success() => serde_json::from_str(&body).map_err(|e| {
                tracing::error!("Failed to parse {} response: {}\nBody: {}", SERVICE, e, body);
                Error::from(e)
            }),
            (StatusCode::NOT_FOUND, _) => Err(Error::NotFound(path.to_string())),
            (status, body) => Err(Self::reject(status, body)),
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.move_to_trash(path).await?;
        if !self.trash_purge_delay.is_zero() {
            debug!(
                "Waiting {:?} before purging the trash",
                self.trash_purge_delay
            );
            tokio::time::sleep(self.trash_purge_delay).await;
        }
        self.purge_trash().await
    }
}
