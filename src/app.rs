//! Application orchestration for copying breed images onto the disk.

use crate::catalog::{CatalogService, DogCatalogClient};
use crate::models::{Config, FolderCreation, UploadReport};
use crate::retry::PollPolicy;
use crate::storage::{DiskClient, StorageService};
use crate::{Error, Result};
use reqwest::Url;
use tracing::{error, info, warn};

/// Coordinates the catalog and the disk for one breed at a time.
pub struct App {
    catalog: Box<dyn CatalogService>,
    storage: Box<dyn StorageService>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub catalog: Box<dyn CatalogService>,
    pub storage: Box<dyn StorageService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices) -> Self {
        Self {
            catalog: services.catalog,
            storage: services.storage,
        }
    }

    /// Construct an app talking to the real services.
    pub fn new(config: &Config) -> Result<Self> {
        // One connection pool shared by both clients.
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let catalog = DogCatalogClient::new_with_client(http_client.clone())
            .with_base_url(config.catalog_base_url.clone());
        let storage = DiskClient::new_with_client(
            config.disk_token.clone(),
            config.trash_purge_delay,
            http_client,
        )
        .with_base_url(config.disk_base_url.clone());

        Ok(Self::with_services(AppServices {
            catalog: Box::new(catalog),
            storage: Box::new(storage),
        }))
    }

    pub fn catalog(&self) -> &dyn CatalogService {
        self.catalog.as_ref()
    }

    pub fn storage(&self) -> &dyn StorageService {
        self.storage.as_ref()
    }

    /// Copies one random image per sub-breed (or one for a bare breed) into
    /// the folder at `path`.
    ///
    /// Uploads run in catalog order and stop at the first failure; files
    /// already accepted are left in place.
    pub async fn upload_breed_images(&self, breed: &str, path: &str) -> Result<UploadReport> {
        if !self.catalog.breed_exists(breed).await? {
            error!("Breed {} is not in the catalog", breed);
            return Err(Error::UnknownBreed(breed.to_string()));
        }

        let urls = self.catalog.all_image_urls(breed).await?;
        info!("[{}] Resolved {} image URL(s)", breed, urls.len());

        match self.storage.create_folder(path).await? {
            FolderCreation::Created => info!("[{}] Created folder {}", breed, path),
            FolderCreation::AlreadyExists => warn!("[{}] Folder {} already exists", breed, path),
        }

        let mut uploads = Vec::with_capacity(urls.len());
        for url in urls {
            let name = file_name_for(&url)?;
            let accepted = self
                .storage
                .upload_from_url(path, &url, &name)
                .await
                .map_err(|e| {
                    error!("[{}] Upload of {} failed: {}", breed, name, e);
                    e
                })?;
            uploads.push(accepted);
        }

        info!(
            "[{}] {} upload(s) accepted into {}",
            breed,
            uploads.len(),
            path
        );
        Ok(UploadReport {
            breed: breed.to_string(),
            path: path.to_string(),
            uploads,
        })
    }

    /// Files a completed run leaves behind: one per sub-breed, at least one.
    pub async fn expected_file_count(&self, breed: &str) -> Result<usize> {
        Ok(self.catalog.list_sub_breeds(breed).await?.len().max(1))
    }

    /// Waits for the folder to appear and then for its contents to match the
    /// breed. `false` means a budget ran out.
    pub async fn verify_upload(
        &self,
        breed: &str,
        path: &str,
        folder_policy: PollPolicy,
        contents_policy: PollPolicy,
    ) -> Result<bool> {
        let expected = self.expected_file_count(breed).await?;
        let folder_name = path.trim_matches('/').rsplit('/').next().unwrap_or(path);

        if !self
            .storage
            .folder_exists(path, folder_name, folder_policy)
            .await
        {
            warn!("[{}] Folder {} never became visible", breed, path);
            return Ok(false);
        }

        let matched = self
            .storage
            .children_match(path, breed, expected, contents_policy)
            .await;
        if !matched {
            warn!(
                "[{}] Folder {} does not hold {} matching file(s)",
                breed, path, expected
            );
        }
        Ok(matched)
    }
}

/// Destination name for an image: its last two path segments joined by `_`.
///
/// Segments are percent-decoded, so the stored name reads like the raw URL.
pub fn file_name_for(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidImageUrl(format!("{}: {}", url, e)))?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [.., parent, file] => Ok(format!(
            "{}_{}",
            decode_segment(url, parent)?,
            decode_segment(url, file)?
        )),
        _ => Err(Error::InvalidImageUrl(format!(
            "{}: needs at least two path segments",
            url
        ))),
    }
}

fn decode_segment(url: &str, segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| Error::InvalidImageUrl(format!("{}: {}", url, e)))
}
