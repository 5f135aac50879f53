//! Yandex Disk folder storage
//!
//! Folder lifecycle, server-side uploads from remote URLs, and polling
//! checks that bridge the backend's eventual consistency.

pub mod client;
pub mod mock;

pub use client::DiskClient;
pub use mock::MockStorageClient;

use crate::models::{AcceptedUpload, FolderCreation, ResourceInfo, ResourceKind};
use crate::retry::{poll_until, PollPolicy};
use crate::{Error, Result};
use async_trait::async_trait;
use tracing::{info, warn};

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn create_folder(&self, path: &str) -> Result<FolderCreation>;

    /// Asks the backend to fetch `source_url` into `path/name`, overwriting.
    ///
    /// Success means the fetch was accepted, not that the file exists yet.
    async fn upload_from_url(&self, path: &str, source_url: &str, name: &str)
        -> Result<AcceptedUpload>;

    /// Metadata for `path`, with immediate children for folders.
    async fn describe(&self, path: &str) -> Result<ResourceInfo>;

    /// Moves `path` to the trash and purges the trash once the backend's
    /// permanent delete delay has passed.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Deletes `path` if present; an absent path is already clean.
    async fn reset_folder(&self, path: &str) -> Result<()> {
        match self.delete(path).await {
            Err(Error::NotFound(_)) => {
                info!("Nothing to clean up at {}", path);
                Ok(())
            }
            other => other,
        }
    }

    /// Whether `path` becomes visible as a folder named `expected_name`.
    async fn folder_exists(&self, path: &str, expected_name: &str, policy: PollPolicy) -> bool {
        info!("Checking that folder {} exists", path);
        poll_until(policy, "folder_exists", || async move {
            let info = self.describe(path).await?;
            Ok::<_, Error>(info.kind == ResourceKind::Dir && info.name == expected_name)
        })
        .await
    }

    /// Whether `path` holds exactly `expected_count` files, all named with
    /// the `breed` prefix.
    async fn children_match(
        &self,
        path: &str,
        breed: &str,
        expected_count: usize,
        policy: PollPolicy,
    ) -> bool {
        info!(
            "Checking that {} holds {} file(s) of breed {}",
            path, expected_count, breed
        );
        poll_until(policy, "children_match", || async move {
            let info = self.describe(path).await?;
            let Some(children) = info.children() else {
                warn!("Listing for {} has no embedded items", path);
                return Ok(false);
            };
            if children.len() != expected_count {
                warn!(
                    "{} holds {} item(s), expected {}",
                    path,
                    children.len(),
                    expected_count
                );
                return Ok(false);
            }
            Ok::<_, Error>(children
                .iter()
                .all(|child| child.kind == ResourceKind::File && child.name.starts_with(breed)))
        })
        .await
    }
}

/// Disk paths are addressed from the root.
pub(crate) fn disk_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

pub(crate) fn file_path(folder: &str, name: &str) -> String {
    format!("{}/{}", disk_path(folder).trim_end_matches('/'), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_path_normalisation() {
        assert_eq!(disk_path("test_folder"), "/test_folder");
        assert_eq!(disk_path("/test_folder"), "/test_folder");
        assert_eq!(file_path("test_folder", "akita_1.jpg"), "/test_folder/akita_1.jpg");
        assert_eq!(file_path("/a/b/", "c.jpg"), "/a/b/c.jpg");
    }
}
