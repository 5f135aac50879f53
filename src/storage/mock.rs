use super::{disk_path, StorageService};
use crate::models::{
    AcceptedUpload, FolderCreation, ResourceInfo, ResourceItem, ResourceKind, ResourceList,
};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory disk holding flat folders of files keyed by name.
///
/// Mutations can be made to stay invisible for a number of reads to mimic
/// the real backend's eventual consistency.
#[derive(Clone)]
pub struct MockStorageClient {
    folders: Arc<Mutex<HashMap<String, BTreeMap<String, String>>>>,
    visibility_lag: usize,
    stale_reads: Arc<Mutex<usize>>,
    fail_uploads_after: Option<usize>,
    mutation_count: Arc<Mutex<usize>>,
    upload_count: Arc<Mutex<usize>>,
    describe_count: Arc<Mutex<usize>>,
}

impl MockStorageClient {
    pub fn new() -> Self {
        Self {
            folders: Arc::new(Mutex::new(HashMap::new())),
            visibility_lag: 0,
            stale_reads: Arc::new(Mutex::new(0)),
            fail_uploads_after: None,
            mutation_count: Arc::new(Mutex::new(0)),
            upload_count: Arc::new(Mutex::new(0)),
            describe_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Every mutation stays unobservable for the next `reads` describe calls.
    pub fn with_visibility_lag(mut self, reads: usize) -> Self {
        self.visibility_lag = reads;
        self
    }

    /// Accept `accepted` uploads, then reject every later one.
    pub fn with_failing_uploads_after(mut self, accepted: usize) -> Self {
        self.fail_uploads_after = Some(accepted);
        self
    }

    pub fn with_folder(self, path: &str, files: &[&str]) -> Self {
        self.folders.lock().unwrap().insert(
            disk_path(path),
            files
                .iter()
                .map(|name| (name.to_string(), String::new()))
                .collect(),
        );
        self
    }

    /// Create, upload and delete calls received, successful or not.
    pub fn get_mutation_count(&self) -> usize {
        *self.mutation_count.lock().unwrap()
    }

    pub fn get_upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }

    pub fn get_describe_count(&self) -> usize {
        *self.describe_count.lock().unwrap()
    }

    /// File names in `path` mapped to the URL they were fetched from.
    pub fn get_files(&self, path: &str) -> Option<BTreeMap<String, String>> {
        self.folders.lock().unwrap().get(&disk_path(path)).cloned()
    }

    fn record_mutation(&self) {
        *self.mutation_count.lock().unwrap() += 1;
        *self.stale_reads.lock().unwrap() = self.visibility_lag;
    }
}

impl Default for MockStorageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageService for MockStorageClient {
    async fn create_folder(&self, path: &str) -> Result<FolderCreation> {
        self.record_mutation();

        let mut folders = self.folders.lock().unwrap();
        let key = disk_path(path);
        if folders.contains_key(&key) {
            return Ok(FolderCreation::AlreadyExists);
        }
        folders.insert(key, BTreeMap::new());
        Ok(FolderCreation::Created)
    }

    async fn upload_from_url(
        &self,
        path: &str,
        source_url: &str,
        name: &str,
    ) -> Result<AcceptedUpload> {
        self.record_mutation();

        let accepted = {
            let mut count = self.upload_count.lock().unwrap();
            *count += 1;
            *count
        };
        if self.fail_uploads_after.is_some_and(|limit| accepted > limit) {
            return Err(Error::Transport {
                service: "Yandex Disk",
                status: 503,
                body: "Mock upload failure".to_string(),
            });
        }

        let mut folders = self.folders.lock().unwrap();
        let files = folders
            .get_mut(&disk_path(path))
            .ok_or_else(|| Error::Transport {
                service: "Yandex Disk",
                status: 409,
                body: format!("DiskPathDoesntExistsError: {}", path),
            })?;
        files.insert(name.to_string(), source_url.to_string());

        Ok(AcceptedUpload {
            path: path.to_string(),
            name: name.to_string(),
            source_url: source_url.to_string(),
            operation_href: Some(format!("mock://operations/{}", Uuid::new_v4())),
        })
    }

    async fn describe(&self, path: &str) -> Result<ResourceInfo> {
        *self.describe_count.lock().unwrap() += 1;

        {
            let mut stale = self.stale_reads.lock().unwrap();
            if *stale > 0 {
                *stale -= 1;
                return Err(Error::NotFound(path.to_string()));
            }
        }

        let folders = self.folders.lock().unwrap();
        let files = folders
            .get(&disk_path(path))
            .ok_or_else(|| Error::NotFound(path.to_string()))?;

        let items: Vec<ResourceItem> = files
            .keys()
            .map(|name| ResourceItem {
                kind: ResourceKind::File,
                name: name.clone(),
                path: Some(format!("disk:{}/{}", disk_path(path), name)),
            })
            .collect();
        let name = path.trim_matches('/').rsplit('/').next().unwrap_or_default();

        Ok(ResourceInfo {
            kind: ResourceKind::Dir,
            name: name.to_string(),
            path: Some(format!("disk:{}", disk_path(path))),
            embedded: Some(ResourceList {
                total: Some(items.len() as u64),
                items,
            }),
        })
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.record_mutation();

        match self.folders.lock().unwrap().remove(&disk_path(path)) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(path.to_string())),
        }
    }
}
