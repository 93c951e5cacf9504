//! Local folder backend.
//!
//! Folder and file ids are plain filesystem paths. Writes go through a
//! temporary file and a rename so a crash never leaves a half written state
//! file behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::RemoteStorage;
use crate::error::StorageError;

pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl RemoteStorage for LocalStorage {
    fn backend_name(&self) -> &str {
        "local"
    }

    async fn find_or_create_folder(&self, name: &str) -> Result<String, StorageError> {
        let folder = self.root.join(name);
        // create_dir_all succeeds when the folder already exists
        async_fs::create_dir_all(&folder).await?;
        Ok(folder.to_string_lossy().into_owned())
    }

    async fn find_file(&self, folder_id: &str, name: &str) -> Result<Option<String>, StorageError> {
        let path = Path::new(folder_id).join(name);
        match async_fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(path.to_string_lossy().into_owned())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError> {
        Ok(async_fs::read(file_id).await?)
    }

    async fn upload_or_update(
        &self,
        folder_id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<(), StorageError> {
        let folder = Path::new(folder_id);
        async_fs::create_dir_all(folder).await?;

        let target = folder.join(name);
        let tmp = folder.join(format!(".{name}.tmp"));
        async_fs::write(&tmp, content).await?;
        async_fs::rename(&tmp, &target).await?;
        Ok(())
    }
}
