//! Storage backends for the durable sync state.
//!
//! - [`DriveStorage`]: Google Drive v3, files inside a named folder
//! - [`LocalStorage`]: a directory on disk, used when Drive is not configured
//!
//! [`crate::management::StateStore`] holds one of these and layers the
//! local backup fallback on top.

pub mod drive;
pub mod local;

use async_trait::async_trait;

use crate::error::StorageError;

pub use drive::DriveStorage;
pub use local::LocalStorage;

#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Human-readable backend name (e.g. "google-drive", "local").
    fn backend_name(&self) -> &str;

    /// Looks up a folder by name and creates it when absent.
    ///
    /// A folder created concurrently by someone else counts as found.
    async fn find_or_create_folder(&self, name: &str) -> Result<String, StorageError>;

    async fn find_file(&self, folder_id: &str, name: &str) -> Result<Option<String>, StorageError>;

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError>;

    /// Replaces the content of `name` in the folder, creating it if needed.
    /// Never leaves two files with the same name behind.
    async fn upload_or_update(
        &self,
        folder_id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: RemoteStorage + ?Sized> RemoteStorage for Box<T> {
    fn backend_name(&self) -> &str {
        (**self).backend_name()
    }

    async fn find_or_create_folder(&self, name: &str) -> Result<String, StorageError> {
        (**self).find_or_create_folder(name).await
    }

    async fn find_file(&self, folder_id: &str, name: &str) -> Result<Option<String>, StorageError> {
        (**self).find_file(folder_id, name).await
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError> {
        (**self).download(file_id).await
    }

    async fn upload_or_update(
        &self,
        folder_id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<(), StorageError> {
        (**self).upload_or_update(folder_id, name, content).await
    }
}
