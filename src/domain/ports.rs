use crate::domain::model::RetrievalRequest;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Output directory operations used by the fetchers. Writes replace
/// existing files.
pub trait Storage: Send + Sync {
    fn path_for(&self, name: &str) -> PathBuf;
    fn write_file(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
    fn rename_into(
        &self,
        from: &Path,
        name: &str,
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
    fn remove_file(&self, path: &Path) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// A data source that can produce the normalized output file for one date.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Retrieves the file for `request.date` and returns the path it was
    /// stored at, which is always `request.output_path()`.
    async fn fetch(&self, request: &RetrievalRequest) -> Result<PathBuf>;
}
