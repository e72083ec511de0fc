//! Uploaded files on local disk.
//!
//! Submission files live under `submissions/{assignment_id}/` and profile
//! pictures under `uploads/`, both relative to the configured root. Paths
//! handed back to callers are always relative so the root can move.

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::{
    io::{self, ErrorKind},
    path::{Component, Path, PathBuf},
};
use uuid::Uuid;

/// A file received from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Extension with the leading dot, or an empty string
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub const SUBMISSIONS_DIR: &'static str = "submissions";
    pub const UPLOADS_DIR: &'static str = "uploads";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a submission as `{student}_{assignment}_{yyyyMMddHHmmss}{ext}`
    pub async fn save_submission(
        &self,
        assignment_id: Uuid,
        student_id: &str,
        file: &UploadedFile,
        at: DateTime<Utc>,
    ) -> io::Result<String> {
        let file_name = format!(
            "{}_{}_{}{}",
            sanitize(student_id),
            assignment_id,
            at.format("%Y%m%d%H%M%S"),
            file.extension()
        );
        let relative = format!("{}/{}/{}", Self::SUBMISSIONS_DIR, assignment_id, file_name);

        self.write(&relative, &file.bytes).await?;
        info!("Stored submission file {relative}");
        Ok(relative)
    }

    /// Writes a profile picture as `{user}_{timestamp}{ext}` and returns the bare file name
    pub async fn save_profile_picture(
        &self,
        user_id: &str,
        extension: &str,
        bytes: &[u8],
        at: DateTime<Utc>,
    ) -> io::Result<String> {
        let file_name = format!(
            "{}_{}{}",
            sanitize(user_id),
            at.format("%Y%m%d%H%M%S%3f"),
            extension
        );
        self.write(&Self::picture_path(&file_name), bytes).await?;
        Ok(file_name)
    }

    pub fn picture_path(file_name: &str) -> String {
        format!("{}/{}", Self::UPLOADS_DIR, file_name)
    }

    pub async fn read(&self, relative: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.resolve(relative)?).await
    }

    pub async fn remove(&self, relative: &str) -> io::Result<()> {
        tokio::fs::remove_file(self.resolve(relative)?).await
    }

    /// Removes a file, logging instead of failing. Missing files are fine.
    pub async fn remove_quietly(&self, relative: &str) {
        match self.remove(relative).await {
            Ok(()) => info!("Removed {relative}"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!("Could not remove {relative}: {err}"),
        }
    }

    /// Drops every stored submission file of an assignment
    pub async fn remove_assignment_dir(&self, assignment_id: Uuid) {
        let dir = self
            .root
            .join(Self::SUBMISSIONS_DIR)
            .join(assignment_id.to_string());

        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => info!("Removed {}", dir.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!("Could not remove {}: {err}", dir.display()),
        }
    }

    async fn write(&self, relative: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await
    }

    /// Joins a stored relative path onto the root, refusing anything that could escape it
    fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let path = Path::new(relative);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if escapes || relative.is_empty() {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid stored path {relative:?}"),
            ));
        }
        Ok(self.root.join(path))
    }
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn file(name: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: None,
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_submission_file_naming() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let assignment_id = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2026, 1, 12, 8, 30, 5).unwrap();

        let relative = store
            .save_submission(assignment_id, "student-1", &file("Essay.PDF", b"hello"), at)
            .await
            .unwrap();

        assert_eq!(
            relative,
            format!("submissions/{assignment_id}/student-1_{assignment_id}_20260112083005.pdf")
        );
        assert_eq!(store.read(&relative).await.unwrap(), b"hello");

        store.remove_assignment_dir(assignment_id).await;
        assert!(store.read(&relative).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let err = store.read("../secret.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(store.read("/etc/passwd").await.is_err());
    }

    #[tokio::test]
    async fn test_remove_quietly_ignores_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.remove_quietly("uploads/missing.png").await;

        let name = store
            .save_profile_picture("auth0|42", ".png", b"png", Utc::now())
            .await
            .unwrap();
        assert!(name.starts_with("auth0-42_"));
        assert!(name.ends_with(".png"));

        let path = FileStore::picture_path(&name);
        store.remove_quietly(&path).await;
        assert!(store.read(&path).await.is_err());
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(file("a.TXT", b"").extension(), ".txt");
        assert_eq!(file("noext", b"").extension(), "");
    }
}
