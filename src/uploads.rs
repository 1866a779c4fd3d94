//! Flat-directory file storage.
//!
//! Every stored file is named `YYYYMMDD_HHMMSS_<sanitized original name>`.
//! The timestamp prefix keeps same-named uploads apart and is stripped again
//! for display. There is no index: sizes and creation times come straight
//! from filesystem metadata on every listing.

use std::{
    path::{Component, Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use tokio::fs;
use tracing::info;
use unicode_normalization::UnicodeNormalization;

use crate::error::AppError;

pub const ALLOWED_EXTENSIONS: [&str; 16] = [
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "mp3",
    "mp4", "zip", "rar",
];

/// Upper bound on a whole upload request body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lower-cased text after the last `.`, if there is a dot at all.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn allowed_file(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Checks an incoming upload name before any bytes are read.
pub fn validate_upload_name(filename: &str) -> Result<(), AppError> {
    if filename.is_empty() {
        return Err(AppError::NoFileSelected);
    }
    if !allowed_file(filename) {
        return Err(AppError::FileTypeNotAllowed);
    }
    Ok(())
}

/// Reduces a client-supplied name to ASCII letters, digits, `_`, `.` and `-`.
///
/// Accented letters are decomposed first so `é` keeps its base `e`. Path
/// separators become word breaks, whitespace runs collapse to `_`, and leading
/// or trailing dots and underscores are dropped, so `../../etc/passwd` comes
/// out as `etc_passwd`.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

pub fn stamped_name(at: NaiveDateTime, safe_name: &str) -> String {
    format!("{}_{}", at.format(STAMP_FORMAT), safe_name)
}

/// Drops the first two `_`-separated segments (the date and the time).
pub fn display_name(stored_name: &str) -> &str {
    stored_name.splitn(3, '_').nth(2).unwrap_or(stored_name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub display_name: String,
    pub size: u64,
    pub created: DateTime<Local>,
}

/// Raw listing entry served by the JSON endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub created: String,
}

impl StoredFile {
    pub fn entry(&self) -> FileEntry {
        FileEntry {
            name: self.name.clone(),
            size: self.size,
            created: self.created.format(CREATED_FORMAT).to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Validates, sanitises, and stamps `original_name`, then writes `data`.
    /// Returns the stored name.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, AppError> {
        validate_upload_name(original_name)?;

        // Sanitising can eat the dot in front of the extension (`..txt`).
        let safe = secure_filename(original_name);
        if !allowed_file(&safe) {
            return Err(AppError::FileTypeNotAllowed);
        }

        let stored = stamped_name(Local::now().naive_local(), &safe);
        fs::write(self.root.join(&stored), data).await?;

        info!(stored = %stored, bytes = data.len(), "File saved");
        Ok(stored)
    }

    /// Regular files only, newest first.
    pub async fn list(&self) -> Result<Vec<StoredFile>, AppError> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let created: SystemTime = metadata.created().or_else(|_| metadata.modified())?;

            files.push(StoredFile {
                display_name: display_name(&name).to_string(),
                name,
                size: metadata.len(),
                created: DateTime::<Local>::from(created),
            });
        }

        files.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(files)
    }

    pub async fn open(&self, name: &str) -> Result<fs::File, AppError> {
        let path = self.existing_file(name).await?;
        Ok(fs::File::open(path).await?)
    }

    pub async fn delete(&self, name: &str) -> Result<(), AppError> {
        let path = self.existing_file(name).await?;
        fs::remove_file(path).await?;

        info!(name, "File deleted");
        Ok(())
    }

    async fn existing_file(&self, name: &str) -> Result<PathBuf, AppError> {
        let path = self.resolve(name).ok_or(AppError::NotFound)?;
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(path),
            Ok(_) => Err(AppError::NotFound),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    /// Maps a request name onto the upload directory. Anything that is not a
    /// single plain path component is refused.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.contains('\\') {
            return None;
        }

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => Some(self.root.join(part)),
            _ => None,
        }
    }
}

pub fn total_size(files: &[StoredFile]) -> u64 {
    files.iter().map(|file| file.size).sum()
}
