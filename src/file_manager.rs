use axum::{
    body::Body,
    extract::{DefaultBodyLimit, FromRef, Multipart, Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::{cookie::Key, SignedCookieJar};
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::Config,
    error::AppError,
    flash,
    uploads::{display_name, validate_upload_name, FileEntry, FileStore, MAX_UPLOAD_BYTES},
    views,
};

#[derive(Clone)]
pub struct FileManagerState {
    pub store: FileStore,
    pub key: Key,
}

impl FileManagerState {
    pub fn new(config: &Config) -> Self {
        Self {
            store: FileStore::new(&config.upload_folder),
            key: config.signing_key(),
        }
    }
}

impl FromRef<FileManagerState> for Key {
    fn from_ref(state: &FileManagerState) -> Self {
        state.key.clone()
    }
}

pub fn router(state: FileManagerState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", get(upload_form).post(upload_file))
        .route("/files", get(list_files))
        .route("/download/:filename", get(download_file))
        .route("/delete/:filename", get(delete_file))
        .route("/api/files", get(list_files_json))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn index(State(state): State<FileManagerState>, jar: SignedCookieJar) -> Response {
    let (jar, flash) = flash::take(jar);
    match state.store.list().await {
        Ok(files) => (jar, views::file_index(flash.as_ref(), &files)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn upload_form(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flash) = flash::take(jar);
    (jar, views::upload_form(flash.as_ref()))
}

pub async fn upload_file(
    State(state): State<FileManagerState>,
    jar: SignedCookieJar,
    mut multipart: Multipart,
) -> Response {
    match receive_upload(&state.store, &mut multipart).await {
        Ok(stored) => {
            let message = format!("File {} uploaded successfully", display_name(&stored));
            (flash::success(jar, message), Redirect::to("/files")).into_response()
        }
        Err(err) => err.recover(jar, "/upload"),
    }
}

/// Saves the first `file` part. The name is checked before the body is read
/// so a rejected upload never touches the disk.
async fn receive_upload(store: &FileStore, multipart: &mut Multipart) -> Result<String, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        validate_upload_name(&filename)?;

        let data = field.bytes().await?;
        return store.save(&filename, &data).await;
    }

    Err(AppError::NoFileSelected)
}

pub async fn list_files(State(state): State<FileManagerState>, jar: SignedCookieJar) -> Response {
    let (jar, flash) = flash::take(jar);
    match state.store.list().await {
        Ok(files) => (jar, views::file_list(flash.as_ref(), &files)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn download_file(
    State(state): State<FileManagerState>,
    jar: SignedCookieJar,
    Path(filename): Path<String>,
) -> Response {
    let file = match state.store.open(&filename).await {
        Ok(file) => file,
        Err(err) => return err.recover(jar, "/files"),
    };

    let mime_type = mime_guess::from_path(&filename).first_or_octet_stream();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        display_name(&filename).replace('"', "")
    );

    (
        [
            (header::CONTENT_TYPE, mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response()
}

pub async fn delete_file(
    State(state): State<FileManagerState>,
    jar: SignedCookieJar,
    Path(filename): Path<String>,
) -> Response {
    match state.store.delete(&filename).await {
        Ok(()) => {
            let message = format!("File {} deleted successfully", display_name(&filename));
            (flash::success(jar, message), Redirect::to("/files")).into_response()
        }
        Err(err) => err.recover(jar, "/files"),
    }
}

pub async fn list_files_json(
    State(state): State<FileManagerState>,
) -> Result<Json<Vec<FileEntry>>, AppError> {
    let files = state.store.list().await?;
    info!(count = files.len(), "Listed files");
    Ok(Json(files.iter().map(|file| file.entry()).collect()))
}
