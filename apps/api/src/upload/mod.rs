//! Resume file upload: turns an uploaded file into editable text.

pub mod handlers;

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type: {0}. Upload a .pdf, .txt, .md or .html file")]
    Unsupported(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("File is not valid UTF-8 text")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("No text could be extracted from the file")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Pdf,
    Text,
}

fn file_kind(file_name: &str) -> Result<FileKind, UploadError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(FileKind::Pdf),
        "txt" | "md" | "html" | "htm" => Ok(FileKind::Text),
        "" => Err(UploadError::Unsupported("(no extension)".to_string())),
        other => Err(UploadError::Unsupported(format!(".{other}"))),
    }
}

/// Runs [`extract_upload_text`] on the blocking pool.
///
/// pdf-extract panics on some malformed PDFs (a page without `/MediaBox`);
/// the panic stays in the blocking task and comes back as a PDF error.
pub async fn read_upload(file_name: String, bytes: Vec<u8>) -> Result<String, UploadError> {
    tokio::task::spawn_blocking(move || extract_upload_text(&file_name, bytes))
        .await
        .map_err(|e| {
            if e.is_panic() {
                UploadError::Pdf("the PDF parser could not handle this file".to_string())
            } else {
                UploadError::Pdf(format!("extraction task failed: {e}"))
            }
        })?
}

/// Extracts the text content of an uploaded file, dispatching on its extension.
pub fn extract_upload_text(file_name: &str, bytes: Vec<u8>) -> Result<String, UploadError> {
    let text = match file_kind(file_name)? {
        FileKind::Pdf => pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| UploadError::Pdf(e.to_string()))?,
        FileKind::Text => String::from_utf8(bytes)?,
    };

    let text = text.trim_start_matches('\u{feff}').trim().to_string();
    if text.is_empty() {
        return Err(UploadError::Empty);
    }
    Ok(text)
}
