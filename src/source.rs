//! Validation and normalization of source text coming from manual entry,
//! local files and web pages.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::docx::TextExtractor;
use crate::error::{QuizError, Result};

pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const MIN_TEXT_CHARS: usize = 10;

lazy_static::lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Txt,
    Docx,
}

/// Text loaded from a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub text: String,
}

/// Manual text is used as typed; it only has to contain something besides
/// whitespace.
pub fn resolve_manual(text: &str) -> Result<&str> {
    if text.trim().is_empty() {
        return Err(QuizError::EmptyInput);
    }
    Ok(text)
}

/// Checks the extension (case-insensitive) and the size limit before any
/// content is read.
pub fn check_file(file_name: &str, size: u64) -> Result<FileKind> {
    let lower = file_name.to_lowercase();
    let kind = if lower.ends_with(".txt") {
        FileKind::Txt
    } else if lower.ends_with(".docx") {
        FileKind::Docx
    } else {
        return Err(QuizError::UnsupportedFileType);
    };

    if size > MAX_FILE_SIZE {
        return Err(QuizError::FileTooLarge);
    }
    Ok(kind)
}

/// Loads `path` as a source. Only the metadata is touched when the file is
/// rejected for its type or size.
pub fn load_file(path: &Path, extractor: &dyn TextExtractor) -> Result<FileUpload> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let size = fs::metadata(path)?.len();
    let kind = check_file(&file_name, size)?;

    let bytes = fs::read(path)?;
    let text = extract(kind, &bytes, extractor)?;
    tracing::info!(%file_name, size, chars = text.chars().count(), "Source file loaded");
    Ok(FileUpload { file_name, text })
}

/// Same as [`load_file`] for content already in memory.
pub fn load_file_bytes(
    file_name: &str,
    bytes: &[u8],
    extractor: &dyn TextExtractor,
) -> Result<FileUpload> {
    let kind = check_file(file_name, bytes.len() as u64)?;
    let text = extract(kind, bytes, extractor)?;
    Ok(FileUpload {
        file_name: file_name.to_string(),
        text,
    })
}

fn extract(kind: FileKind, bytes: &[u8], extractor: &dyn TextExtractor) -> Result<String> {
    let text = match kind {
        FileKind::Txt => String::from_utf8_lossy(bytes).into_owned(),
        FileKind::Docx => collapse_whitespace(&extractor.extract_text(bytes)?),
    };

    if text.chars().count() < MIN_TEXT_CHARS {
        return Err(QuizError::EmptyOrTooShort);
    }
    Ok(text)
}

/// Replaces every whitespace run, newlines included, with one space and trims.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Validates a URL before anything is sent over the network.
pub fn validate_url(url: &str) -> Result<&str> {
    let url = url.trim();
    if url.is_empty() {
        return Err(QuizError::EmptyInput);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(QuizError::InvalidUrl);
    }
    Ok(url)
}

/// Accepts page text returned by the fetch endpoint.
pub fn accept_fetched_text(text: String) -> Result<String> {
    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return Err(QuizError::EmptyOrTooShort);
    }
    Ok(text)
}
