use crate::document::DocumentNode;
use crate::markdown::parse_markdown;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Not a markdown file: {0}")]
    NotMarkdown(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a markdown file and return its content
pub fn read_markdown(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    if !is_markdown(path) {
        return Err(IoError::NotMarkdown(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Read and parse a markdown file
pub fn load_document(path: &Path) -> Result<DocumentNode, IoError> {
    let content = read_markdown(path)?;
    let document = parse_markdown(&content);
    log::debug!(
        "loaded {} with {} top-level nodes ({} total)",
        path.display(),
        document.top_level_count(),
        document.descendant_count()
    );
    Ok(document)
}

/// Write rendered output, creating parent directories as needed
pub fn write_output(path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}
