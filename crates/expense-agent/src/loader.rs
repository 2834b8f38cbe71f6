//! Loading the expenses data.

use std::path::Path;

use tokio::fs;

use crate::Error;

/// Reads the whole expenses file as text and appends a newline.
///
/// The content is passed on verbatim, it's not parsed or validated. A
/// missing, unreadable or non UTF-8 file is a [`Error::FileAccess`].
pub async fn load_expenses(path: &Path) -> Result<String, Error> {
    let mut data = fs::read_to_string(path).await.map_err(|source| {
        Error::FileAccess {
            path: path.to_owned(),
            source,
        }
    })?;
    data.push('\n');
    debug!("loaded {} bytes of expenses from {}", data.len(), path.display());
    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::NamedTempFile;

    use super::*;

    #[tokio::test]
    async fn test_load_appends_newline() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Taxi: $20\nHotel: $100").unwrap();
        let data = load_expenses(file.path()).await.unwrap();
        assert_eq!(data, "Taxi: $20\nHotel: $100\n");
    }

    #[tokio::test]
    async fn test_load_keeps_existing_newline() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Taxi: $20\n").unwrap();
        let data = load_expenses(file.path()).await.unwrap();
        assert_eq!(data, "Taxi: $20\n\n");
    }

    #[tokio::test]
    async fn test_load_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert_eq!(load_expenses(file.path()).await.unwrap(), "\n");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        let err = load_expenses(&path).await.unwrap_err();
        let Error::FileAccess { path: err_path, source } = err else {
            panic!("expected a file access error, got {err:?}");
        };
        assert_eq!(err_path, path);
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_load_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x66, 0x6f, 0xff, 0xfe]).unwrap();
        let err = load_expenses(file.path()).await.unwrap_err();
        assert!(matches!(err, Error::FileAccess { .. }));
    }
}
