//! CSV loading with fallbacks for sloppy exports.

use crate::error::{AnalysisError, Result};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// No inference: every column is read as `String` and typed by the cleaner.
const INFER_SCHEMA_ROWS: usize = 0;

/// Load a header-ful CSV file into a DataFrame.
///
/// Tries, in order: a standard read with `"` as the quote character, a read
/// with default parse options, and finally a read of the pre-cleaned text
/// (blank lines removed).
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AnalysisError::FileNotFound(path.display().to_string()));
    }

    info!("Loading dataset from: {}", path.display());

    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Loading with default parse options failed: {}", e),
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        error!("Could not read file: {}", e);
        AnalysisError::Io(e)
    })?;
    load_csv_from_str(&clean_csv_content(&content))
}

/// Load CSV text that is already in memory.
pub fn load_csv_from_str(content: &str) -> Result<DataFrame> {
    let cursor = Cursor::new(content.as_bytes().to_vec());
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .into_reader_with_file_handle(cursor)
        .finish()?;
    Ok(df)
}

fn clean_csv_content(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_str() {
        let df = load_csv_from_str("Year Number,Value\n2020,1.5\n2021,2.5\n").unwrap();
        assert_eq!(df.shape(), (2, 2));
    }

    #[test]
    fn test_late_bad_cells_load_as_text() {
        let mut content = String::from("Year Number,Value\n");
        for _ in 0..1500 {
            content.push_str("2020,1\n");
        }
        content.push_str("Total,5\n2021,2.5\n");

        let df = load_csv_from_str(&content).unwrap();
        assert_eq!(df.height(), 1502);
        assert_eq!(df.column("Year Number").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("Value").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Commodity,Value").unwrap();
        writeln!(file, "Apples,100").unwrap();
        writeln!(file, "Bananas,50").unwrap();

        let df = load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert!(df.column("Commodity").is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv("/definitely/not/here.csv").unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_clean_csv_content_drops_blank_lines() {
        let cleaned = clean_csv_content("a,b\n\n1,2\n   \n3,4");
        assert_eq!(cleaned, "a,b\n1,2\n3,4");
    }

    #[test]
    fn test_clean_csv_content_keeps_empty_quoted_fields() {
        let cleaned = clean_csv_content("a,b,c\nx,\"\",y\n\"\"\"q\"\"\",1,2");
        assert_eq!(cleaned, "a,b,c\nx,\"\",y\n\"\"\"q\"\"\",1,2");
    }
}
