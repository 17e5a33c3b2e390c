use crate::error::{Result, ScraperError};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A whole CSV file held as strings, header first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScraperError::MissingInput(path.to_path_buf()));
        }
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str, table: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            ScraperError::Integrity(format!("{table} has no '{name}' column"))
        })
    }

    /// Write the table to `path`, replacing any previous file.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// All values of one column, in file order.
pub fn read_column(path: &Path, name: &str) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(ScraperError::MissingInput(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let idx = reader
        .headers()?
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| {
            ScraperError::Integrity(format!("{} has no '{}' column", path.display(), name))
        })?;
    let mut values = Vec::new();
    for record in reader.records() {
        if let Some(value) = record?.get(idx) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

/// Data rows in a CSV file; a missing file counts as zero.
pub fn count_rows(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}

/// Drop repeats and blanks, keeping first-seen order.
pub fn unique_in_order(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_column_and_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a,item_url\n1,x\n2,y\n3,x\n").unwrap();

        assert_eq!(read_column(&path, "item_url").unwrap(), vec!["x", "y", "x"]);
        assert_eq!(count_rows(&path).unwrap(), 3);
        assert!(matches!(
            read_column(&path, "nope"),
            Err(ScraperError::Integrity(_))
        ));
        assert!(matches!(
            read_column(&dir.path().join("missing.csv"), "a"),
            Err(ScraperError::MissingInput(_))
        ));
        assert_eq!(count_rows(&dir.path().join("missing.csv")).unwrap(), 0);
    }

    #[test]
    fn test_unique_in_order() {
        let values = vec!["b".into(), "a".into(), "b".into(), "".into(), "c".into()];
        assert_eq!(unique_in_order(values), vec!["b", "a", "c"]);
    }
}
