//! Final join: item refs ⟕ item details on `item_url`, then ⟕ collections on
//! `collection_url`. Both right-hand tables must be unique on their key.

use crate::config::PathsConfig;
use crate::constants::{COLLECTION_URL_COLUMN, ITEM_URL_COLUMN, STAGE_MERGE};
use crate::error::{Result, ScraperError};
use crate::pipeline::table::Table;
use metrics::counter;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub rows: usize,
    pub columns: usize,
    pub output: PathBuf,
}

/// Merge the three stage outputs named in `paths` into `paths.merged_csv`.
pub fn run(paths: &PathsConfig) -> Result<MergeReport> {
    merge_outputs(
        &paths.collections_csv,
        &paths.item_refs_csv,
        &paths.item_details_csv,
        &paths.merged_csv,
    )
}

#[instrument(skip_all, fields(stage = STAGE_MERGE))]
pub fn merge_outputs(
    collections: &Path,
    item_refs: &Path,
    item_details: &Path,
    output: &Path,
) -> Result<MergeReport> {
    for input in [collections, item_refs, item_details] {
        if !input.exists() {
            return Err(ScraperError::MissingInput(input.to_path_buf()));
        }
    }

    let refs = Table::load(item_refs)?;
    let details = Table::load(item_details)?;
    let lists = Table::load(collections)?;
    info!(
        "Merging {} item refs with {} details and {} collections",
        refs.rows.len(),
        details.rows.len(),
        lists.rows.len()
    );

    // Validate both right-hand keys before producing anything
    key_index(&details, ITEM_URL_COLUMN, "item details")?;
    key_index(&lists, COLLECTION_URL_COLUMN, "collections")?;

    let with_details = left_join(&refs, &details, ITEM_URL_COLUMN, "item details")?;
    let merged = left_join(&with_details, &lists, COLLECTION_URL_COLUMN, "collections")?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = output.with_extension("csv.tmp");
    merged.write(&tmp)?;
    fs::rename(&tmp, output)?;

    counter!("scrape_records_flushed_total", "stage" => STAGE_MERGE).increment(merged.rows.len() as u64);
    info!("Saved {} merged rows to {}", merged.rows.len(), output.display());
    Ok(MergeReport {
        rows: merged.rows.len(),
        columns: merged.headers.len(),
        output: output.to_path_buf(),
    })
}

/// Map from key to row index; any repeated key is an integrity violation.
fn key_index<'a>(table: &'a Table, key: &str, name: &str) -> Result<HashMap<&'a str, usize>> {
    let col = table.require_column(key, name)?;
    let mut index = HashMap::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let value = row.get(col).map(String::as_str).unwrap_or("");
        if index.insert(value, i).is_some() {
            return Err(ScraperError::Integrity(format!(
                "{name} has more than one row for {key} '{value}'"
            )));
        }
    }
    Ok(index)
}

/// Many-to-one left join. Row order follows `left`; unmatched rows get empty
/// cells. Non-key columns present on both sides are suffixed `_x` / `_y`.
fn left_join(left: &Table, right: &Table, key: &str, right_name: &str) -> Result<Table> {
    let left_key = left.require_column(key, "left table")?;
    let right_key = right.require_column(key, right_name)?;
    let index = key_index(right, key, right_name)?;

    let right_cols: Vec<usize> = (0..right.headers.len()).filter(|&i| i != right_key).collect();
    let left_names: HashSet<&str> = left.headers.iter().map(String::as_str).collect();
    let right_names: HashSet<&str> = right_cols.iter().map(|&i| right.headers[i].as_str()).collect();

    let mut headers: Vec<String> = left
        .headers
        .iter()
        .map(|h| {
            if h != key && right_names.contains(h.as_str()) {
                format!("{h}_x")
            } else {
                h.clone()
            }
        })
        .collect();
    headers.extend(right_cols.iter().map(|&i| {
        let h = &right.headers[i];
        if left_names.contains(h.as_str()) {
            format!("{h}_y")
        } else {
            h.clone()
        }
    }));

    let rows = left
        .rows
        .iter()
        .map(|row| {
            let matched = row
                .get(left_key)
                .and_then(|k| index.get(k.as_str()))
                .map(|&i| &right.rows[i]);
            let mut out = row.clone();
            out.extend(right_cols.iter().map(|&c| {
                matched
                    .and_then(|r| r.get(c))
                    .cloned()
                    .unwrap_or_default()
            }));
            out
        })
        .collect();

    Ok(Table { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_merge_repeats_collection_fields_per_item() {
        let dir = tempdir().unwrap();
        let lists = write(
            dir.path(),
            "lists.csv",
            "page_url,collection_url,collection_title,owner_name,item_count,like_count,comment_count\n\
             p1,L1,Best,ann,42,7,1\n",
        );
        let refs = write(
            dir.path(),
            "refs.csv",
            "collection_url,item_url,tags\nL1,A,\nL1,B,\nL1,C,\n",
        );
        let details = write(
            dir.path(),
            "details.csv",
            "item_url,title,release_year\nA,Alpha,1999\nB,Beta,2001\nC,Gamma,\n",
        );
        let out = dir.path().join("merged.csv");

        let report = merge_outputs(&lists, &refs, &details, &out).unwrap();
        assert_eq!(report.rows, 3);

        let table = Table::load(&out).unwrap();
        let count = table.column_index("item_count").unwrap();
        let title = table.column_index("title").unwrap();
        assert!(table.rows.iter().all(|r| r[count] == "42"));
        let titles: Vec<&str> = table.rows.iter().map(|r| r[title].as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
        assert!(!dir.path().join("merged.csv.tmp").exists());
    }

    #[test]
    fn test_unmatched_items_get_empty_cells() {
        let dir = tempdir().unwrap();
        let lists = write(dir.path(), "lists.csv", "collection_url,like_count\nL1,5\n");
        let refs = write(dir.path(), "refs.csv", "collection_url,item_url\nL1,A\nL2,B\n");
        let details = write(dir.path(), "details.csv", "item_url,title\nA,Alpha\n");
        let out = dir.path().join("merged.csv");

        merge_outputs(&lists, &refs, &details, &out).unwrap();
        let table = Table::load(&out).unwrap();
        assert_eq!(table.headers, vec!["collection_url", "item_url", "title", "like_count"]);
        assert_eq!(table.rows[1], vec!["L2", "B", "", ""]);
    }

    #[test]
    fn test_duplicate_right_key_fails_without_output() {
        let dir = tempdir().unwrap();
        let lists = write(dir.path(), "lists.csv", "collection_url,like_count\nL1,5\n");
        let refs = write(dir.path(), "refs.csv", "collection_url,item_url\nL1,A\n");
        let details = write(
            dir.path(),
            "details.csv",
            "item_url,title\nA,Alpha\nA,Alpha again\n",
        );
        let out = dir.path().join("merged.csv");

        let err = merge_outputs(&lists, &refs, &details, &out).unwrap_err();
        assert!(matches!(err, ScraperError::Integrity(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_overlapping_columns_are_suffixed() {
        let dir = tempdir().unwrap();
        let lists = write(dir.path(), "lists.csv", "collection_url,tags\nL1,curated\n");
        let refs = write(dir.path(), "refs.csv", "collection_url,item_url,tags\nL1,A,horror\n");
        let details = write(dir.path(), "details.csv", "item_url,title\nA,Alpha\n");
        let out = dir.path().join("merged.csv");

        merge_outputs(&lists, &refs, &details, &out).unwrap();
        let table = Table::load(&out).unwrap();
        assert_eq!(
            table.headers,
            vec!["collection_url", "item_url", "tags_x", "title", "tags_y"]
        );
        assert_eq!(table.rows[0], vec!["L1", "A", "horror", "Alpha", "curated"]);
    }

    #[test]
    fn test_missing_input_is_reported() {
        let dir = tempdir().unwrap();
        let lists = write(dir.path(), "lists.csv", "collection_url\nL1\n");
        let refs = write(dir.path(), "refs.csv", "collection_url,item_url\nL1,A\n");
        let out = dir.path().join("merged.csv");

        let err = merge_outputs(&lists, &refs, &dir.path().join("nope.csv"), &out).unwrap_err();
        assert!(matches!(err, ScraperError::MissingInput(_)));
    }
}
