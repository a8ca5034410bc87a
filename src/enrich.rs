//! Row-by-row metadata enrichment with periodic checkpoint saves.
//!
//! The pass is strictly sequential: one lookup at a time, in table order.
//! A full snapshot of the table is persisted every `checkpoint_every`
//! rows and once more at the end, so an interrupted run leaves behind a
//! complete, loadable file. There is no resume cursor; restarting means
//! feeding the last snapshot back in as input.

use async_trait::async_trait;

use crate::domain::PipelineError;
use crate::table::Table;

/// Metadata bundle applied onto a matched row.
///
/// Fields are already defaulted by the lookup adapter; the enrichment
/// pass copies them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRecord {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub publication_date: String,
}

/// Capability interface for the external metadata provider.
///
/// `None` covers "no match" and every transport failure alike; the
/// enrichment pass never distinguishes them and never aborts on one.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn lookup(&self, isbn: &str) -> Option<EnrichmentRecord>;
}

/// Columns overwritten on a matched row. Everything else is untouched.
const TARGET_COLUMNS: [&str; 4] = ["Title", "Author", "publisher", "publication_date"];

/// Enrich `table` in place.
///
/// The key column is chosen once before the loop: `isbn13` when present,
/// otherwise `ISBN`. `persist` receives the full table at every
/// checkpoint boundary and once more after the final row; a persist
/// failure is fatal, a lookup failure is not.
pub async fn enrich_table<P>(
    table: &mut Table,
    lookup: &dyn MetadataLookup,
    checkpoint_every: usize,
    mut persist: P,
) -> Result<(), PipelineError>
where
    P: FnMut(&Table) -> Result<(), PipelineError>,
{
    let key_idx = table
        .column_index("isbn13")
        .or_else(|| table.column_index("ISBN"))
        .ok_or_else(|| PipelineError::MissingColumn("isbn13 or ISBN".to_string()))?;

    let targets: Vec<usize> = TARGET_COLUMNS
        .iter()
        .map(|c| table.ensure_column(c))
        .collect();

    let total = table.len();
    tracing::info!(
        "Enriching {} rows using key column '{}'",
        total,
        table.headers()[key_idx]
    );

    for index in 0..total {
        let key = clean_key(table.get(index, key_idx));

        if !key.is_empty() && key != "nan" {
            match lookup.lookup(&key).await {
                Some(record) => {
                    tracing::info!("[OK] {}/{}: {}", index + 1, total, record.title);
                    table.set(index, targets[0], record.title);
                    table.set(index, targets[1], record.author);
                    table.set(index, targets[2], record.publisher);
                    table.set(index, targets[3], record.publication_date);
                }
                None => {
                    tracing::info!("[SKIP] {}/{}: no data for {}", index + 1, total, key);
                }
            }
        }

        if checkpoint_every > 0 && (index + 1) % checkpoint_every == 0 {
            persist(table)?;
            tracing::info!("Progress saved at {}/{} rows", index + 1, total);
        }
    }

    // covers any trailing rows since the last checkpoint boundary
    persist(table)?;
    Ok(())
}

/// Coerce a key cell to a lookup key: drop a trailing `.0`-style decimal
/// artifact, then trim. Spreadsheet round-trips also leave the literal
/// text "nan" behind; callers treat that like an empty key.
fn clean_key(raw: &str) -> String {
    raw.split('.').next().unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct StaticLookup {
        records: HashMap<String, EnrichmentRecord>,
        calls: Mutex<Vec<String>>,
    }

    impl StaticLookup {
        fn new(records: HashMap<String, EnrichmentRecord>) -> Self {
            Self {
                records,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetadataLookup for StaticLookup {
        async fn lookup(&self, isbn: &str) -> Option<EnrichmentRecord> {
            self.calls.lock().unwrap().push(isbn.to_string());
            self.records.get(isbn).cloned()
        }
    }

    fn record(title: &str) -> EnrichmentRecord {
        EnrichmentRecord {
            title: title.to_string(),
            author: "Some Author".to_string(),
            publisher: "Some Press".to_string(),
            publication_date: "1999".to_string(),
        }
    }

    fn table_with_isbns(isbns: &[&str]) -> Table {
        let mut csv = String::from("ISBN,Title,Author,publisher,publication_date,shelf\n");
        for isbn in isbns {
            csv.push_str(isbn);
            csv.push_str(",,,,,A3\n");
        }
        Table::from_csv_reader(csv.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn thirty_rows_checkpoint_twenty_five_persists_twice() {
        let isbns: Vec<String> = (0..30).map(|i| format!("978000000{:04}", i)).collect();
        let refs: Vec<&str> = isbns.iter().map(|s| s.as_str()).collect();
        let mut table = table_with_isbns(&refs);

        let lookup = StaticLookup::new(HashMap::new());
        let mut saves = 0usize;
        enrich_table(&mut table, &lookup, 25, |_| {
            saves += 1;
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(saves, 2);
    }

    #[tokio::test]
    async fn short_table_persists_once_at_the_end() {
        let mut table = table_with_isbns(&["9780306406157"; 10]);

        let lookup = StaticLookup::new(HashMap::new());
        let mut saves = 0usize;
        enrich_table(&mut table, &lookup, 25, |_| {
            saves += 1;
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(saves, 1);
    }

    #[tokio::test]
    async fn nan_and_empty_keys_skip_the_lookup_entirely() {
        let mut table = table_with_isbns(&["nan", "", "9780306406157", "nan.0"]);

        let lookup = StaticLookup::new(HashMap::new());
        enrich_table(&mut table, &lookup, 0, |_| Ok(())).await.unwrap();

        // "nan.0" cleans to "nan" and is skipped too
        assert_eq!(lookup.calls(), vec!["9780306406157"]);
    }

    #[tokio::test]
    async fn matched_rows_overwrite_only_target_columns() {
        let mut table = table_with_isbns(&["9780306406157", "9999999999999"]);

        let mut records = HashMap::new();
        records.insert("9780306406157".to_string(), record("Fluid Mechanics"));
        let lookup = StaticLookup::new(records);

        enrich_table(&mut table, &lookup, 0, |_| Ok(())).await.unwrap();

        let title_idx = table.column_index("Title").unwrap();
        let shelf_idx = table.column_index("shelf").unwrap();

        assert_eq!(table.get(0, title_idx), "Fluid Mechanics");
        assert_eq!(table.get(0, shelf_idx), "A3");

        // unmatched row left entirely unmodified
        assert_eq!(table.get(1, title_idx), "");
        assert_eq!(table.get(1, shelf_idx), "A3");
    }

    #[tokio::test]
    async fn decimal_artifacts_are_removed_from_keys() {
        let mut table = table_with_isbns(&["9780306406157.0"]);

        let lookup = StaticLookup::new(HashMap::new());
        enrich_table(&mut table, &lookup, 0, |_| Ok(())).await.unwrap();

        assert_eq!(lookup.calls(), vec!["9780306406157"]);
    }

    #[tokio::test]
    async fn isbn13_column_takes_priority_over_isbn() {
        let mut table = Table::from_csv_reader(
            "ISBN,isbn13\n111,9780306406157\n".as_bytes(),
        )
        .unwrap();

        let lookup = StaticLookup::new(HashMap::new());
        enrich_table(&mut table, &lookup, 0, |_| Ok(())).await.unwrap();

        assert_eq!(lookup.calls(), vec!["9780306406157"]);
    }

    #[tokio::test]
    async fn target_columns_are_created_when_absent() {
        let mut table = Table::from_csv_reader("ISBN\n9780306406157\n".as_bytes()).unwrap();

        let mut records = HashMap::new();
        records.insert("9780306406157".to_string(), record("Fluid Mechanics"));
        let lookup = StaticLookup::new(records);

        enrich_table(&mut table, &lookup, 0, |_| Ok(())).await.unwrap();

        let idx = table.column_index("publication_date").unwrap();
        assert_eq!(table.get(0, idx), "1999");
    }

    #[tokio::test]
    async fn missing_key_column_is_fatal() {
        let mut table = Table::from_csv_reader("Title\nDune\n".as_bytes()).unwrap();

        let lookup = StaticLookup::new(HashMap::new());
        let result = enrich_table(&mut table, &lookup, 0, |_| Ok(())).await;
        assert!(matches!(result, Err(PipelineError::MissingColumn(_))));
    }
}
