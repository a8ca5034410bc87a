//! XML catalogue import: converts `<book>` element trees into a table.
//!
//! Legacy exports ship one or more XML files whose `<book>` elements carry
//! flat child elements. Each book becomes one row; children that are
//! absent become empty cells. The resulting table uses the same lowercase
//! column names as the source elements so it can feed straight into the
//! cleaning pass after a header rename, or be written out as CSV.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::domain::PipelineError;
use crate::table::Table;

/// Output columns, in emission order. These match the child element
/// names recognized inside `<book>`.
const COLUMNS: [&str; 5] = ["title", "author", "year", "publisher", "isbn"];

/// Parse a single XML document into a table of books.
pub fn table_from_xml_str(xml: &str) -> Result<Table, PipelineError> {
    let mut table = Table::new(COLUMNS.iter().map(|c| c.to_string()).collect());
    append_books(xml, &mut table)?;
    Ok(table)
}

pub fn table_from_xml_path<P: AsRef<Path>>(path: P) -> Result<Table, PipelineError> {
    table_from_xml_paths(&[path.as_ref().to_path_buf()])
}

/// Parse several XML files into one table, appending books in argument
/// order.
pub fn table_from_xml_paths(paths: &[std::path::PathBuf]) -> Result<Table, PipelineError> {
    let mut table = Table::new(COLUMNS.iter().map(|c| c.to_string()).collect());

    for path in paths {
        let xml = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
        append_books(&xml, &mut table)?;
        tracing::info!("Imported '{}' ({} books so far)", path.display(), table.len());
    }

    Ok(table)
}

fn append_books(xml: &str, table: &mut Table) -> Result<(), PipelineError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_book = false;
    let mut current_field: Option<usize> = None;
    let mut cells: [String; 5] = Default::default();

    // Simple parser state machine: a <book> opens a row buffer, known
    // child elements select a cell, text fills it.
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let qname = e.name();
                let name = std::str::from_utf8(qname.as_ref()).unwrap_or("");
                if name == "book" {
                    in_book = true;
                    cells = Default::default();
                } else if in_book {
                    current_field = COLUMNS.iter().position(|c| *c == name);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(idx) = current_field {
                    let text = e.unescape().unwrap_or_default().to_string();
                    cells[idx] = text;
                }
            }
            Ok(Event::End(e)) => {
                let qname = e.name();
                let name = std::str::from_utf8(qname.as_ref()).unwrap_or("");
                if name == "book" {
                    in_book = false;
                    table.push_row(cells.to_vec());
                } else if current_field.is_some() {
                    current_field = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PipelineError::Xml(format!("XML parse error: {}", e))),
            _ => (),
        }
        buf.clear();
    }

    Ok(())
}
