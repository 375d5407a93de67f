//! Callback-envelope extraction and table decoding for the spreadsheet feed.
//!
//! The feed answers with text of the form
//! `google.visualization.Query.setResponse({...});`, usually preceded by a
//! comment line. Decoding is a pure transform once the body is in hand.

use super::types::{assets_from_rows, AssetRecord, FlatRecord, Table, TableResponse};
use crate::error::CatalogError;
use serde_json::Value;

pub const ENVELOPE_PREFIX: &str = "google.visualization.Query.setResponse(";

/// Locate the JSON payload inside the callback envelope.
pub fn extract_payload(raw: &str) -> Result<&str, CatalogError> {
    let start = raw.find(ENVELOPE_PREFIX).ok_or_else(|| {
        CatalogError::Format("response is not wrapped in a setResponse(...) envelope".to_string())
    })?;
    let rest = &raw[start + ENVELOPE_PREFIX.len()..];
    let end = rest.rfind(')').ok_or_else(|| {
        CatalogError::Format("setResponse envelope is not closed".to_string())
    })?;
    Ok(&rest[..end])
}

/// Decode a raw feed response into flat records, one per row, in row order.
pub fn decode(raw: &str) -> Result<Vec<FlatRecord>, CatalogError> {
    let payload = extract_payload(raw)?;
    let response: TableResponse = serde_json::from_str(payload)
        .map_err(|e| CatalogError::format("feed payload is not a valid table", e))?;
    Ok(flatten_table(&response.table))
}

/// Decode a raw feed response straight into typed records.
pub fn decode_assets(raw: &str) -> Result<Vec<AssetRecord>, CatalogError> {
    let rows = decode(raw)?;
    assets_from_rows(&rows)
}

/// Zip column keys positionally with each row's cells. Short rows pad with
/// null; cells past the last column are dropped.
///
/// Keys are unique per record: when two columns share a label, the later
/// column's value replaces the earlier one and the record has fewer fields
/// than the table has columns.
pub fn flatten_table(table: &Table) -> Vec<FlatRecord> {
    let keys: Vec<&str> = table.cols.iter().map(|c| c.key()).collect();
    table
        .rows
        .iter()
        .map(|row| {
            keys.iter()
                .enumerate()
                .map(|(index, key)| {
                    let value = row
                        .c
                        .get(index)
                        .and_then(|cell| cell.as_ref())
                        .map(|cell| cell.v.clone())
                        .unwrap_or(Value::Null);
                    (key.to_string(), value)
                })
                .collect::<FlatRecord>()
        })
        .collect()
}
