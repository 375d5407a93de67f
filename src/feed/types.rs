use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// One decoded feed row: column label -> raw cell value.
pub type FlatRecord = Map<String, Value>;

/// Column keys with a typed home on [`AssetRecord`]. Anything else lands in `extra`.
const KNOWN_COLUMNS: &[&str] = &["id", "name", "type", "url", "tags", "version", "status", "updatedAt"];

/// Spreadsheet visualization response, once the callback envelope is stripped.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    pub table: Table,
}

#[derive(Debug, Deserialize)]
pub struct Table {
    pub cols: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
pub struct TableColumn {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl TableColumn {
    /// Label if present and non-empty, otherwise the raw column id.
    pub fn key(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub c: Vec<Option<TableCell>>,
}

#[derive(Debug, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub v: Value,
}

/// Store-assigned record identity. Never generated locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum AssetId {
    Int(i64),
    Text(String),
}

impl AssetId {
    /// Integral numbers (`3` or `3.0`) become `Int`; null and blank text yield `None`.
    pub fn from_cell(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                            Some(Self::Int(f as i64))
                        }
                        _ => Some(Self::Text(n.to_string())),
                    }
                }
            }
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(Self::Text(other.to_string())),
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Category tag. Open set; the three conventional kinds get their own variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum AssetKind {
    Css,
    Js,
    Img,
    Other(String),
}

impl AssetKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
            Self::Img => "img",
            Self::Other(s) => s,
        }
    }

    /// Label used by the filter bar.
    pub fn label(&self) -> &str {
        match self {
            Self::Css => "CSS",
            Self::Js => "JavaScript",
            Self::Img => "Images",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for AssetKind {
    fn from(value: &str) -> Self {
        match value {
            "css" => Self::Css,
            "js" => Self::Js,
            "img" => Self::Img,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<AssetKind> for String {
    fn from(kind: AssetKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle tag. Closed in practice, but unknown values are kept rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum AssetStatus {
    Active,
    Beta,
    Disabled,
    Other(String),
}

impl AssetStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Beta => "beta",
            Self::Disabled => "disabled",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for AssetStatus {
    fn from(value: &str) -> Self {
        match value {
            "active" => Self::Active,
            "beta" => Self::Beta,
            "disabled" => Self::Disabled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<AssetStatus> for String {
    fn from(status: AssetStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields that can be edited inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditableField {
    Name,
    Url,
    Tags,
    Version,
}

impl EditableField {
    pub const ALL: [EditableField; 4] = [Self::Name, Self::Url, Self::Tags, Self::Version];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Url => "url",
            Self::Tags => "tags",
            Self::Version => "version",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Url,
            Self::Url => Self::Tags,
            Self::Tags => Self::Version,
            Self::Version => Self::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Name => Self::Version,
            Self::Url => Self::Name,
            Self::Tags => Self::Url,
            Self::Version => Self::Tags,
        }
    }
}

impl FromStr for EditableField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "url" => Ok(Self::Url),
            "tags" => Ok(Self::Tags),
            "version" => Ok(Self::Version),
            other => Err(CatalogError::Format(format!("field is not editable: {}", other))),
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body sent to the write endpoint: `{id, field, value}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMutation {
    pub id: AssetId,
    pub field: EditableField,
    pub value: String,
}

/// One catalog entry. Every field is always present; null cells decode to empty text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRecord {
    pub id: AssetId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub url: String,
    pub tags: String,
    pub version: String,
    pub status: AssetStatus,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AssetRecord {
    /// Build a typed record from a flat feed row. Fails only when the id is missing.
    pub fn from_flat(row: &FlatRecord) -> Result<Self, CatalogError> {
        let id = row
            .get("id")
            .and_then(AssetId::from_cell)
            .ok_or_else(|| CatalogError::Format("record has no id".to_string()))?;

        let text = |key: &str| row.get(key).map(cell_text).unwrap_or_default();

        let extra = row
            .iter()
            .filter(|(key, _)| !KNOWN_COLUMNS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            id,
            name: text("name"),
            kind: AssetKind::from(text("type").as_str()),
            url: text("url"),
            tags: text("tags"),
            version: text("version"),
            status: AssetStatus::from(text("status").as_str()),
            updated_at: row
                .get("updatedAt")
                .map(timestamp_text)
                .unwrap_or_default(),
            extra,
        })
    }

    pub fn field(&self, field: EditableField) -> &str {
        match field {
            EditableField::Name => &self.name,
            EditableField::Url => &self.url,
            EditableField::Tags => &self.tags,
            EditableField::Version => &self.version,
        }
    }

    pub fn set_field(&mut self, field: EditableField, value: String) {
        match field {
            EditableField::Name => self.name = value,
            EditableField::Url => self.url = value,
            EditableField::Tags => self.tags = value,
            EditableField::Version => self.version = value,
        }
    }

    /// Tags rendered as trimmed chips. The comma-separated string stays authoritative.
    pub fn tag_chips(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Convert decoded rows into typed records, rejecting the whole batch on the
/// first bad row or duplicated id.
pub fn assets_from_rows(rows: &[FlatRecord]) -> Result<Vec<AssetRecord>, CatalogError> {
    let mut seen: HashSet<AssetId> = HashSet::with_capacity(rows.len());
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let record = AssetRecord::from_flat(row)
            .map_err(|e| CatalogError::Format(format!("row {}: {}", index + 1, e.message())))?;
        if !seen.insert(record.id.clone()) {
            return Err(CatalogError::Format(format!(
                "row {}: duplicate id {}",
                index + 1,
                record.id
            )));
        }
        records.push(record);
    }
    Ok(records)
}

/// Render a cell as text. Null becomes empty; integral numbers drop the trailing `.0`.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 1e15) {
                format!("{}", f as i64)
            } else {
                n.to_string()
            }
        }
        other => other.to_string(),
    }
}

/// Date cells arrive as `Date(y,m,d[,h,mi,s])` with a zero-based month; normalize
/// those to ISO 8601 and pass anything else through as text.
fn timestamp_text(value: &Value) -> String {
    let text = cell_text(value);
    parse_table_date(&text).unwrap_or(text)
}

fn parse_table_date(text: &str) -> Option<String> {
    let inner = text.strip_prefix("Date(")?.strip_suffix(')')?;
    let parts: Vec<u32> = inner
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() < 3 {
        return None;
    }
    let part = |i: usize| parts.get(i).copied().unwrap_or(0);
    let year = i32::try_from(part(0)).ok()?;
    let date = chrono::NaiveDate::from_ymd_opt(year, part(1).checked_add(1)?, part(2))?;
    let datetime = date.and_hms_opt(part(3), part(4), part(5))?;
    Some(datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}
