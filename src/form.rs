use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{CreateCategoryRequest, CreateScreenshotRequest, Metadata, UploadFile};

/// One name/value pair from the metadata section of the upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRow {
    pub name: String,
    pub value: String,
}

impl MetadataRow {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Parses `KEY=VALUE`, trimming both sides; the value may itself contain `=`.
impl FromStr for MetadataRow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, value)) => Ok(Self::new(name.trim(), value.trim())),
            None => Err(format!("expected KEY=VALUE, got `{s}`")),
        }
    }
}

/// Rows with an empty name are dropped; a later duplicate name wins.
pub fn collect_metadata(rows: &[MetadataRow]) -> Metadata {
    let mut out = Metadata::new();
    for row in rows.iter().filter(|r| !r.name.is_empty()) {
        out.insert(row.name.clone(), row.value.clone());
    }
    out
}

/// Current values of the upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadFields {
    pub name: String,
    pub description: String,
    /// Selected category path; empty selects the root.
    pub category: String,
    pub file: Option<UploadFile>,
}

impl UploadFields {
    pub fn to_request(&self, rows: &[MetadataRow]) -> CreateScreenshotRequest {
        CreateScreenshotRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            metadata: collect_metadata(rows),
        }
    }
}

/// Current values of the create-category form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFields {
    pub name: String,
    pub parent: String,
    pub description: String,
}

impl CategoryFields {
    pub fn to_request(&self) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: self.name.clone(),
            parent: self.parent.clone(),
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_dropped_and_later_duplicates_win() {
        let rows = vec![MetadataRow::new("size", "10"), MetadataRow::new("", "x"), MetadataRow::new("size", "20")];
        let md = collect_metadata(&rows);
        assert_eq!(md.len(), 1);
        assert_eq!(md.get("size").map(String::as_str), Some("20"));
    }

    #[test]
    fn upload_payload_serializes_metadata_as_object() {
        let fields = UploadFields {
            name: "Title screen".into(),
            description: "".into(),
            category: "games/doom".into(),
            file: None,
        };
        let req = fields.to_request(&[MetadataRow::new("resolution", "640x480")]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Title screen",
                "description": "",
                "category": "games/doom",
                "metadata": { "resolution": "640x480" }
            })
        );
    }

    #[test]
    fn category_payload_uses_empty_parent_for_root() {
        let fields = CategoryFields { name: "Games".into(), ..Default::default() };
        let json = serde_json::to_value(fields.to_request()).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Games", "parent": "", "description": "" }));
    }

    #[test]
    fn parse_metadata_row() {
        assert_eq!("a=b=c".parse::<MetadataRow>().unwrap(), MetadataRow::new("a", "b=c"));
        assert_eq!("=x".parse::<MetadataRow>().unwrap(), MetadataRow::new("", "x"));
        assert_eq!(" k = v ".parse::<MetadataRow>().unwrap(), MetadataRow::new("k", "v"));
        assert!("novalue".parse::<MetadataRow>().is_err());
    }
}
