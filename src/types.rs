use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Screenshot metadata: arbitrary key/value annotations.
pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub path: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Category {
    /// Parent path as sent by the backend, or derived from `path` when omitted.
    pub fn parent_path(&self) -> Option<&str> {
        match &self.parent {
            Some(p) if !p.is_empty() => Some(p.as_str()),
            Some(_) => None,
            None => self.path.rsplit_once('/').map(|(parent, _)| parent).filter(|p| !p.is_empty()),
        }
    }

    pub fn depth(&self) -> usize {
        self.path.trim_matches('/').matches('/').count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryList {
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    /// Parent category path; empty for the root.
    pub parent: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateScreenshotRequest {
    pub name: String,
    pub description: String,
    /// Category path; empty for the root.
    pub category: String,
    pub metadata: Metadata,
}

/// Envelope shared by every mutating endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiResponse {
    pub const OK: &'static str = "ok";

    #[cfg(test)]
    pub(crate) fn ok(path: Option<String>) -> Self {
        Self { status: Self::OK.to_string(), message: None, path }
    }

    #[cfg(test)]
    pub(crate) fn err(message: impl Into<String>) -> Self {
        Self { status: "err".to_string(), message: Some(message.into()), path: None }
    }

    pub fn is_ok(&self) -> bool { self.status == Self::OK }

    /// Turn a non-"ok" status into an error carrying the backend message.
    pub fn into_result(self) -> Result<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(anyhow!("{}", self.message.as_deref().unwrap_or("unknown error")))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    pub fn len(&self) -> u64 { self.bytes.len() as u64 }

    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    pub fn mime(&self) -> &'static str {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            _ => "application/octet-stream",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl UploadProgress {
    /// Bar width in percent, or `None` when the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        if self.total == 0 { return None; }
        Some(100.0 * self.loaded as f64 / self.total as f64)
    }
}

/// Depth-first ordering of categories by path, paired with their depth.
pub fn category_tree(categories: &[Category]) -> Vec<(usize, &Category)> {
    let mut sorted: Vec<&Category> = categories.iter().collect();
    sorted.sort_by(|a, b| {
        let a_parts = a.path.trim_matches('/').split('/');
        let b_parts = b.path.trim_matches('/').split('/');
        a_parts.cmp(b_parts)
    });
    sorted.into_iter().map(|c| (c.depth(), c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(path: &str, name: &str) -> Category {
        Category { path: path.to_string(), name: name.to_string(), parent: None }
    }

    #[test]
    fn parent_is_derived_from_path() {
        assert_eq!(cat("games/doom", "Doom").parent_path(), Some("games"));
        assert_eq!(cat("games", "Games").parent_path(), None);
        let explicit = Category { parent: Some("other".into()), ..cat("games/doom", "Doom") };
        assert_eq!(explicit.parent_path(), Some("other"));
        let root = Category { parent: Some(String::new()), ..cat("games/doom", "Doom") };
        assert_eq!(root.parent_path(), None);
    }

    #[test]
    fn non_ok_status_becomes_error_with_message() {
        let err = ApiResponse::err("Name must be filled!").into_result().unwrap_err();
        assert_eq!(err.to_string(), "Name must be filled!");

        let bare = ApiResponse { status: "err".into(), message: None, path: None };
        assert_eq!(bare.into_result().unwrap_err().to_string(), "unknown error");

        assert!(ApiResponse::ok(Some("a/b".into())).into_result().is_ok());
    }

    #[test]
    fn response_without_optional_fields_decodes() {
        let res: ApiResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(res.is_ok());
        assert_eq!(res.path, None);
    }

    #[test]
    fn progress_percent() {
        assert_eq!(UploadProgress { loaded: 50, total: 200 }.percent(), Some(25.0));
        assert_eq!(UploadProgress { loaded: 200, total: 200 }.percent(), Some(100.0));
        assert_eq!(UploadProgress { loaded: 0, total: 0 }.percent(), None);
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(UploadFile::new("shot.PNG", vec![]).mime(), "image/png");
        assert_eq!(UploadFile::new("shot.jpeg", vec![]).mime(), "image/jpeg");
        assert_eq!(UploadFile::new("notes", vec![]).mime(), "application/octet-stream");
    }

    #[test]
    fn tree_is_depth_first() {
        let cats = vec![cat("b", "B"), cat("a/x", "AX"), cat("a", "A"), cat("a/x/y", "AXY"), cat("a-b", "A-B")];
        let tree: Vec<(usize, &str)> = category_tree(&cats).into_iter().map(|(d, c)| (d, c.path.as_str())).collect();
        assert_eq!(tree, vec![(0, "a"), (1, "a/x"), (2, "a/x/y"), (0, "a-b"), (0, "b")]);
    }
}
