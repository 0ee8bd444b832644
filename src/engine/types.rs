use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorDiag {
    pub backend: String,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of the priming call: just enough to plan chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOut {
    pub page_count: usize,
}

/// One page of pre-extracted document content as supplied by the
/// extraction collaborator. `tables` and `visual_elements` are opaque to
/// the scanner and pass through to the result untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
    #[serde(default)]
    pub rotation: i64,
    #[serde(default)]
    pub formatting_flags: Vec<String>,
    #[serde(default)]
    pub tables: Vec<Value>,
    #[serde(default)]
    pub visual_elements: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOut {
    pub total_pages: usize,
    pub pages: Vec<PageText>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}
