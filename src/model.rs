use serde::{Deserialize, Serialize};

/// One structured grant/incentive entry mined from a text source.
/// All fields are free text; everything except `name` may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub name: String,
    pub description: String,
    pub eligibility: String,
    pub funding: String,
    pub deadline: String,
    pub contact: String,
}

/// Page-level statements not tied to a specific program.
/// At most one value per label; first regex match wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralInfo {
    pub eligibility: Option<String>,
    pub application_process: Option<String>,
    pub contact: Option<String>,
}

impl GeneralInfo {
    pub fn is_empty(&self) -> bool {
        self.eligibility.is_none() && self.application_process.is_none() && self.contact.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedInfo {
    pub programs: Vec<ProgramRecord>,
    pub general: GeneralInfo,
}

/// One downloaded and parsed document, owned by its parent FetchResult.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    pub url: String,
    pub file_name: String,
    /// Text of the anchor the document was discovered through.
    pub anchor_text: String,
    /// Extracted text, capped at `documents::MAX_DOCUMENT_CHARS`.
    pub text: String,
    pub info: ExtractedInfo,
}

/// Everything mined from one input URL. Built once by the batch runner,
/// never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub url: String,
    pub success: bool,
    pub page_text: String,
    pub documents: Vec<DocumentResult>,
    pub info: ExtractedInfo,
    pub error: Option<String>,
}

impl FetchResult {
    pub fn failed(url: &str, error: String) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            page_text: String::new(),
            documents: Vec::new(),
            info: ExtractedInfo::default(),
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_is_empty() {
        let r = FetchResult::failed("https://example.org", "HTTP error: 500".into());
        assert!(!r.success);
        assert!(r.page_text.is_empty());
        assert!(r.documents.is_empty());
        assert!(r.info.programs.is_empty());
        assert_eq!(r.error.as_deref(), Some("HTTP error: 500"));
    }

    #[test]
    fn general_info_empty_check() {
        let mut g = GeneralInfo::default();
        assert!(g.is_empty());
        g.contact = Some("grants@example.org".into());
        assert!(!g.is_empty());
    }
}
