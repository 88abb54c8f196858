use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{ConversionStatus, TaskStatus};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
}

/// A converted document rendered in each requested output format.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDocumentResponse {
    pub filename: String,
    #[serde(default)]
    pub md_content: Option<String>,
    #[serde(default)]
    pub json_content: Option<JsonValue>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub doctags_content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorItem {
    pub component_type: String,
    pub module_name: String,
    pub error_message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvertDocumentResponse {
    pub document: ExportDocumentResponse,
    pub status: ConversionStatus,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
    pub processing_time: f64,
    #[serde(default)]
    pub timings: BTreeMap<String, JsonValue>,
}

/// Summary returned when results were uploaded to S3 or a presigned URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresignedUrlConvertDocumentResponse {
    pub processing_time: f64,
    pub num_converted: u32,
    pub num_succeeded: u32,
    pub num_failed: u32,
}

/// Result of [`DoclingClient::convert`](crate::DoclingClient::convert),
/// shaped by the request's [`Target`](crate::Target).
#[derive(Clone, Debug, PartialEq)]
pub enum ConvertOutput {
    Document(ConvertDocumentResponse),
    /// Raw zip archive bytes.
    Zip(Vec<u8>),
    Presigned(PresignedUrlConvertDocumentResponse),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub task_id: String,
    #[serde(default)]
    pub task_type: Option<String>,
    pub task_status: TaskStatus,
    #[serde(default)]
    pub task_position: Option<u32>,
    #[serde(default)]
    pub task_meta: Option<JsonValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub filename: String,
    pub chunk_index: u32,
    pub text: String,
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub num_tokens: Option<u32>,
    #[serde(default)]
    pub headings: Vec<String>,
    #[serde(default)]
    pub captions: Vec<String>,
    #[serde(default)]
    pub doc_items: Vec<String>,
    #[serde(default)]
    pub page_numbers: Vec<u32>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

/// Per-source conversion outcome attached to a chunking response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkedDocumentResult {
    #[serde(default)]
    pub content: Option<ExportDocumentResponse>,
    pub status: ConversionStatus,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkDocumentResponse {
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub documents: Vec<ChunkedDocumentResult>,
    #[serde(default)]
    pub processing_time: Option<f64>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ChunkDocumentResponse, ConvertDocumentResponse, TaskStatusResponse};
    use crate::{ConversionStatus, TaskStatus};

    #[test]
    fn convert_response_tolerates_missing_optional_fields() {
        let response: ConvertDocumentResponse = serde_json::from_value(json!({
            "document": { "filename": "test.md", "md_content": "# Test" },
            "status": "success",
            "processing_time": 0.42
        }))
        .unwrap();

        assert_eq!(response.status, ConversionStatus::Success);
        assert_eq!(response.document.md_content.as_deref(), Some("# Test"));
        assert!(response.document.html_content.is_none());
        assert!(response.errors.is_empty());
    }

    #[test]
    fn task_status_decodes_meta() {
        let status: TaskStatusResponse = serde_json::from_value(json!({
            "task_id": "test-task-123",
            "task_type": "convert",
            "task_status": "success",
            "task_position": 1,
            "task_meta": { "processing_time": 2.5 }
        }))
        .unwrap();

        assert_eq!(status.task_status, TaskStatus::Success);
        assert_eq!(status.task_meta.unwrap()["processing_time"], 2.5);
    }

    #[test]
    fn chunk_response_decodes_chunks() {
        let response: ChunkDocumentResponse = serde_json::from_value(json!({
            "chunks": [
                { "filename": "a.pdf", "chunk_index": 0, "text": "Intro", "headings": ["Intro"] }
            ],
            "documents": [ { "status": "success" } ]
        }))
        .unwrap();

        assert_eq!(response.chunks[0].headings, vec!["Intro".to_owned()]);
        assert_eq!(response.documents[0].status, ConversionStatus::Success);
    }
}
