use serde::{Deserialize, Serialize};

/// Document formats accepted as conversion input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Docx,
    Pptx,
    Html,
    Image,
    Pdf,
    Asciidoc,
    Md,
    Csv,
    Xlsx,
    XmlUspto,
    XmlJats,
    JsonDocling,
    Audio,
}

/// Export formats the service can render a converted document into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Md,
    Json,
    Html,
    HtmlSplitPage,
    Text,
    Doctags,
}

/// How pictures are represented in exported documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRefMode {
    Placeholder,
    Embedded,
    Referenced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngine {
    Auto,
    Easyocr,
    Ocrmac,
    Rapidocr,
    Tesserocr,
    Tesseract,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfBackend {
    Pypdfium2,
    DlparseV1,
    DlparseV2,
    DlparseV4,
}

/// Table structure model accuracy/speed trade-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormerMode {
    Fast,
    Accurate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingPipeline {
    Standard,
    Vlm,
    Asr,
}

/// Outcome of converting one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    Pending,
    Started,
    Success,
    PartialSuccess,
    Failure,
    Skipped,
}

/// Lifecycle state of an asynchronous task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Started,
    Success,
    PartialSuccess,
    Failure,
    Skipped,
    /// A status this client does not know yet. Treated as still running.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Whether the task will not change state anymore.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::PartialSuccess | Self::Failure | Self::Skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{InputFormat, OutputFormat, TaskStatus};

    #[test]
    fn formats_use_service_wire_names() {
        assert_eq!(
            serde_json::to_string(&InputFormat::XmlUspto).unwrap(),
            "\"xml_uspto\""
        );
        assert_eq!(
            serde_json::to_string(&OutputFormat::HtmlSplitPage).unwrap(),
            "\"html_split_page\""
        );
        assert_eq!(
            serde_json::from_str::<InputFormat>("\"md\"").unwrap(),
            InputFormat::Md
        );
    }

    #[test]
    fn only_finished_tasks_are_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Started.is_terminal());
        assert!(TaskStatus::Success.is_terminal());
        assert!(TaskStatus::Failure.is_terminal());
    }

    #[test]
    fn unrecognized_task_status_keeps_polling() {
        let status: TaskStatus = serde_json::from_str("\"retrying\"").unwrap();
        assert_eq!(status, TaskStatus::Unknown);
        assert!(!status.is_terminal());
    }
}
