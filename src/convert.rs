use serde::{Deserialize, Serialize};

use crate::{
    DoclingError, ImageRefMode, InputFormat, OcrEngine, OutputFormat, PdfBackend,
    ProcessingPipeline, Result, Source, TableFormerMode, Target,
};

/// Conversion settings.
///
/// Every field is optional; unset fields are omitted from the payload so the
/// service applies its own default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertDocumentsRequestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_formats: Option<Vec<InputFormat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_formats: Option<Vec<OutputFormat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_export_mode: Option<ImageRefMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_ocr: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_ocr: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_engine: Option<OcrEngine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_lang: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_backend: Option<PdfBackend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_mode: Option<TableFormerMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<ProcessingPipeline>,
    /// Inclusive, 1-based page range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_range: Option<(u32, u32)>,
    /// Per-document processing limit in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_timeout: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_on_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_table_structure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_images: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md_page_break_placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_code_enrichment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_formula_enrichment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_picture_classification: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_picture_description: Option<bool>,
}

impl ConvertDocumentsRequestOptions {
    pub fn from_formats(mut self, formats: impl IntoIterator<Item = InputFormat>) -> Self {
        self.from_formats = Some(formats.into_iter().collect());
        self
    }

    pub fn to_formats(mut self, formats: impl IntoIterator<Item = OutputFormat>) -> Self {
        self.to_formats = Some(formats.into_iter().collect());
        self
    }

    pub fn do_ocr(mut self, enabled: bool) -> Self {
        self.do_ocr = Some(enabled);
        self
    }

    pub fn include_images(mut self, enabled: bool) -> Self {
        self.include_images = Some(enabled);
        self
    }

    pub fn images_scale(mut self, scale: f64) -> Self {
        self.images_scale = Some(scale);
        self
    }

    pub fn page_range(mut self, first: u32, last: u32) -> Self {
        self.page_range = Some((first, last));
        self
    }

    /// Checks value ranges the service would otherwise reject with a 422.
    pub fn validate(&self) -> Result<()> {
        if let Some(scale) = self.images_scale {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(DoclingError::InvalidRequest(format!(
                    "images_scale must be positive, got {scale}"
                )));
            }
        }
        if let Some(timeout) = self.document_timeout {
            if !(timeout.is_finite() && timeout > 0.0) {
                return Err(DoclingError::InvalidRequest(format!(
                    "document_timeout must be positive, got {timeout}"
                )));
            }
        }
        if let Some((first, last)) = self.page_range {
            if first == 0 || first > last {
                return Err(DoclingError::InvalidRequest(format!(
                    "page_range must be 1-based and ordered, got ({first}, {last})"
                )));
            }
        }
        if self.to_formats.as_ref().is_some_and(Vec::is_empty) {
            return Err(DoclingError::InvalidRequest(
                "to_formats must name at least one format".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Payload of the `/v1/convert/source` endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertDocumentsRequest {
    #[serde(default)]
    pub options: ConvertDocumentsRequestOptions,
    pub sources: Vec<Source>,
    #[serde(default)]
    pub target: Target,
}

impl ConvertDocumentsRequest {
    pub fn new(sources: impl IntoIterator<Item = Source>) -> Self {
        Self {
            options: ConvertDocumentsRequestOptions::default(),
            sources: sources.into_iter().collect(),
            target: Target::default(),
        }
    }

    pub fn with_options(mut self, options: ConvertDocumentsRequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(DoclingError::InvalidRequest(
                "at least one source is required".to_owned(),
            ));
        }
        self.options.validate()
    }
}
