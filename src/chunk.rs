use serde::{Deserialize, Serialize};

use crate::{ConvertDocumentsRequestOptions, DoclingError, Result, Source, Target};

/// Options for the structure-following chunker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalChunkerOptions {
    pub max_chunk_size: u32,
    pub min_chunk_size: u32,
    pub overlap: u32,
}

impl Default for HierarchicalChunkerOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: 1_000,
            min_chunk_size: 100,
            overlap: 50,
        }
    }
}

impl HierarchicalChunkerOptions {
    pub fn validate(&self) -> Result<()> {
        validate_sizes(self.max_chunk_size, self.min_chunk_size, self.overlap)
    }
}

/// Options for the token-aware chunker that also merges semantically close peers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HybridChunkerOptions {
    pub max_chunk_size: u32,
    pub min_chunk_size: u32,
    pub overlap: u32,
    pub semantic_threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_peers: Option<bool>,
}

impl Default for HybridChunkerOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: 1_000,
            min_chunk_size: 100,
            overlap: 50,
            semantic_threshold: 0.5,
            tokenizer: None,
            merge_peers: None,
        }
    }
}

impl HybridChunkerOptions {
    pub fn validate(&self) -> Result<()> {
        validate_sizes(self.max_chunk_size, self.min_chunk_size, self.overlap)?;
        if !(0.0..=1.0).contains(&self.semantic_threshold) {
            return Err(DoclingError::InvalidRequest(format!(
                "semantic_threshold must be within [0, 1], got {}",
                self.semantic_threshold
            )));
        }
        Ok(())
    }
}

fn validate_sizes(max: u32, min: u32, overlap: u32) -> Result<()> {
    if max == 0 {
        return Err(DoclingError::InvalidRequest(
            "max_chunk_size must be positive".to_owned(),
        ));
    }
    if min > max {
        return Err(DoclingError::InvalidRequest(format!(
            "min_chunk_size ({min}) exceeds max_chunk_size ({max})"
        )));
    }
    if overlap >= max {
        return Err(DoclingError::InvalidRequest(format!(
            "overlap ({overlap}) must be smaller than max_chunk_size ({max})"
        )));
    }
    Ok(())
}

/// Chunker choice; selects the endpoint as well as the options payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChunkerOptions {
    Hierarchical(HierarchicalChunkerOptions),
    Hybrid(HybridChunkerOptions),
}

impl ChunkerOptions {
    pub(crate) fn endpoint_name(&self) -> &'static str {
        match self {
            Self::Hierarchical(_) => "hierarchical",
            Self::Hybrid(_) => "hybrid",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Hierarchical(options) => options.validate(),
            Self::Hybrid(options) => options.validate(),
        }
    }
}

impl From<HierarchicalChunkerOptions> for ChunkerOptions {
    fn from(options: HierarchicalChunkerOptions) -> Self {
        Self::Hierarchical(options)
    }
}

impl From<HybridChunkerOptions> for ChunkerOptions {
    fn from(options: HybridChunkerOptions) -> Self {
        Self::Hybrid(options)
    }
}

/// Payload of the `/v1/chunk/{chunker}/source` endpoints.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChunkDocumentsRequest {
    pub sources: Vec<Source>,
    pub convert_options: ConvertDocumentsRequestOptions,
    pub target: Target,
    #[serde(rename = "chunking_options")]
    pub chunker: ChunkerOptions,
}

impl ChunkDocumentsRequest {
    pub fn new(
        sources: impl IntoIterator<Item = Source>,
        chunker: impl Into<ChunkerOptions>,
    ) -> Self {
        Self {
            sources: sources.into_iter().collect(),
            convert_options: ConvertDocumentsRequestOptions::default(),
            target: Target::default(),
            chunker: chunker.into(),
        }
    }

    pub fn with_convert_options(mut self, options: ConvertDocumentsRequestOptions) -> Self {
        self.convert_options = options;
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
        self.convert_options.validate()?;
        self.chunker.validate()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        ChunkDocumentsRequest, ChunkerOptions, HierarchicalChunkerOptions, HybridChunkerOptions,
    };
    use crate::{ConvertDocumentsRequestOptions, Source};

    #[test]
    fn sizes_must_be_ordered() {
        let options = HierarchicalChunkerOptions {
            max_chunk_size: 2_000,
            min_chunk_size: 200,
            overlap: 100,
        };
        assert!(options.validate().is_ok());

        let inverted = HierarchicalChunkerOptions {
            max_chunk_size: 100,
            min_chunk_size: 200,
            overlap: 10,
        };
        assert!(inverted.validate().is_err());

        let overlapping = HierarchicalChunkerOptions {
            max_chunk_size: 100,
            min_chunk_size: 10,
            overlap: 100,
        };
        assert!(overlapping.validate().is_err());
    }

    #[test]
    fn semantic_threshold_is_a_ratio() {
        let mut options = HybridChunkerOptions {
            max_chunk_size: 1_500,
            min_chunk_size: 150,
            overlap: 75,
            semantic_threshold: 0.8,
            ..HybridChunkerOptions::default()
        };
        assert!(options.validate().is_ok());

        options.semantic_threshold = 1.2;
        assert!(options.validate().is_err());
    }

    #[test]
    fn chunker_choice_selects_endpoint() {
        let hierarchical: ChunkerOptions = HierarchicalChunkerOptions::default().into();
        let hybrid: ChunkerOptions = HybridChunkerOptions::default().into();
        assert_eq!(hierarchical.endpoint_name(), "hierarchical");
        assert_eq!(hybrid.endpoint_name(), "hybrid");
    }

    #[test]
    fn chunk_payload_nests_convert_and_chunk_options() {
        let request = ChunkDocumentsRequest::new(
            [Source::http("https://example.com/doc.pdf")],
            HybridChunkerOptions::default(),
        )
        .with_convert_options(ConvertDocumentsRequestOptions::default().do_ocr(false));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["convert_options"], json!({"do_ocr": false}));
        assert_eq!(value["chunking_options"]["semantic_threshold"], 0.5);
        assert_eq!(value["target"], json!({"kind": "inbody"}));
        assert!(value["chunking_options"].get("tokenizer").is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn chunk_request_requires_sources() {
        let request = ChunkDocumentsRequest::new([], HierarchicalChunkerOptions::default());
        assert!(matches!(
            request.validate(),
            Err(crate::DoclingError::InvalidRequest(_))
        ));
    }
}
