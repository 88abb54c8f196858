//! `docling-serve-http` is an HTTP client for the Docling Serve document
//! conversion API.
//!
//! [`DoclingClient`] is async (tokio); [`blocking::DoclingClient`] offers the
//! same operations for synchronous code. Both retry transient failures (429,
//! 5xx, timeouts, connection errors) with exponential backoff configured by
//! [`ClientOptions`]:
//! - [`DoclingClient::health_check`]
//! - [`DoclingClient::convert`] / [`DoclingClient::convert_source`]
//! - [`DoclingClient::chunk`]
//! - [`DoclingClient::task_status`]

mod chunk;
mod client;
mod convert;
mod decode;
mod error;
mod formats;
mod options;
mod request;
mod source;
mod types;

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod retry;

pub use chunk::{
    ChunkDocumentsRequest, ChunkerOptions, HierarchicalChunkerOptions, HybridChunkerOptions,
};
pub use client::{DoclingClient, DEFAULT_BASE_URL};
pub use convert::{ConvertDocumentsRequest, ConvertDocumentsRequestOptions};
pub use error::DoclingError;
pub use formats::{
    ConversionStatus, ImageRefMode, InputFormat, OcrEngine, OutputFormat, PdfBackend,
    ProcessingPipeline, TableFormerMode, TaskStatus,
};
pub use options::ClientOptions;
pub use source::{S3Coordinates, Source, Target};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    Chunk, ChunkDocumentResponse, ChunkedDocumentResult, ConvertDocumentResponse, ConvertOutput,
    ErrorItem, ExportDocumentResponse, HealthCheckResponse, PresignedUrlConvertDocumentResponse,
    TaskStatusResponse,
};

pub type Result<T> = std::result::Result<T, DoclingError>;
