use std::collections::BTreeMap;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{DoclingError, Result};

/// Object storage location shared by S3 sources and targets.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Coordinates {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

fn default_verify_ssl() -> bool {
    true
}

impl std::fmt::Debug for S3Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Coordinates")
            .field("endpoint", &self.endpoint)
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("key_prefix", &self.key_prefix)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

impl S3Coordinates {
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            bucket: bucket.into(),
            key_prefix: String::new(),
            verify_ssl: true,
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }
}

/// Where the service fetches input documents from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    /// Document content sent inline as base64.
    File {
        base64_string: String,
        filename: String,
    },
    /// Document downloaded by the service.
    Http {
        url: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },
    /// Every object under a bucket prefix.
    S3(S3Coordinates),
}

impl Source {
    /// Encodes raw document bytes as an inline file source.
    pub fn from_bytes(filename: impl Into<String>, content: impl AsRef<[u8]>) -> Self {
        Self::File {
            base64_string: STANDARD.encode(content.as_ref()),
            filename: filename.into(),
        }
    }

    /// Reads a local file into an inline file source.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                DoclingError::InvalidRequest(format!(
                    "path '{}' has no usable file name",
                    path.display()
                ))
            })?
            .to_owned();
        let content = std::fs::read(path)?;
        Ok(Self::from_bytes(filename, content))
    }

    pub fn http(url: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Adds a header sent by the service when downloading an HTTP source.
    ///
    /// Has no effect on other source kinds.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Http { headers, .. } = &mut self {
            headers.insert(name.into(), value.into());
        }
        self
    }

    pub fn s3(coordinates: S3Coordinates) -> Self {
        Self::S3(coordinates)
    }
}

/// Where the service delivers conversion results.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// Results are returned in the response body.
    #[default]
    Inbody,
    /// Results are returned as a zip archive.
    Zip,
    /// Results are uploaded to object storage.
    S3(S3Coordinates),
    /// Results are uploaded with an HTTP PUT to a presigned URL.
    Put { url: String },
}

impl Target {
    pub fn put(url: impl Into<String>) -> Self {
        Self::Put { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{S3Coordinates, Source, Target};

    #[test]
    fn file_source_is_base64_encoded_and_tagged() {
        let source = Source::from_bytes("test.md", b"# Title");
        assert_eq!(
            serde_json::to_value(&source).unwrap(),
            json!({"kind": "file", "base64_string": "IyBUaXRsZQ==", "filename": "test.md"})
        );
    }

    #[test]
    fn http_source_omits_empty_headers() {
        let plain = serde_json::to_value(Source::http("https://example.com/doc.pdf")).unwrap();
        assert_eq!(plain, json!({"kind": "http", "url": "https://example.com/doc.pdf"}));

        let with_header = Source::http("https://example.com/doc.pdf")
            .with_header("User-Agent", "docling-serve-http");
        assert_eq!(
            serde_json::to_value(with_header).unwrap()["headers"]["User-Agent"],
            "docling-serve-http"
        );
    }

    #[test]
    fn s3_source_flattens_coordinates() {
        let source = Source::s3(
            S3Coordinates::new("s3.amazonaws.com", "ak", "sk", "docs").with_key_prefix("in/"),
        );
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["kind"], "s3");
        assert_eq!(value["bucket"], "docs");
        assert_eq!(value["key_prefix"], "in/");
        assert_eq!(value["verify_ssl"], true);
    }

    #[test]
    fn targets_use_kind_tags() {
        assert_eq!(serde_json::to_value(Target::default()).unwrap(), json!({"kind": "inbody"}));
        assert_eq!(serde_json::to_value(Target::Zip).unwrap(), json!({"kind": "zip"}));
        assert_eq!(
            serde_json::to_value(Target::put("https://bucket/upload")).unwrap(),
            json!({"kind": "put", "url": "https://bucket/upload"})
        );
    }

    #[test]
    fn debug_redacts_s3_credentials() {
        let coordinates = S3Coordinates::new("endpoint", "access-123", "secret-456", "bucket");
        let debug = format!("{coordinates:?}");
        assert!(!debug.contains("access-123"));
        assert!(!debug.contains("secret-456"));
    }

    #[test]
    fn from_path_reports_missing_files_as_io_errors() {
        let err = Source::from_path("definitely/not/here.pdf").expect_err("file must be missing");
        assert!(matches!(err, crate::DoclingError::Io(_)));
    }
}
