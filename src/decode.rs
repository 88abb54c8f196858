use serde::de::DeserializeOwned;

use crate::{ConvertOutput, DoclingError, Result, Target};

pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|err| {
        DoclingError::Decode(format!(
            "invalid {what} response JSON: {err}; body: {}",
            String::from_utf8_lossy(body)
        ))
    })
}

/// Interprets a successful convert response according to where results were sent.
pub(crate) fn decode_convert_output(target: &Target, body: Vec<u8>) -> Result<ConvertOutput> {
    match target {
        Target::Inbody => decode_json(&body, "convert").map(ConvertOutput::Document),
        Target::Zip => {
            if body.is_empty() {
                return Err(DoclingError::Decode(
                    "empty body for zip target".to_owned(),
                ));
            }
            Ok(ConvertOutput::Zip(body))
        }
        Target::S3(_) | Target::Put { .. } => {
            decode_json(&body, "presigned convert").map(ConvertOutput::Presigned)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_convert_output, decode_json};
    use crate::{ConvertOutput, DoclingError, HealthCheckResponse, Target};

    #[test]
    fn decode_error_includes_body() {
        let err = decode_json::<HealthCheckResponse>(b"not json", "health")
            .expect_err("body must fail to decode");
        match err {
            DoclingError::Decode(message) => {
                assert!(message.contains("health"));
                assert!(message.contains("not json"));
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn zip_target_keeps_raw_bytes() {
        let output = decode_convert_output(&Target::Zip, b"PK\x03\x04".to_vec()).unwrap();
        assert_eq!(output, ConvertOutput::Zip(b"PK\x03\x04".to_vec()));
    }

    #[test]
    fn put_target_decodes_presigned_summary() {
        let body = br#"{"processing_time":3.2,"num_converted":5,"num_succeeded":4,"num_failed":1}"#;
        match decode_convert_output(&Target::put("https://upload"), body.to_vec()).unwrap() {
            ConvertOutput::Presigned(summary) => {
                assert_eq!(summary.num_succeeded, 4);
                assert_eq!(summary.num_failed, 1);
            }
            other => panic!("expected presigned summary, got {other:?}"),
        }
    }
}
