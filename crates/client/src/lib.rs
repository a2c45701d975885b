//! Classification service HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). One call per
//! invocation: encode the table as `;`-delimited CSV, upload it as a
//! multipart file part to `POST {endpoint}/predict-file`, validate the
//! JSON body against the response contract. Failures are never retried
//! here — a failed classification surfaces to the caller and requires
//! explicit re-invocation.

use std::fmt;
use std::time::Duration;

use billetscan_core::Table;
use billetscan_io::to_wire_csv;
use billetscan_protocol::PredictionResponse;

/// Bounded timeout applied to the whole request. Timeout expiry is the
/// only cancellation point; there is no mid-flight cancel signal.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("bscan/", env!("CARGO_PKG_VERSION"));

/// Error type for classification calls.
///
/// Callers need to tell apart "could not reach the service"
/// ([`Transport`](ClientError::Transport)), "service rejected the
/// input" ([`Service`](ClientError::Service)) and "service returned
/// garbage" ([`ResponseShape`](ClientError::ResponseShape)).
#[derive(Debug)]
pub enum ClientError {
    /// Table could not be encoded into the wire format.
    Encode(String),
    /// Network-level failure: connection refused, DNS, timeout.
    Transport(String),
    /// Non-success HTTP status from the service.
    Service { status: u16, body: String },
    /// 2xx response whose body doesn't match the contract.
    ResponseShape(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(msg) => write!(f, "encode error: {msg}"),
            Self::Transport(msg) => write!(f, "service unreachable: {msg}"),
            Self::Service { status, body } => {
                write!(f, "service returned HTTP {status}: {body}")
            }
            Self::ResponseShape(msg) => write!(f, "malformed service response: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

/// Classification service client (blocking).
#[derive(Clone)]
pub struct ClassifierClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl ClassifierClient {
    /// Create a client for `endpoint` (base URL, e.g.
    /// `http://127.0.0.1:8000`) with a bounded request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Classify every row of `table` against the remote service.
    ///
    /// Issues exactly one outbound request. The response's
    /// `predictions[i]` corresponds to `table.row(i)`.
    pub fn classify(&self, table: &Table) -> Result<PredictionResponse, ClientError> {
        let wire = to_wire_csv(table).map_err(|e| ClientError::Encode(e.to_string()))?;

        let part = reqwest::blocking::multipart::Part::text(wire)
            .file_name("data.csv")
            .mime_str("text/csv")
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new().part("file", part);

        let url = format!("{}/predict-file", self.endpoint);
        log::debug!("POST {url} ({} row(s))", table.n_rows());

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            log::warn!("classification rejected: HTTP {}", status.as_u16());
            return Err(ClientError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ClientError::ResponseShape(format!("body is not JSON: {e}")))?;
        PredictionResponse::from_json(&value)
            .map_err(|e| ClientError::ResponseShape(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billetscan_core::{Cell, Table};
    use billetscan_protocol::Label;
    use httpmock::prelude::*;

    fn sample_table() -> Table {
        Table::from_rows(
            vec!["diagonal".into(), "length".into()],
            vec![
                vec![Cell::Number(171.81), Cell::Number(112.83)],
                vec![Cell::Number(171.46), Cell::Number(111.42)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn successful_classification() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/predict-file");
            then.status(200).json_body(serde_json::json!({
                "predictions": [
                    { "diagonal": 171.81, "length": 112.83, "label": "Vrai" },
                    { "diagonal": 171.46, "length": 111.42, "label": "Faux" }
                ],
                "stats": { "total": 2, "n_true": 1, "n_false": 1 }
            }));
        });

        let client = ClassifierClient::new(&server.base_url(), DEFAULT_TIMEOUT);
        let response = client.classify(&sample_table()).unwrap();

        mock.assert();
        assert_eq!(response.predictions.len(), 2);
        assert_eq!(response.predictions[0].label, Label::Vrai);
        assert_eq!(response.stats.n_false, 1);
    }

    #[test]
    fn trailing_slash_endpoint_normalized() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/predict-file");
            then.status(200).json_body(serde_json::json!({
                "predictions": [],
                "stats": { "total": 0, "n_true": 0, "n_false": 0 }
            }));
        });

        let endpoint = format!("{}/", server.base_url());
        let client = ClassifierClient::new(&endpoint, DEFAULT_TIMEOUT);
        client.classify(&sample_table()).unwrap();
        mock.assert();
    }

    #[test]
    fn http_500_is_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/predict-file");
            then.status(500).body("model exploded");
        });

        let client = ClassifierClient::new(&server.base_url(), DEFAULT_TIMEOUT);
        let err = client.classify(&sample_table()).unwrap_err();

        match err {
            ClientError::Service { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model exploded");
            }
            other => panic!("expected Service error, got {other:?}"),
        }
    }

    #[test]
    fn connection_refused_is_transport_error() {
        // Nothing listens on this port
        let client = ClassifierClient::new("http://127.0.0.1:1", DEFAULT_TIMEOUT);
        let err = client.classify(&sample_table()).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "got {err:?}");
    }

    #[test]
    fn missing_predictions_is_shape_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/predict-file");
            then.status(200)
                .json_body(serde_json::json!({ "stats": { "total": 0, "n_true": 0, "n_false": 0 } }));
        });

        let client = ClassifierClient::new(&server.base_url(), DEFAULT_TIMEOUT);
        let err = client.classify(&sample_table()).unwrap_err();
        match err {
            ClientError::ResponseShape(msg) => assert!(msg.contains("predictions")),
            other => panic!("expected ResponseShape error, got {other:?}"),
        }
    }

    #[test]
    fn non_json_success_body_is_shape_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/predict-file");
            then.status(200).body("<html>oops</html>");
        });

        let client = ClassifierClient::new(&server.base_url(), DEFAULT_TIMEOUT);
        let err = client.classify(&sample_table()).unwrap_err();
        assert!(matches!(err, ClientError::ResponseShape(_)), "got {err:?}");
    }
}
