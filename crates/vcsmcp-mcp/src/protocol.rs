//! JSON-RPC 2.0 message codec.
//!
//! Messages are framed as newline-delimited JSON: one compact object per
//! line, so the transport only has to split stdout on `\n`.
//! Reference: <https://www.jsonrpc.org/specification>

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Protocol version carried in every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Well-known JSON-RPC error codes. Positive codes are backend-defined.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i64 = -32700;
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i64 = -32600;
    /// The method does not exist or is not available.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Request identifier, chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::String(id.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "\"{s}\""),
        }
    }
}

impl RequestId {
    fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => json!(n),
            Self::String(s) => json!(s),
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("[{code}] {message}")]
pub struct ErrorInfo {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorInfo {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::PARSE_ERROR, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_REQUEST, message)
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("code".to_string(), json!(self.code));
        object.insert("message".to_string(), json!(self.message));
        if let Some(data) = &self.data {
            object.insert("data".to_string(), data.clone());
        }
        Value::Object(object)
    }
}

/// A decoded JSON-RPC envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request {
        id: RequestId,
        method: String,
        params: Option<Value>,
    },
    Response {
        id: RequestId,
        outcome: Result<Value, ErrorInfo>,
    },
    Notification {
        method: String,
        params: Option<Value>,
    },
}

impl Message {
    pub fn request(
        id: impl Into<RequestId>,
        method: impl Into<String>,
        params: Option<Value>,
    ) -> Self {
        Self::Request {
            id: id.into(),
            method: method.into(),
            params,
        }
    }

    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self::Notification {
            method: method.into(),
            params,
        }
    }

    pub fn response(id: impl Into<RequestId>, outcome: Result<Value, ErrorInfo>) -> Self {
        Self::Response {
            id: id.into(),
            outcome,
        }
    }

    /// Build the wire representation.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("jsonrpc".to_string(), json!(JSONRPC_VERSION));

        match self {
            Self::Request { id, method, params } => {
                object.insert("id".to_string(), id.to_value());
                object.insert("method".to_string(), json!(method));
                if let Some(params) = params {
                    object.insert("params".to_string(), params.clone());
                }
            }
            Self::Response { id, outcome } => {
                object.insert("id".to_string(), id.to_value());
                match outcome {
                    Ok(result) => object.insert("result".to_string(), result.clone()),
                    Err(error) => object.insert("error".to_string(), error.to_value()),
                };
            }
            Self::Notification { method, params } => {
                object.insert("method".to_string(), json!(method));
                if let Some(params) = params {
                    object.insert("params".to_string(), params.clone());
                }
            }
        }

        Value::Object(object)
    }
}

/// Encode a message as one newline-terminated line.
pub fn encode(message: &Message) -> Vec<u8> {
    let mut line = message.to_value().to_string();
    line.push('\n');
    line.into_bytes()
}

/// Decode one line into a message.
///
/// Fails with -32700 for invalid JSON and -32600 for envelope violations.
pub fn decode(bytes: &[u8]) -> Result<Message, ErrorInfo> {
    let value: Value = serde_json::from_slice(bytes.trim_ascii())
        .map_err(|e| ErrorInfo::parse_error(format!("Parse error: {e}")))?;
    from_value(value)
}

/// Interpret an already-parsed JSON value as a message.
pub fn from_value(value: Value) -> Result<Message, ErrorInfo> {
    let Value::Object(mut object) = value else {
        return Err(ErrorInfo::invalid_request("message must be a JSON object"));
    };

    match object.get("jsonrpc") {
        Some(Value::String(version)) if version == JSONRPC_VERSION => {}
        Some(other) => {
            return Err(ErrorInfo::invalid_request(format!(
                "unsupported jsonrpc version: {other}"
            )));
        }
        None => return Err(ErrorInfo::invalid_request("missing jsonrpc field")),
    }

    let id = object.remove("id").map(parse_id).transpose()?;
    let params = object.remove("params");

    if let Some(method) = object.remove("method") {
        let Value::String(method) = method else {
            return Err(ErrorInfo::invalid_request("method must be a string"));
        };
        return Ok(match id {
            Some(id) => Message::Request { id, method, params },
            None => Message::Notification { method, params },
        });
    }

    let id = id.ok_or_else(|| ErrorInfo::invalid_request("response is missing id"))?;

    // Some servers send `"result": null` alongside an error
    match (object.remove("result"), object.remove("error")) {
        (Some(result), None) => Ok(Message::Response {
            id,
            outcome: Ok(result),
        }),
        (None | Some(Value::Null), Some(error)) => Ok(Message::Response {
            id,
            outcome: Err(parse_error_object(error)?),
        }),
        (Some(_), Some(_)) => Err(ErrorInfo::invalid_request(
            "response carries both result and error",
        )),
        (None, None) => Err(ErrorInfo::invalid_request(
            "message has neither method nor result/error",
        )),
    }
}

fn parse_id(value: Value) -> Result<RequestId, ErrorInfo> {
    match value {
        Value::String(s) => Ok(RequestId::String(s)),
        Value::Number(n) => n
            .as_i64()
            .map(RequestId::Number)
            .ok_or_else(|| ErrorInfo::invalid_request(format!("id must be an integer: {n}"))),
        other => Err(ErrorInfo::invalid_request(format!(
            "id must be a string or integer: {other}"
        ))),
    }
}

fn parse_error_object(value: Value) -> Result<ErrorInfo, ErrorInfo> {
    let Value::Object(mut object) = value else {
        return Err(ErrorInfo::invalid_request("error must be an object"));
    };

    let code = object
        .get("code")
        .and_then(Value::as_i64)
        .ok_or_else(|| ErrorInfo::invalid_request("error is missing an integer code"))?;
    let message = match object.remove("message") {
        Some(Value::String(message)) => message,
        _ => return Err(ErrorInfo::invalid_request("error is missing a message")),
    };

    Ok(ErrorInfo {
        code,
        message,
        data: object.remove("data"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(message: &Message) -> Message {
        decode(&encode(message)).unwrap()
    }

    #[test]
    fn test_encode_is_single_line() {
        let message = Message::request(
            7,
            "tools/call",
            Some(json!({"name": "git_commit", "arguments": {"message": "a\nb"}})),
        );
        let bytes = encode(&message);
        assert_eq!(bytes.last(), Some(&b'\n'));
        assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn test_roundtrip_all_kinds() {
        let messages = [
            Message::request(1, "tools/list", None),
            Message::request("abc", "tools/call", Some(json!({"name": "git_status"}))),
            Message::response(2, Ok(json!({"content": [], "isError": false}))),
            Message::response(3, Ok(Value::Null)),
            Message::response(
                4,
                Err(ErrorInfo::new(error_codes::METHOD_NOT_FOUND, "Method not found")
                    .with_data(json!({"method": "nope"}))),
            ),
            Message::notification("notifications/initialized", Some(json!({}))),
            Message::notification("ping", None),
        ];

        for message in &messages {
            assert_eq!(&roundtrip(message), message);
        }
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = decode(b"{not json").unwrap_err();
        assert_eq!(err.code, error_codes::PARSE_ERROR);
    }

    #[test]
    fn test_wrong_version_is_invalid_request() {
        let err = decode(br#"{"jsonrpc":"1.0","id":1,"result":{}}"#).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_REQUEST);

        let err = decode(br#"{"id":1,"result":{}}"#).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_REQUEST);
    }

    #[test]
    fn test_missing_fields_are_invalid_request() {
        let cases: [&[u8]; 5] = [
            br#"{"jsonrpc":"2.0","result":{}}"#,
            br#"{"jsonrpc":"2.0","id":1}"#,
            br#"{"jsonrpc":"2.0","id":1,"error":{"message":"no code"}}"#,
            br#"{"jsonrpc":"2.0","id":1.5,"result":{}}"#,
            br#"[1,2,3]"#,
        ];

        for case in cases {
            let err = decode(case).unwrap_err();
            assert_eq!(err.code, error_codes::INVALID_REQUEST, "{}", String::from_utf8_lossy(case));
        }
    }

    #[test]
    fn test_error_with_null_result_decodes_as_error() {
        let message = decode(
            br#"{"jsonrpc":"2.0","id":2,"result":null,"error":{"code":-32601,"message":"Method not found"}}"#,
        )
        .unwrap();
        let Message::Response { outcome, .. } = message else {
            panic!("expected response");
        };
        assert_eq!(outcome.unwrap_err().code, error_codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_trailing_whitespace_ignored() {
        let message = decode(b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\"}\r\n").unwrap();
        assert_eq!(message, Message::notification("ping", None));
    }
}
