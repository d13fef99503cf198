use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;

pub const JSON_RPC_VERSION: &str = "2.0";

/// Prefix joined with the operation name to form the JSON-RPC `method`
pub const SPORTS_API_PREFIX: &str = "SportsAPING/v1.0/";

/// A single JSON-RPC 2.0 call. `params` is embedded as-is.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: &'a RawValue,
    pub id: i32,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(operation: &str, params: &'a RawValue) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION,
            method: format!("{}{}", SPORTS_API_PREFIX, operation),
            params,
            id: 1,
        }
    }
}

/// Outbound request body: the call wrapped in a one-element batch
#[derive(Debug, Clone)]
pub struct RpcEnvelope<'a> {
    pub call: JsonRpcRequest<'a>,
}

impl<'a> RpcEnvelope<'a> {
    pub fn new(operation: &str, params: &'a RawValue) -> Self {
        Self {
            call: JsonRpcRequest::new(operation, params),
        }
    }

    pub fn method(&self) -> &str {
        &self.call.method
    }
}

impl Serialize for RpcEnvelope<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        std::slice::from_ref(&self.call).serialize(serializer)
    }
}

/// Error code as sent by the server. Anything that is neither an integer
/// nor a string (`null`, floats, objects) is kept as `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Number(i64),
    Text(String),
    Other(Value),
}

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::Other(Value::Null)
    }
}

impl From<&Value> for ErrorCode {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(code) => ErrorCode::Text(code.clone()),
            Value::Number(code) => match code.as_i64() {
                Some(code) => ErrorCode::Number(code),
                None => ErrorCode::Other(value.clone()),
            },
            other => ErrorCode::Other(other.clone()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Number(code) => write!(f, "{}", code),
            ErrorCode::Text(code) => f.write_str(code),
            ErrorCode::Other(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&Value> for ApiError {
    /// Read `message` and `code` out of an `error` member of any shape.
    /// A bare string becomes the message.
    fn from(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self {
                message: match fields.get("message") {
                    Some(Value::String(message)) => message.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                },
                code: fields.get("code").map(ErrorCode::from).unwrap_or_default(),
                data: fields.get("data").cloned(),
            },
            Value::String(message) => Self {
                message: message.clone(),
                code: ErrorCode::default(),
                data: None,
            },
            other => Self {
                message: other.to_string(),
                code: ErrorCode::default(),
                data: None,
            },
        }
    }
}

/// One JSON-RPC reply object. `error` is kept as raw JSON so that a reply
/// with a malformed error member is still recognised as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl RpcReply {
    /// The error member, if present and not `null`
    pub fn api_error(&self) -> Option<ApiError> {
        self.error.as_ref().map(ApiError::from)
    }
}

/// The RPC endpoint answers either with a bare object or with a batch
/// holding one object. Only the first element of a batch is inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcResponse {
    Batch(Vec<RpcReply>),
    Single(RpcReply),
}

impl RpcResponse {
    pub fn reply(&self) -> Option<&RpcReply> {
        match self {
            RpcResponse::Single(reply) => Some(reply),
            RpcResponse::Batch(replies) => replies.first(),
        }
    }

    pub fn error(&self) -> Option<ApiError> {
        self.reply().and_then(RpcReply::api_error)
    }

    pub fn result(&self) -> Option<&Value> {
        self.reply().and_then(|reply| reply.result.as_ref())
    }

    pub fn into_result(self) -> Option<Value> {
        match self {
            RpcResponse::Single(reply) => reply.result,
            RpcResponse::Batch(replies) => replies.into_iter().next().and_then(|r| r.result),
        }
    }
}

/// Body returned by the certificate login endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub login_status: Option<String>,
}

impl LoginResponse {
    /// The token, if the endpoint returned a non-empty one
    pub fn token(&self) -> Option<&str> {
        self.session_token.as_deref().filter(|token| !token.is_empty())
    }
}
