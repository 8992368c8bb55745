use a2a_types::{JSONRPCError, JSONRPCId};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<Value>,
    pub id: Option<JSONRPCId>,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JSONRPCError>,
    pub id: Option<JSONRPCId>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<JSONRPCId>, result: Value) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }
}

/// Helper function to validate JSON-RPC request
pub fn validate_request(req: &JsonRpcRequest) -> Result<(), crate::Error> {
    if req.jsonrpc != "2.0" {
        return Err(crate::Error::InvalidRequest(
            "Invalid JSON-RPC version".to_string(),
        ));
    }
    Ok(())
}

/// Decode the request's params into the method's parameter type.
pub fn parse_params<T: DeserializeOwned>(req: JsonRpcRequest) -> Result<T, crate::Error> {
    let params = req
        .params
        .ok_or_else(|| crate::Error::InvalidParams("Missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| crate::Error::InvalidParams(e.to_string()))
}
