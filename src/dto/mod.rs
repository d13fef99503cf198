pub mod rpc;

pub use rpc::{
    ApiError, ErrorCode, JsonRpcRequest, LoginResponse, RpcEnvelope, RpcReply, RpcResponse,
};
