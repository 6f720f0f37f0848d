pub mod rpc;
pub mod verifier;

pub use rpc::{RpcClient, RpcClientError};
pub use verifier::{CandidateMarket, PositionVerifier};
