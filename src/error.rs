//! Error taxonomy for the routing and send-swap engines.
//!
//! Every variant here is a caller-facing contract, not an implementation
//! detail — callers match on these to decide surfaced status codes and
//! recovery behavior.

use thiserror::Error;

use crate::asset::AssetId;
use crate::providers::ProviderId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown asset: {0}")]
    AssetUnknown(AssetId),

    #[error("no route from {from} to {to}")]
    NoRoute { from: AssetId, to: AssetId },

    #[error("path exceeds max hops ({actual} > {max})")]
    MaxHopsExceeded { actual: usize, max: usize },

    #[error("path exceeds max cross-chain hops ({actual} > {max})")]
    MaxCrossChainExceeded { actual: usize, max: usize },

    #[error("provider {0:?} disallowed by constraints")]
    ProviderDisallowed(ProviderId),

    #[error("path is circular, repeats asset {0}")]
    Circular(AssetId),

    #[error("quote step failed at hop {hop}: {reason}")]
    QuoteFailed { hop: usize, reason: String },

    #[error("network error talking to provider {provider:?}: {message}")]
    Network {
        provider: ProviderId,
        message: String,
    },

    #[error("insufficient liquidity for requested amount")]
    InsufficientLiquidity,

    #[error("price impact {percent:.2}% exceeds tolerance")]
    HighPriceImpact { percent: f64 },

    #[error("invalid state transition: {0}")]
    InvalidState(String),

    #[error("unsupported asset or chain: {0}")]
    UnsupportedAssetOrChain(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
