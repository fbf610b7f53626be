//! Casper wallet core.
//!
//! Interprets an opaque Casper transaction (or legacy deploy) into a
//! normalised, human-presentable signature request, enriching it with
//! account names, contract metadata and fiat amounts fetched from the wallet
//! API and a node. The same wallet API client lists what an account holds
//! and what it has done: tokens, NFTs, stakes and deploy history.
//!
//! # Module Organization
//!
//! - [`domain`] - Value types and parsing
//! - [`signature_request`] - Argument decoding, action classification and assembly
//! - [`client`] - Wallet API and node RPC collaborators
//! - [`config`] - Client configuration

pub mod client;
pub mod config;
pub mod domain;
pub mod signature_request;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::ClientConfig;
pub use signature_request::{
    Action, Enrichment, SignatureRequest, SignatureRequestArg, SignatureRequestPreparer,
    build_signature_request, classify_action, collect_referenced_hashes, decode_arguments,
};
