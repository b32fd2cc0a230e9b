//! Typed client for the Pocket v3 retrieve endpoint.
//!
//! Request parameters are validated before anything is sent, and responses are
//! checked against a closed schema before their digit-string encodings are
//! turned into native types.

pub mod credentials;
pub mod pocket_api;
