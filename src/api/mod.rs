//! Dynamics 365 metadata API access
//!
//! Endpoint construction lives in `constants`, the NTLM handshake in `ntlm`
//! and request execution in `client`.

pub mod client;
pub mod constants;
pub mod ntlm;

pub use client::MetadataClient;
pub use constants::OptionSetAttribute;
