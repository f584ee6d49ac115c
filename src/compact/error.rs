use thiserror::Error;

/// Errors raised while packing textual addresses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid ipv4 address: {0}")]
    InvalidIpv4(String),

    #[error("invalid ipv6 address: {0}")]
    InvalidIpv6(String),
}
