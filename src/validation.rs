//! Request parameter validation for addresses, actions and hashes.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingParameter(&'static str),

    #[error("Invalid address format: {0}")]
    InvalidAddress(String),
}

/// Validate a `0x`-prefixed 20-byte hex address.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.trim().is_empty() {
        return Err(ValidationError::MissingParameter("address"));
    }
    let Some(body) = address.strip_prefix("0x") else {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    };
    if body.len() != 40 || hex::decode(body).is_err() {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }
    Ok(())
}

/// Lowercase-normalize an address for storage and store queries.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}
