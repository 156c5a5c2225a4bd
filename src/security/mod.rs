//! Security module
//!
//! The completion provider's API key lives only on the trusted side (the
//! proxy server, or the CLI when it is explicitly run in direct mode).
//! Clients of the proxy never see it.

pub mod keyring;

use anyhow::Result;

/// Environment variable that overrides the stored key
pub const API_KEY_ENV: &str = "NEXTMIND_API_KEY";

/// Set API key in secure keyring
pub fn set_api_key(key: &str) -> Result<()> {
    keyring::set_api_key(key)
}

/// Get API key: environment first, then keyring/file
pub fn get_api_key() -> Result<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        let key = key.trim();
        if !key.is_empty() {
            return Ok(key.to_string());
        }
    }
    keyring::get_api_key()
}

/// Delete API key from secure keyring
pub fn delete_api_key() -> Result<()> {
    keyring::delete_api_key()
}

/// Check whether a key is available from any source
pub fn has_api_key() -> bool {
    std::env::var(API_KEY_ENV).map(|k| !k.trim().is_empty()).unwrap_or(false)
        || keyring::has_api_key()
}
