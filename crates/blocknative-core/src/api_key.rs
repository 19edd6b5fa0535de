//! API-key resolution.
//!
//! An explicit key always wins. An empty key falls back to the
//! `BLOCKNATIVE_DAPP_ID` environment variable, and to the empty string when
//! that is unset too. An empty key is not an error here: the service rejects
//! it at handshake time.

/// Environment variable holding the default API key.
pub const API_KEY_ENV: &str = "BLOCKNATIVE_DAPP_ID";

/// Read-only access to environment variables.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<F> Environment for F
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Resolve the API key to put in a header.
pub fn resolve_api_key(explicit: &str, env: &impl Environment) -> String {
    if !explicit.is_empty() {
        return explicit.to_string();
    }
    env.var(API_KEY_ENV).unwrap_or_default()
}
