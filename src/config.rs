//! Environment variable based runtime configuration.
//!
//! Two knobs exist, both optional:
//!
//! - `TALLY_STACK_SIZE`: stack size in bytes for handler coroutines, decimal
//!   (`65536`) or hex (`0x10000`). Default 64 KiB; template rendering needs
//!   more headroom than a bare JSON handler, so don't go below 32 KiB.
//! - `TALLY_SESSION_SECRET`: overrides the per-process random cookie signing
//!   secret. Without it every restart invalidates outstanding sessions, which
//!   is the intended behavior for a party tally; set it when running tests or
//!   several instances behind one hostname.

use std::env;

const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
///
/// Load once at startup with [`RuntimeConfig::from_env()`] before the
/// coroutine runtime is configured.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Stack size for handler coroutines in bytes (default: 64 KiB / 0x10000)
    pub stack_size: usize,
    /// Session cookie signing secret; `None` means generate per process
    pub session_secret: Option<String>,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let stack_size = match env::var("TALLY_STACK_SIZE") {
            Ok(val) => parse_stack_size(&val).unwrap_or(DEFAULT_STACK_SIZE),
            Err(_) => DEFAULT_STACK_SIZE,
        };
        let session_secret = env::var("TALLY_SESSION_SECRET")
            .ok()
            .filter(|s| !s.is_empty());
        RuntimeConfig {
            stack_size,
            session_secret,
        }
    }
}

fn parse_stack_size(val: &str) -> Option<usize> {
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
