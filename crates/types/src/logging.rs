// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Helper functions for logging

use std::{str::FromStr, sync::Once};

use tracing_subscriber::EnvFilter;

/// A `Once` instance to ensure that logging is only initialized once.
static LOGGING_INITIALIZED: Once = Once::new();

/// Filter used when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info";

/// Output format of the log subscriber, selected with `RUST_LOG_FORMAT`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, one line per event
    #[default]
    Full,
    /// Human readable, without span context
    Compact,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

impl LogFormat {
    /// The format requested by `RUST_LOG_FORMAT`, falling back to [`LogFormat::Full`]
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("RUST_LOG_FORMAT")
            .ok()
            .and_then(|format| format.parse().ok())
            .unwrap_or_default()
    }
}

/// Install a global `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call has an effect, and an already installed
/// subscriber is left in place.
pub fn setup_logging() {
    LOGGING_INITIALIZED.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let _ = match LogFormat::from_env() {
            LogFormat::Full => builder.try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
    });
}
