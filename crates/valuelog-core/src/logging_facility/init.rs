//! Logging initialization.
//!
//! One entry point, [`init`], installs the global subscriber for the chosen
//! [`Profile`]. `RUST_LOG` overrides the profile's default filter.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Default filter of the development profile.
pub const DEV_FILTER: &str = "valuelog=debug,valuelog_core=debug";
/// Default filter of the production profile.
pub const PROD_FILTER: &str = "valuelog=info,valuelog_core=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines, debug and above.
    Development,
    /// JSON lines, info and above.
    Production,
    /// Bare registry; tests install their own layer via
    /// [`init_test_capture`](super::init_test_capture).
    Test,
}

impl Profile {
    pub fn default_filter(&self) -> &'static str {
        match self {
            Profile::Development => DEV_FILTER,
            Profile::Production => PROD_FILTER,
            Profile::Test => "",
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" | "development" => Ok(Profile::Development),
            "prod" | "production" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!("unknown log profile '{}'", other)),
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops, and so is the
/// first one if another subscriber is already installed.
///
/// ```
/// use valuelog_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = || {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(profile.default_filter()))
        };
        // a subscriber installed elsewhere (e.g. by a host application) wins
        let _ = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter())
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(filter())
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
    });
}
