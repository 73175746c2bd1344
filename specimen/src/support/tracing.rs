//! Opt-in stderr logging for generation calls
//!
//! Nothing is installed unless a call is verbose or `SPECIMEN_LOG` names a level, so a host that
//! runs its own subscriber keeps it. The level lives in an atomic and can change after install.

use std::sync::OnceLock;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use strum::Display;
use strum::EnumString;
use strum::FromRepr;
use tracing::Level;
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::constants::LOG_ENV_VAR;

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(TracingLevel::Warn as u8);

/// Outcome of the one install attempt; `false` when the host already had a subscriber
static STDERR_INSTALLED: OnceLock<bool> = OnceLock::new();

/// Passes this crate's events at or above the current level
#[derive(Clone)]
pub struct CrateLevelFilter;

impl<S> Layer<S> for CrateLevelFilter
where
    S: Subscriber,
{
    fn enabled(
        &self,
        metadata: &tracing::Metadata<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) -> bool {
        metadata.target().starts_with("specimen")
            && TracingLevel::from(*metadata.level()) <= TracingLevel::current()
    }
}

/// Log levels, least verbose first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, FromRepr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum TracingLevel {
    /// Failures only
    Error,
    /// Suppressed failures and lenient unused selectors
    Warn,
    /// Node tree dumps of verbose calls
    Info,
    /// Recursion points, retries and seed choice
    Debug,
    /// Everything
    Trace,
}

impl From<Level> for TracingLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Info,
            Level::DEBUG => Self::Debug,
            Level::TRACE => Self::Trace,
        }
    }
}

impl TracingLevel {
    /// Level named by `SPECIMEN_LOG`, if it is set and valid
    pub fn from_env() -> Option<Self> {
        std::env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
    }

    /// Change the level seen by [`CrateLevelFilter`]
    pub fn set_tracing_level(level: Self) { CURRENT_LEVEL.store(level as u8, Ordering::Relaxed); }

    /// The level [`CrateLevelFilter`] currently lets through
    pub fn current() -> Self {
        Self::from_repr(CURRENT_LEVEL.load(Ordering::Relaxed)).unwrap_or(Self::Warn)
    }
}

/// Level a call asks for: the environment's, raised to `info` for verbose calls
fn requested_level(from_env: Option<TracingLevel>, verbose: bool) -> Option<TracingLevel> {
    match (from_env, verbose) {
        (Some(level), true) => Some(level.max(TracingLevel::Info)),
        (Some(level), false) => Some(level),
        (None, true) => Some(TracingLevel::Info),
        (None, false) => None,
    }
}

/// Install the stderr subscriber the first time a call asks for output
///
/// Later calls only raise the level. Returns whether this crate's subscriber is the global one.
pub fn ensure_stderr_tracing(verbose: bool) -> bool {
    let Some(level) = requested_level(TracingLevel::from_env(), verbose) else {
        return is_stderr_tracing_installed();
    };
    if level > TracingLevel::current() {
        TracingLevel::set_tracing_level(level);
    }
    *STDERR_INSTALLED.get_or_init(|| {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true);
        Registry::default()
            .with(CrateLevelFilter)
            .with(stderr_layer)
            .try_init()
            .is_ok()
    })
}

/// Whether [`ensure_stderr_tracing`] installed the global subscriber
pub fn is_stderr_tracing_installed() -> bool { STDERR_INSTALLED.get().copied().unwrap_or(false) }
