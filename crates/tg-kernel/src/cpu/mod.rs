pub mod reference;
pub mod tiled;

pub use reference::ReferenceBackend;
pub use tiled::TiledCpuBackend;

use std::env;
use std::num::NonZeroUsize;
use std::thread;

/// Environment variable overriding [`DispatchConfig::num_threads`].
pub const THREADS_ENV: &str = "TILEGEMM_THREADS";
/// Environment variable enabling [`DispatchConfig::allow_fallback`] when set
/// to `1` or `true`.
pub const FALLBACK_ENV: &str = "TILEGEMM_FALLBACK";

/// Host-side settings of the CPU grid dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Maximum OS threads used for one dispatch. Work-group rows are spread
    /// across them; fewer are used when the grid has fewer rows.
    pub num_threads: usize,
    /// Compute shapes that are not a tile multiple with the reference
    /// backend instead of failing.
    pub allow_fallback: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            num_threads: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            allow_fallback: false,
        }
    }
}

impl DispatchConfig {
    /// Everything on the calling thread.
    pub fn single_threaded() -> Self {
        DispatchConfig {
            num_threads: 1,
            ..Self::default()
        }
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads.max(1);
        self
    }

    pub fn with_fallback(mut self, allow_fallback: bool) -> Self {
        self.allow_fallback = allow_fallback;
        self
    }

    /// Defaults, overridden by `TILEGEMM_THREADS` and `TILEGEMM_FALLBACK`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let threads = env::var(THREADS_ENV).ok();
        let fallback = env::var(FALLBACK_ENV).ok();
        Self::default().apply_env(threads.as_deref(), fallback.as_deref())
    }

    /// Apply raw `TILEGEMM_THREADS` / `TILEGEMM_FALLBACK` values on top of
    /// `self`. `None` leaves a field unchanged, as does a value that does not
    /// parse.
    pub fn apply_env(mut self, threads: Option<&str>, fallback: Option<&str>) -> Self {
        if let Some(raw) = threads {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.num_threads = n,
                _ => log::warn!("ignoring {THREADS_ENV}={raw:?}: expected a positive integer"),
            }
        }
        if let Some(raw) = fallback {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.allow_fallback = true,
                "0" | "false" | "no" => self.allow_fallback = false,
                _ => log::warn!("ignoring {FALLBACK_ENV}={raw:?}: expected a boolean"),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_threads() {
        let c = DispatchConfig::default();
        assert!(c.num_threads >= 1);
        assert!(!c.allow_fallback);
    }

    #[test]
    fn test_builders() {
        let c = DispatchConfig::single_threaded().with_fallback(true);
        assert_eq!(c.num_threads, 1);
        assert!(c.allow_fallback);
        assert_eq!(DispatchConfig::default().with_threads(0).num_threads, 1);
    }

    #[test]
    fn test_env_threads() {
        let base = DispatchConfig::single_threaded();
        assert_eq!(base.clone().apply_env(Some("6"), None).num_threads, 6);
        assert_eq!(base.clone().apply_env(Some(" 3 "), None).num_threads, 3);
        assert_eq!(base.clone().apply_env(Some("0"), None).num_threads, 1);
        assert_eq!(base.clone().apply_env(Some("abc"), None).num_threads, 1);
        assert_eq!(base.clone().apply_env(Some("-2"), None).num_threads, 1);
        assert_eq!(base.apply_env(None, None), DispatchConfig::single_threaded());
    }

    #[test]
    fn test_env_fallback() {
        let off = DispatchConfig::single_threaded();
        let on = DispatchConfig::single_threaded().with_fallback(true);
        assert!(off.clone().apply_env(None, Some("YES")).allow_fallback);
        assert!(off.clone().apply_env(None, Some("1")).allow_fallback);
        assert!(off.clone().apply_env(None, Some("True")).allow_fallback);
        assert!(!on.clone().apply_env(None, Some("no")).allow_fallback);
        assert!(!on.clone().apply_env(None, Some("0")).allow_fallback);
        // Unrecognized values keep the current setting either way.
        assert!(on.apply_env(None, Some("maybe")).allow_fallback);
        assert!(!off.apply_env(None, Some("maybe")).allow_fallback);
    }

    #[test]
    fn test_env_both() {
        let c = DispatchConfig::single_threaded().apply_env(Some("2"), Some("true"));
        assert_eq!(c.num_threads, 2);
        assert!(c.allow_fallback);
    }
}
