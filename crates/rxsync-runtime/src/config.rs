//! Runtime configuration.
//!
//! Every knob has a default suitable for interactive use; [`RuntimeConfig::from_env`]
//! lets tests and demos override them without code changes:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `RXSYNC_RENDER_MODE` | `client` (default) or `server` |
//! | `RXSYNC_MAX_RENDER_PASSES` | Upper bound on passes per flush |
//! | `RXSYNC_TEARING_CHECK` | `0`/`false` disables the post-commit snapshot check |

/// Where components are being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Interactive rendering: stores are subscribed and effects run.
    #[default]
    Client,
    /// One-shot rendering: server snapshots are read, nothing is subscribed
    /// and no effect runs.
    Server,
}

impl RenderMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "client" => Some(Self::Client),
            "server" | "ssr" => Some(Self::Server),
            _ => None,
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Client or server rendering.
    pub mode: RenderMode,
    /// Maximum render passes in one flush before reporting a render loop.
    pub max_render_passes: usize,
    /// Re-check every store snapshot after commit and re-render components
    /// whose rendered snapshot went stale.
    pub check_tearing: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Client,
            max_render_passes: 50,
            check_tearing: true,
        }
    }
}

impl RuntimeConfig {
    /// Config for server rendering.
    pub fn server() -> Self {
        Self {
            mode: RenderMode::Server,
            ..Default::default()
        }
    }

    /// Set the render mode.
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the render-pass bound (at least 1).
    pub fn with_max_render_passes(mut self, passes: usize) -> Self {
        self.max_render_passes = passes.max(1);
        self
    }

    /// Enable or disable the post-commit tearing check.
    pub fn with_tearing_check(mut self, enabled: bool) -> Self {
        self.check_tearing = enabled;
        self
    }

    /// Defaults overridden by `RXSYNC_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(mode) = get_env("RXSYNC_RENDER_MODE").as_deref().and_then(RenderMode::parse) {
            config.mode = mode;
        }
        if let Some(passes) = get_env("RXSYNC_MAX_RENDER_PASSES").and_then(|v| v.trim().parse().ok()) {
            config = config.with_max_render_passes(passes);
        }
        if let Some(flag) = get_env("RXSYNC_TEARING_CHECK") {
            config.check_tearing = env_flag(&flag);
        }
        config
    }
}

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.mode, RenderMode::Client);
        assert_eq!(config.max_render_passes, 50);
        assert!(config.check_tearing);
    }

    #[test]
    fn env_overrides() {
        let config = RuntimeConfig::from_env_with(lookup(&[
            ("RXSYNC_RENDER_MODE", "Server"),
            ("RXSYNC_MAX_RENDER_PASSES", " 7 "),
            ("RXSYNC_TEARING_CHECK", "off"),
        ]));
        assert_eq!(config.mode, RenderMode::Server);
        assert_eq!(config.max_render_passes, 7);
        assert!(!config.check_tearing);
    }

    #[test]
    fn unparseable_env_keeps_defaults() {
        let config = RuntimeConfig::from_env_with(lookup(&[
            ("RXSYNC_RENDER_MODE", "hybrid"),
            ("RXSYNC_MAX_RENDER_PASSES", "lots"),
        ]));
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn zero_passes_clamped() {
        assert_eq!(RuntimeConfig::default().with_max_render_passes(0).max_render_passes, 1);
    }

    #[test]
    fn server_preset() {
        let config = RuntimeConfig::server().with_tearing_check(false);
        assert_eq!(config.mode, RenderMode::Server);
        assert!(!config.check_tearing);
    }
}
