use std::fmt::{Display, Formatter};
use std::time::Duration;

/// How DNS queries are resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ResolveMethod {
    /// Resolve using the OS resolver.
    #[default]
    System,
    /// Resolve using the `/etc/resolv.conf` DNS configuration.
    Resolv,
    /// Resolve using the Google `8.8.8.8` DNS service.
    Google,
    /// Resolve using the Cloudflare `1.1.1.1` DNS service.
    Cloudflare,
}

impl Display for ResolveMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Resolv => write!(f, "resolv"),
            Self::Google => write!(f, "google"),
            Self::Cloudflare => write!(f, "cloudflare"),
        }
    }
}

/// Configuration for the `DnsResolver`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    /// The method to use for DNS resolution.
    pub resolve_method: ResolveMethod,
    /// The timeout for DNS resolution.
    pub timeout: Duration,
    /// The time-to-live (TTL) for cached reverse lookup results.
    pub ttl: Duration,
}

impl Config {
    /// Create a `Config`.
    #[must_use]
    pub const fn new(resolve_method: ResolveMethod, timeout: Duration, ttl: Duration) -> Self {
        Self {
            resolve_method,
            timeout,
            ttl,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolve_method: ResolveMethod::System,
            timeout: Duration::from_millis(5000),
            ttl: Duration::from_secs(300),
        }
    }
}

/// Build a `Config`.
#[derive(Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn resolve_method(self, resolve_method: ResolveMethod) -> Self {
        Self {
            config: Config {
                resolve_method,
                ..self.config
            },
        }
    }

    #[must_use]
    pub const fn timeout(self, timeout: Duration) -> Self {
        Self {
            config: Config {
                timeout,
                ..self.config
            },
        }
    }

    #[must_use]
    pub const fn ttl(self, ttl: Duration) -> Self {
        Self {
            config: Config {
                ttl,
                ..self.config
            },
        }
    }

    #[must_use]
    pub const fn build(self) -> Config {
        self.config
    }
}
