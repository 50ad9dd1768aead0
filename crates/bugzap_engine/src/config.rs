use std::time::Duration;

use serde::Deserialize;

use crate::payload::FieldAliases;
use crate::ProbeError;

pub const ENV_API_URL: &str = "BUGZAP_API_URL";
pub const ENV_API_BASE_URL: &str = "BUGZAP_API_BASE_URL";
pub const ENV_CRASH_PATH: &str = "BUGZAP_CRASH_PATH";

pub const FEEDBACK_PATH: &str = "/api/feedback";

const ROUTE_STEMS: [&str; 8] = [
    "/analyze-crash",
    "/crash/analyze-crash",
    "/crash/analyze",
    "/analyze_log",
    "/crash/analyze-log",
    "/crash/analyze_log",
    "/analyze_crash",
    "/crashlog/analyze",
];

/// Built-in probe order: bare stems, then the same stems under `/api`, each
/// followed by its trailing-slash variant.
pub fn builtin_routes() -> Vec<String> {
    ["", "/api"]
        .iter()
        .flat_map(|prefix| ROUTE_STEMS.iter().map(move |stem| format!("{prefix}{stem}")))
        .flat_map(|route| [route.clone(), format!("{route}/")])
        .collect()
}

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_body_bytes: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_body_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    Builtin,
    ConfigFile,
    Override,
}

/// Ordered candidate paths; the first accepted one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRegistry {
    routes: Vec<String>,
    source: RouteSource,
}

impl RouteRegistry {
    pub fn builtin() -> Self {
        Self {
            routes: builtin_routes(),
            source: RouteSource::Builtin,
        }
    }

    pub fn configured(routes: Vec<String>) -> Self {
        Self {
            routes,
            source: RouteSource::ConfigFile,
        }
    }

    pub fn single(path: impl Into<String>) -> Self {
        Self {
            routes: vec![path.into()],
            source: RouteSource::Override,
        }
    }

    pub fn routes(&self) -> &[String] {
        &self.routes
    }

    pub fn source(&self) -> RouteSource {
        self.source
    }
}

/// Shape of the optional `bugzap.ron` file. Every field may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_base_url: Option<String>,
    pub crash_path: Option<String>,
    pub routes: Option<Vec<String>>,
    pub file_fields: Option<Vec<String>>,
    pub engine_fields: Option<Vec<String>>,
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

/// Everything the prober and the feedback client read at process start.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub base_url: Option<String>,
    pub registry: RouteRegistry,
    pub aliases: FieldAliases,
    pub settings: ProbeSettings,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            registry: RouteRegistry::builtin(),
            aliases: FieldAliases::default(),
            settings: ProbeSettings::default(),
        }
    }
}

impl ProbeConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Layers the file config under environment overrides.
    ///
    /// `env` is a lookup so callers can pass `std::env::var` or a fixture.
    pub fn from_sources<F>(file: FileConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = non_empty(env(ENV_API_URL))
            .or_else(|| non_empty(env(ENV_API_BASE_URL)))
            .or_else(|| non_empty(file.api_base_url));

        let override_path = normalize_override_path(env(ENV_CRASH_PATH).as_deref())
            .or_else(|| normalize_override_path(file.crash_path.as_deref()));

        let registry = match (override_path, file.routes) {
            (Some(path), _) => RouteRegistry::single(path),
            (None, Some(routes)) => RouteRegistry::configured(routes),
            (None, None) => RouteRegistry::builtin(),
        };

        let defaults = FieldAliases::default();
        let aliases = FieldAliases {
            file: file.file_fields.filter(|f| !f.is_empty()).unwrap_or(defaults.file),
            engine: file
                .engine_fields
                .filter(|f| !f.is_empty())
                .unwrap_or(defaults.engine),
        };

        let mut settings = ProbeSettings::default();
        if let Some(secs) = file.request_timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.connect_timeout_secs {
            settings.connect_timeout = Duration::from_secs(secs);
        }

        Self {
            base_url,
            registry,
            aliases,
            settings,
        }
    }

    /// The base URL with one trailing slash removed, validated as http(s).
    pub fn resolved_base(&self) -> Result<String, ProbeError> {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or(ProbeError::MissingBaseUrl)?;

        let parsed = url::Url::parse(raw).map_err(|err| ProbeError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProbeError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(raw.strip_suffix('/').unwrap_or(raw).to_string())
    }
}

/// Empty and `/` mean "no override"; a missing leading slash is added.
pub fn normalize_override_path(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return None;
    }
    if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{trimmed}"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
