#![forbid(unsafe_code)]

use std::net::IpAddr;
use std::time::Duration;

pub(crate) const DEFAULT_HOST: &str = "0.0.0.0";
pub(crate) const DEFAULT_PORT: u16 = 3000;
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("an auth token is required (--auth-token or JOBGATE_AUTH_TOKEN)")]
    MissingAuthToken,
    #[error("{flag} expects a value")]
    MissingValue { flag: String },
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Transport {
    Stdio,
    Http,
}

impl Transport {
    fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdio" => Some(Self::Stdio),
            "http" => Some(Self::Http),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq)]
pub(crate) struct Settings {
    pub(crate) auth_token: String,
    pub(crate) transport: Transport,
    pub(crate) host: IpAddr,
    pub(crate) port: u16,
    pub(crate) results_base_url: String,
    pub(crate) simulate: Option<Duration>,
    pub(crate) log_level: String,
    pub(crate) log_format: LogFormat,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("auth_token", &"<redacted>")
            .field("transport", &self.transport)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("results_base_url", &self.results_base_url)
            .field("simulate", &self.simulate)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Command-line values collected before environment fallback.
#[derive(Default)]
struct CliValues {
    auth_token: Option<String>,
    transport: Option<String>,
    host: Option<String>,
    port: Option<String>,
    results_base_url: Option<String>,
    simulate_ms: Option<String>,
    log_level: Option<String>,
    log_format: Option<String>,
}

impl CliValues {
    fn parse<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut out = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            // Accept both `--flag value` and `--flag=value`.
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg, None),
            };
            let slot = match flag.as_str() {
                "--auth-token" => &mut out.auth_token,
                "--transport" => &mut out.transport,
                "--host" => &mut out.host,
                "--port" => &mut out.port,
                "--results-base-url" => &mut out.results_base_url,
                "--simulate-ms" => &mut out.simulate_ms,
                "--log-level" => &mut out.log_level,
                "--log-format" => &mut out.log_format,
                _ => return Err(ConfigError::UnknownArgument(flag)),
            };
            let value = match inline {
                Some(value) => value,
                None => args
                    .next()
                    .ok_or_else(|| ConfigError::MissingValue { flag: flag.clone() })?,
            };
            *slot = Some(value);
        }
        Ok(out)
    }
}

impl Settings {
    /// Reads the process arguments and `JOBGATE_*` environment.
    pub(crate) fn load() -> Result<Self, ConfigError> {
        Self::from_sources(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Resolves every setting from the command line first, then the environment.
    pub(crate) fn from_sources<I, E>(args: I, env: E) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let cli = CliValues::parse(args)?;
        let pick = |cli: Option<String>, key: &str| {
            cli.or_else(|| env(key)).filter(|v| !v.trim().is_empty())
        };

        let auth_token = pick(cli.auth_token, "JOBGATE_AUTH_TOKEN")
            .ok_or(ConfigError::MissingAuthToken)?;

        let transport = match pick(cli.transport, "JOBGATE_TRANSPORT") {
            None => Transport::Stdio,
            Some(raw) => Transport::from_str(&raw).ok_or(ConfigError::InvalidValue {
                key: "transport",
                value: raw,
                reason: "expected stdio or http",
            })?,
        };

        let host = pick(cli.host, "JOBGATE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host.trim().parse::<IpAddr>().map_err(|_| ConfigError::InvalidValue {
            key: "host",
            value: host.clone(),
            reason: "expected an IP address",
        })?;

        let port = match pick(cli.port, "JOBGATE_PORT") {
            None => DEFAULT_PORT,
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port >= 1 => port,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "port",
                        value: raw,
                        reason: "expected an integer between 1 and 65535",
                    });
                }
            },
        };

        let results_base_url = pick(cli.results_base_url, "JOBGATE_RESULTS_BASE_URL")
            .unwrap_or_else(|| jg_storage::DEFAULT_RESULTS_BASE_URL.to_string());

        let simulate = match pick(cli.simulate_ms, "JOBGATE_SIMULATE_MS") {
            None => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        key: "simulate-ms",
                        value: raw,
                        reason: "expected milliseconds",
                    });
                }
            },
        };

        let log_level = pick(cli.log_level, "JOBGATE_LOG_LEVEL")
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let log_format = match pick(cli.log_format, "JOBGATE_LOG_FORMAT") {
            None => LogFormat::Json,
            Some(raw) => LogFormat::from_str(&raw).ok_or(ConfigError::InvalidValue {
                key: "log-format",
                value: raw,
                reason: "expected json or text",
            })?,
        };

        Ok(Self {
            auth_token,
            transport,
            host,
            port,
            results_base_url,
            simulate,
            log_level,
            log_format,
        })
    }
}
