//! Configuration layer: typed settings assembled from layered sources (files → env → CLI).

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const BASE_CONFIG_PATH: &str = "config/default";
const SITE_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
pub(crate) const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.light";
const DEFAULT_NEWSLETTER_TIMEOUT_SECS: u64 = 10;

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina site server")]
pub struct CliArgs {
    /// Path to an additional configuration file, loaded on top of the defaults.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the Vetrina HTTP server.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Host the listener binds to.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Port the listener binds to.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// How long in-flight connections may drain on shutdown.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Base log level: trace, debug, info, warn, or error.
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines instead of the compact format.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Syntect theme used for code styling.
    #[arg(long = "render-theme", value_name = "NAME")]
    pub render_theme: Option<String>,

    /// List-service subscribe endpoint.
    #[arg(long = "newsletter-subscribe-url", value_name = "URL")]
    pub newsletter_subscribe_url: Option<String>,

    /// List-service request timeout.
    #[arg(long = "newsletter-timeout-seconds", value_name = "SECONDS")]
    pub newsletter_timeout_seconds: Option<u64>,

    /// Whether decoded list-service messages may carry markup.
    #[arg(
        long = "newsletter-trust-remote-markup",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub newsletter_trust_remote_markup: Option<bool>,

    /// Canonical base URL used in page metadata.
    #[arg(long = "site-base-url", value_name = "URL")]
    pub site_base_url: Option<String>,
}

/// Validated deployment settings, produced once all sources have been merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub render: RenderSettings,
    pub newsletter: NewsletterSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub theme: String,
}

#[derive(Debug, Clone)]
pub struct NewsletterSettings {
    /// Mailchimp-style subscribe endpoint; signup is disabled when absent.
    pub subscribe_url: Option<Url>,
    pub timeout: Duration,
    /// When false, decoded list-service messages are scrubbed before display.
    pub trust_remote_markup: bool,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub base_url: Option<Url>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("configuration sources did not compose: {0}")]
    Build(#[from] config::ConfigError),
    #[error("bad value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings, later sources overriding earlier ones (files → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut sources = Config::builder()
        .add_source(File::with_name(BASE_CONFIG_PATH).required(false))
        .add_source(File::with_name(SITE_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        sources = sources.add_source(File::from(path.as_path()).required(true));
    }

    sources = sources.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = sources.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    render: RawRenderSettings,
    newsletter: RawNewsletterSettings,
    site: RawSiteSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        let ServeOverrides {
            server_host,
            server_port,
            server_graceful_shutdown_seconds,
            log_level,
            log_json,
            render_theme,
            newsletter_subscribe_url,
            newsletter_timeout_seconds,
            newsletter_trust_remote_markup,
            site_base_url,
        } = overrides;

        override_field(&mut self.server.host, server_host);
        override_field(&mut self.server.port, server_port);
        override_field(
            &mut self.server.graceful_shutdown_seconds,
            server_graceful_shutdown_seconds,
        );
        override_field(&mut self.logging.level, log_level);
        override_field(&mut self.logging.json, log_json);
        override_field(&mut self.render.theme, render_theme);
        override_field(&mut self.newsletter.subscribe_url, newsletter_subscribe_url);
        override_field(
            &mut self.newsletter.timeout_seconds,
            newsletter_timeout_seconds,
        );
        override_field(
            &mut self.newsletter.trust_remote_markup,
            newsletter_trust_remote_markup,
        );
        override_field(&mut self.site.base_url, site_base_url);
    }
}

fn override_field<T: Clone>(slot: &mut Option<T>, flag: &Option<T>) {
    if let Some(value) = flag {
        *slot = Some(value.clone());
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        Ok(Self {
            server: resolve_server(raw.server)?,
            logging: resolve_logging(raw.logging)?,
            render: resolve_render(raw.render)?,
            newsletter: resolve_newsletter(raw.newsletter)?,
            site: resolve_site(raw.site)?,
        })
    }
}

fn resolve_server(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid("server.port", "cannot be zero"));
    }

    let addr =
        listener_addr(&host, port).map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "cannot be zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn resolve_logging(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str())
            .map_err(|err| LoadError::invalid("logging.level", format!("not a level: {err}")))?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn resolve_render(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let theme = render
        .theme
        .unwrap_or_else(|| DEFAULT_SYNTAX_THEME.to_string());
    if theme.trim().is_empty() {
        return Err(LoadError::invalid(
            "render.theme",
            "theme name must not be empty",
        ));
    }

    Ok(RenderSettings { theme })
}

fn resolve_newsletter(newsletter: RawNewsletterSettings) -> Result<NewsletterSettings, LoadError> {
    let subscribe_url = parse_optional_url(newsletter.subscribe_url, "newsletter.subscribe_url")?;

    let timeout_secs = newsletter
        .timeout_seconds
        .unwrap_or(DEFAULT_NEWSLETTER_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "newsletter.timeout_seconds",
            "cannot be zero",
        ));
    }

    Ok(NewsletterSettings {
        subscribe_url,
        timeout: Duration::from_secs(timeout_secs),
        trust_remote_markup: newsletter.trust_remote_markup.unwrap_or(true),
    })
}

fn resolve_site(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    Ok(SiteSettings {
        base_url: parse_optional_url(site.base_url, "site.base_url")?,
    })
}

/// Blank strings count as unset so an empty env var does not break startup.
fn parse_optional_url(raw: Option<String>, key: &'static str) -> Result<Option<Url>, LoadError> {
    raw.as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(|trimmed| {
            Url::parse(trimmed).map_err(|err| LoadError::invalid(key, format!("not a URL: {err}")))
        })
        .transpose()
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    theme: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawNewsletterSettings {
    subscribe_url: Option<String>,
    timeout_seconds: Option<u64>,
    trust_remote_markup: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    base_url: Option<String>,
}

fn listener_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("`{candidate}` is not a socket address: {err}"))
}

/// Parse the command line and resolve settings against it in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
