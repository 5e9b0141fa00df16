use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Base name of the config file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "bns";
/// Prefix of environment overrides, e.g. `BNS__NOTIFICATIONS__CAPACITY=20`.
pub const ENV_PREFIX: &str = "BNS";

#[bns_derive::bns_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a config file overlaid with `BNS__`-prefixed environment variables.
///
/// 1. **File**: an explicit `path` must exist. Without one, `bns.{toml,json,yaml,...}` in
///    the working directory is used when present and silently skipped otherwise.
/// 2. **Environment**: `BNS__SECTION__KEY` overrides `section.key`
///    (e.g. `BNS__STORAGE__DATA_DIR=/var/lib/bns`).
///
/// Missing keys fall back to `T`'s serde defaults.
///
/// # Errors
/// An explicit file that is missing or unparsable, or values that do not fit `T`.
///
/// # Example
/// ```rust
/// use bns_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// #[serde(default)]
/// struct Settings {
///     capacity: usize,
/// }
///
/// let cfg: Settings = load_config(Some("config/missing")).unwrap_or_default();
/// assert_eq!(cfg.capacity, 0);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (file, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(file.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    if required {
        info!(path = %file.display(), "Loading config");
    } else {
        debug!(path = %file.display(), "Loading optional config");
    }

    let config = builder
        .build()
        .context(format!("Failed to build config from {}", file.display()))?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
