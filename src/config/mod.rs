/// Configuration system for fraudwatch.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::FraudwatchConfig::default()`]
/// 2. **User global config**: `~/.fraudwatch/config.toml`
/// 3. **Project local config**: `.fraudwatch.toml` in the current working directory
/// 4. **Environment variables**: `FRAUDWATCH_*` overrides (highest precedence)
///
/// Later layers override earlier ones key by key. Keys no layer sets fall
/// back to built-in defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use fraudwatch::config;
///
/// let cfg = config::load();
/// let client = HttpClient::from_config(&cfg.api);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::{ApiConfig, DashboardConfig, FraudwatchConfig, LoggingConfig, SessionConfig};

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> FraudwatchConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_file(path) {
            merge_value(&mut merged, layer);
        }
    }

    let mut config = merged
        .try_into::<FraudwatchConfig>()
        .unwrap_or_default();

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    // A layer that would not deserialize on its own is dropped whole.
    value.clone().try_into::<FraudwatchConfig>().ok()?;
    Some(value)
}

/// Merge one layer into the accumulated tables, key by key.
///
/// Tables merge recursively; any other value in the overlay replaces the
/// base value outright (arrays included).
fn merge_value(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.fraudwatch/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".fraudwatch").join("config.toml"))
}

/// Path to the project local config: `.fraudwatch.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".fraudwatch.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `FRAUDWATCH_API_URL`: backend base URL
/// - `FRAUDWATCH_API_TIMEOUT_MS`: request timeout
/// - `FRAUDWATCH_MERCHANT`: merchant shown before detection
/// - `FRAUDWATCH_SESSION_PATH`: session file location
/// - `FRAUDWATCH_LOGGING`: activity log on/off (`1`/`true`/`yes`/`on`)
/// - `FRAUDWATCH_LOG_PATH`: activity log location
fn apply_env_overrides(config: &mut FraudwatchConfig) {
    if let Ok(val) = std::env::var("FRAUDWATCH_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("FRAUDWATCH_API_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("FRAUDWATCH_MERCHANT")
        && !val.is_empty()
    {
        config.dashboard.default_merchant = val;
    }
    if let Ok(val) = std::env::var("FRAUDWATCH_SESSION_PATH")
        && !val.is_empty()
    {
        config.session.path = val;
    }
    if let Ok(val) = std::env::var("FRAUDWATCH_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("FRAUDWATCH_LOG_PATH")
        && !val.is_empty()
    {
        config.logging.path = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.fraudwatch/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.fraudwatch/ directory")?;
    }

    fs::write(&path, FraudwatchConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `api.base_url`. When no global file exists yet
/// the defaults are written out first.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&FraudwatchConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&source).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject edits that would no longer deserialize (e.g. an unknown fraud type).
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config")?;
    let _: FraudwatchConfig = toml::from_str(&rendered)
        .with_context(|| format!("'{value}' is not a valid value for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, rendered).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("empty config key");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Array(_)) => toml::Value::Array(
            raw_value
                .split(',')
                .map(|s| toml::Value::String(s.trim().to_string()))
                .collect(),
        ),
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
