use crate::api::auth::DEFAULT_AUTH_URL;
use crate::api::poller::DEFAULT_MAX_WAIT;
use crate::cli::{AuthenticateArgs, ExecuteArgs};
use crate::error::UpsqlError;
use crate::format::OutputFormat;
use directories::ProjectDirs;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PROFILE: &str = "default";

/// Settings for the execute subcommand.
#[derive(Debug)]
pub struct ExecConfig {
    pub profile: String,
    pub token: SecretString,
    /// `None` means the URL has to be discovered through `auth_url`.
    pub api_url: Option<String>,
    pub auth_url: String,
    /// Pending-result budget; `None` waits forever.
    pub timeout: Option<Duration>,
    pub output: OutputFormat,
    pub verbose: bool,
    pub show_secrets: bool,
}

/// Settings for the authenticate subcommand.
#[derive(Debug)]
pub struct AuthConfig {
    pub profile: String,
    pub email: String,
    pub password: SecretString,
    pub auth_url: String,
    /// Where the issued token gets saved.
    pub config_path: PathBuf,
    pub verbose: bool,
    pub show_secrets: bool,
}

// --- TOML config file structs ---

#[derive(Debug, Deserialize, Serialize, Default)]
struct TomlConfig {
    #[serde(default)]
    defaults: TomlDefaults,
    #[serde(default)]
    profiles: BTreeMap<String, TomlProfile>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct TomlDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verbose: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
struct TomlProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

/// Config path resolution result. Distinguishes explicit vs auto-resolved paths.
struct ResolvedConfigPath {
    path: PathBuf,
    /// true if user explicitly specified via --config or UPSQL_CONFIG
    explicit: bool,
}

/// Resolve the config file path: --config flag > env var > platform default.
fn resolve_config_path(cli_config: Option<&PathBuf>) -> Option<ResolvedConfigPath> {
    if let Some(path) = cli_config {
        return Some(ResolvedConfigPath { path: path.clone(), explicit: true });
    }
    if let Some(path) = env_non_empty("UPSQL_CONFIG") {
        return Some(ResolvedConfigPath { path: PathBuf::from(path), explicit: true });
    }
    ProjectDirs::from("", "", "upsql").map(|dirs| ResolvedConfigPath {
        path: dirs.config_dir().join("config.toml"),
        explicit: false,
    })
}

/// Load and parse the TOML config file (if it exists).
fn load_toml_config(resolved: Option<&ResolvedConfigPath>) -> Result<TomlConfig, UpsqlError> {
    let resolved = match resolved {
        Some(r) => r,
        None => return Ok(TomlConfig::default()),
    };

    if !resolved.path.exists() {
        if resolved.explicit {
            return Err(UpsqlError::Config {
                message: format!("config file not found: {}", resolved.path.display()),
            });
        }
        // Auto-resolved path missing is fine
        return Ok(TomlConfig::default());
    }

    read_toml_config(&resolved.path)
}

fn read_toml_config(path: &Path) -> Result<TomlConfig, UpsqlError> {
    let content = std::fs::read_to_string(path).map_err(|e| UpsqlError::Config {
        message: format!("cannot read config file {}: {}", path.display(), e),
    })?;

    toml::from_str(&content).map_err(|e| UpsqlError::Config {
        message: format!("invalid config file {}: {}", path.display(), e),
    })
}

/// `None` for absent or empty values.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Read an env var, treating unset and empty the same.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Resolve a token from a direct value, then env indirection, then the profile.
fn resolve_token(direct: Option<&str>, profile: &TomlProfile) -> Option<SecretString> {
    if let Some(val) = non_empty(direct) {
        return Some(SecretString::from(val.to_string()));
    }
    if let Some(key) = profile.token_env.as_deref()
        && let Some(val) = env_non_empty(key)
    {
        return Some(SecretString::from(val));
    }
    non_empty(profile.token.as_deref()).map(|t| SecretString::from(t.to_string()))
}

/// Pick the named profile. A name given explicitly must exist unless
/// `create` is set; the default profile may always be missing.
fn select_profile(
    toml_config: &TomlConfig,
    requested: Option<&str>,
    create: bool,
) -> Result<(String, TomlProfile), UpsqlError> {
    let name = non_empty(requested).unwrap_or(DEFAULT_PROFILE).to_string();
    match toml_config.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None if create || non_empty(requested).is_none() => Ok((name, TomlProfile::default())),
        None => Err(UpsqlError::Config {
            message: format!("profile '{}' not found in config file", name),
        }),
    }
}

/// Build ExecConfig from execute CLI args.
pub fn load_from_execute_args(
    args: &ExecuteArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<ExecConfig, UpsqlError> {
    let resolved_path = resolve_config_path(config_path);
    let toml_config = load_toml_config(resolved_path.as_ref())?;
    let (profile_name, profile) = select_profile(&toml_config, args.profile.as_deref(), false)?;

    let token = resolve_token(args.token.as_deref(), &profile).ok_or_else(|| UpsqlError::Config {
        message: format!(
            "no token for profile '{}'; use --token or run 'upsql authenticate'",
            profile_name
        ),
    })?;

    let api_url = non_empty(args.api_url.as_deref())
        .or(non_empty(profile.base_url.as_deref()))
        .map(|s| s.to_string());

    let auth_url = non_empty(args.auth_url.as_deref())
        .or(non_empty(toml_config.defaults.auth_url.as_deref()))
        .unwrap_or(DEFAULT_AUTH_URL)
        .to_string();

    // timeout: CLI/ENV > TOML > poller default, where 0 disables the budget
    let timeout_secs = args
        .timeout
        .unwrap_or_else(|| toml_config.defaults.timeout.unwrap_or(DEFAULT_MAX_WAIT.as_secs()));
    let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

    // output: CLI/ENV > profile > TOML > json
    let output = match non_empty(args.output.as_deref())
        .or(non_empty(profile.output.as_deref()))
        .or(non_empty(toml_config.defaults.output.as_deref()))
    {
        Some(name) => name.parse()?,
        None => OutputFormat::Json,
    };

    // verbose: CLI/ENV OR TOML default
    let verbose = verbose || toml_config.defaults.verbose.unwrap_or(false);

    Ok(ExecConfig {
        profile: profile_name,
        token,
        api_url,
        auth_url,
        timeout,
        output,
        verbose,
        show_secrets,
    })
}

/// Build AuthConfig from authenticate CLI args.
pub fn load_from_authenticate_args(
    args: &AuthenticateArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<AuthConfig, UpsqlError> {
    let resolved_path = resolve_config_path(config_path).ok_or_else(|| UpsqlError::Config {
        message: "cannot determine a config directory; use --config".to_string(),
    })?;
    let toml_config = if resolved_path.path.exists() {
        read_toml_config(&resolved_path.path)?
    } else {
        TomlConfig::default()
    };
    let (profile_name, _) = select_profile(&toml_config, args.profile.as_deref(), true)?;

    let email = non_empty(Some(args.email.trim()))
        .ok_or_else(|| UpsqlError::Config {
            message: "no email specified".to_string(),
        })?
        .to_string();
    let password = non_empty(Some(args.password.as_str()))
        .map(|p| SecretString::from(p.to_string()))
        .ok_or_else(|| UpsqlError::Config {
            message: "no password specified".to_string(),
        })?;

    let auth_url = non_empty(args.auth_url.as_deref())
        .or(non_empty(toml_config.defaults.auth_url.as_deref()))
        .unwrap_or(DEFAULT_AUTH_URL)
        .to_string();

    let verbose = verbose || toml_config.defaults.verbose.unwrap_or(false);

    Ok(AuthConfig {
        profile: profile_name,
        email,
        password,
        auth_url,
        config_path: resolved_path.path,
        verbose,
        show_secrets,
    })
}

/// Store a token and base URL in `[profiles.<name>]`, keeping every other
/// profile and the defaults. Creates the file and its directory if needed.
pub fn save_profile(
    path: &Path,
    profile_name: &str,
    token: &SecretString,
    base_url: &str,
) -> Result<(), UpsqlError> {
    let mut toml_config = if path.exists() {
        read_toml_config(path)?
    } else {
        TomlConfig::default()
    };

    let profile = toml_config.profiles.entry(profile_name.to_string()).or_default();
    profile.token = Some(token.expose_secret().to_string());
    profile.token_env = None;
    profile.base_url = Some(base_url.to_string());

    let content = toml::to_string_pretty(&toml_config).map_err(|e| UpsqlError::Config {
        message: format!("cannot serialize config: {}", e),
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    write_private(path, &content)?;
    Ok(())
}

/// The file holds API tokens, so only the owner may read it.
#[cfg(unix)]
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies to newly created files.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(content.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(path, content)
}
