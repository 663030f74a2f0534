//! Client configuration for connecting to Azkaban web servers.
//!
//! A YAML file of named contexts, one per server, with a current context
//! that [`ClientConfig::resolve`] falls back to:
//!
//! ```yaml
//! current-context: local
//!
//! contexts:
//!   - name: local
//!     server: http://localhost:8081
//!     username: azkaban
//!     password-env: AZKABAN_PASS
//!   - name: prod
//!     server: https://azkaban.internal:8443
//!     username: etl
//!     password-file: ~/.config/azkaban/prod.pass
//!     timeout: 60
//!
//! defaults:
//!   timeout: 30
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::{config_dir, expand_path};
use crate::{ConfigError, Result};

/// Config file name inside the config directory.
const CLIENT_CONFIG_FILE: &str = "client.yaml";

/// Environment variable holding the server endpoint.
pub const ENV_ENDPOINT: &str = "AZKABAN_ENDPOINT";

/// Environment variable holding the login user.
pub const ENV_USERNAME: &str = "AZKABAN_USER";

/// Environment variable holding the login password.
pub const ENV_PASSWORD: &str = "AZKABAN_PASS";

/// Name given to contexts built from the environment.
const ENV_CONTEXT_NAME: &str = "env";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path of the client config file: `<config dir>/client.yaml`.
pub fn client_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CLIENT_CONFIG_FILE))
}

// ─────────────────────────────────────────────────────────────────────────────
// Client Config
// ─────────────────────────────────────────────────────────────────────────────

/// Named Azkaban servers and which one to use by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Context used when none is named.
    pub current_context: Option<String>,
    /// Known servers.
    pub contexts: Vec<Context>,
    /// Settings for contexts that leave them out.
    pub defaults: ClientDefaults,
}

impl ClientConfig {
    /// Load the config file from the default location.
    ///
    /// A missing file, or no resolvable config directory, gives an empty config.
    pub fn load() -> Result<Self> {
        match client_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load a config file; a missing file gives an empty config.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::ReadFile {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        Self::from_yaml(&contents)
    }

    /// Write the config file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let write_error = |target: &Path, source| ConfigError::WriteFile {
            path: target.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }
        std::fs::write(path, self.to_yaml()?).map_err(|e| write_error(path, e))
    }

    /// Parse from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Look up a context by name.
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// The current context, if one is set and exists.
    pub fn current(&self) -> Option<&Context> {
        self.context(self.current_context.as_deref()?)
    }

    /// Add a context, replacing any with the same name.
    pub fn set_context(&mut self, context: Context) {
        match self.contexts.iter_mut().find(|c| c.name == context.name) {
            Some(existing) => *existing = context,
            None => self.contexts.push(context),
        }
    }

    /// Make a known context the current one.
    pub fn use_context(&mut self, name: &str) -> Result<()> {
        if self.context(name).is_none() {
            return Err(ConfigError::ContextNotFound(name.to_string()));
        }
        self.current_context = Some(name.to_string());
        Ok(())
    }

    /// Drop a context; clears the current context if it pointed there.
    pub fn remove_context(&mut self, name: &str) -> Option<Context> {
        let index = self.contexts.iter().position(|c| c.name == name)?;
        if self.current_context.as_deref() == Some(name) {
            self.current_context = None;
        }
        Some(self.contexts.remove(index))
    }

    /// The context to connect with: `name` if given, else the current one.
    ///
    /// The returned context has its timeout filled from the defaults.
    pub fn resolve(&self, name: Option<&str>) -> Result<Context> {
        let name = name
            .or(self.current_context.as_deref())
            .ok_or(ConfigError::NoCurrentContext)?;
        let mut context = self
            .context(name)
            .cloned()
            .ok_or_else(|| ConfigError::ContextNotFound(name.to_string()))?;
        context.timeout.get_or_insert(self.defaults.timeout);
        Ok(context)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

/// A named connection context (server + login bundle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    /// Unique name for this context.
    pub name: String,

    /// Azkaban web server URL (e.g., "https://azkaban.internal:8443").
    pub server: String,

    /// Login user name.
    #[serde(default)]
    pub username: Option<String>,

    /// Environment variable containing the password.
    #[serde(default)]
    pub password_env: Option<String>,

    /// Path to a file containing the password.
    #[serde(default)]
    pub password_file: Option<PathBuf>,

    /// Request timeout override (seconds).
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Context {
    /// Create a new context with just a name and server URL.
    pub fn new(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            username: None,
            password_env: None,
            password_file: None,
            timeout: None,
        }
    }

    /// Build a context from `AZKABAN_ENDPOINT`, `AZKABAN_USER` and
    /// `AZKABAN_PASS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a context from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let server = get(ENV_ENDPOINT).ok_or_else(|| ConfigError::MissingEnv(ENV_ENDPOINT.into()))?;
        let username =
            get(ENV_USERNAME).ok_or_else(|| ConfigError::MissingEnv(ENV_USERNAME.into()))?;
        if get(ENV_PASSWORD).is_none() {
            return Err(ConfigError::MissingEnv(ENV_PASSWORD.into()));
        }

        Ok(Self::new(ENV_CONTEXT_NAME, server)
            .with_username(username)
            .with_password_env(ENV_PASSWORD))
    }

    /// Set the login user.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Read the password from an environment variable.
    pub fn with_password_env(mut self, var: impl Into<String>) -> Self {
        self.password_env = Some(var.into());
        self
    }

    /// Read the password from a file.
    pub fn with_password_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.password_file = Some(path.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the password.
    ///
    /// Tries the password file first, then the environment variable.
    pub fn password(&self) -> Result<Option<String>> {
        if let Some(path) = &self.password_file {
            let expanded = expand_path(path);
            if expanded.exists() {
                let password = std::fs::read_to_string(&expanded)
                    .map_err(|e| ConfigError::ReadFile {
                        path: expanded.display().to_string(),
                        source: e,
                    })?
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                return Ok(Some(password));
            }
        }
        if let Some(var) = &self.password_env
            && let Ok(password) = std::env::var(var)
        {
            return Ok(Some(password));
        }
        Ok(None)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Settings applied to contexts that do not set their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientDefaults {
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SAMPLE: &str = r#"
current-context: prod

contexts:
  - name: local
    server: http://localhost:8081
    username: azkaban
    password-env: LOCAL_AZKABAN_PASS

  - name: prod
    server: https://azkaban.internal:8443
    username: etl
    password-file: ~/.config/azkaban/prod.pass
    timeout: 60

defaults:
  timeout: 15
"#;

    #[test]
    fn test_empty_yaml() {
        let config = ClientConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.defaults.timeout, 30);
        assert!(config.current().is_none());
    }

    #[test]
    fn test_parse_contexts() {
        let config = ClientConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.contexts.len(), 2);

        let local = config.context("local").unwrap();
        assert_eq!(local.server, "http://localhost:8081");
        assert_eq!(local.password_env.as_deref(), Some("LOCAL_AZKABAN_PASS"));
        assert!(local.password_file.is_none());
        assert!(local.timeout.is_none());

        let prod = config.current().unwrap();
        assert_eq!(prod.name, "prod");
        assert_eq!(
            prod.password_file.as_deref(),
            Some(Path::new("~/.config/azkaban/prod.pass"))
        );
    }

    #[test]
    fn test_resolve_fills_default_timeout() {
        let config = ClientConfig::from_yaml(SAMPLE).unwrap();

        let prod = config.resolve(None).unwrap();
        assert_eq!(prod.name, "prod");
        assert_eq!(prod.timeout, Some(60));

        let local = config.resolve(Some("local")).unwrap();
        assert_eq!(local.timeout, Some(15));
        assert_eq!(config.context("local").unwrap().timeout, None);
    }

    #[test]
    fn test_resolve_errors() {
        let config = ClientConfig::from_yaml(SAMPLE).unwrap();
        let err = config.resolve(Some("staging")).unwrap_err();
        assert!(matches!(err, ConfigError::ContextNotFound(name) if name == "staging"));

        let err = ClientConfig::default().resolve(None).unwrap_err();
        assert!(matches!(err, ConfigError::NoCurrentContext));

        // A current context naming nothing is reported by that name.
        let dangling = ClientConfig {
            current_context: Some("gone".into()),
            ..Default::default()
        };
        let err = dangling.resolve(None).unwrap_err();
        assert!(matches!(err, ConfigError::ContextNotFound(name) if name == "gone"));
    }

    #[test]
    fn test_switch_and_remove_contexts() {
        let mut config = ClientConfig::default();
        config.set_context(Context::new("local", "http://localhost:8081"));
        config.set_context(Context::new("local", "http://localhost:9091"));
        config.set_context(Context::new("prod", "https://azkaban.internal"));
        assert_eq!(config.contexts.len(), 2);
        assert_eq!(config.context("local").unwrap().server, "http://localhost:9091");

        let err = config.use_context("staging").unwrap_err();
        assert!(matches!(err, ConfigError::ContextNotFound(_)));

        config.use_context("local").unwrap();
        assert_eq!(config.resolve(None).unwrap().server, "http://localhost:9091");

        assert_eq!(config.remove_context("local").unwrap().name, "local");
        assert!(config.current_context.is_none());
        assert!(config.remove_context("local").is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.yaml");

        let mut config = ClientConfig::default();
        config.set_context(
            Context::new("local", "http://localhost:8081")
                .with_username("azkaban")
                .with_password_env("LOCAL_AZKABAN_PASS")
                .with_timeout(5),
        );
        config.use_context("local").unwrap();
        config.save_to(&path).unwrap();

        assert_eq!(ClientConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("absent.yaml")).unwrap();
        assert!(config.contexts.is_empty());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.yaml");
        std::fs::write(&path, "contexts: [unclosed").unwrap();

        let err = ClientConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseYaml(_)));
    }

    #[test]
    fn test_password_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prod.pass");
        std::fs::write(&path, "s3cret\n").unwrap();

        let context = Context::new("prod", "https://azkaban.internal").with_password_file(&path);
        assert_eq!(context.password().unwrap().as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_password_from_env() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("TEST_AZKABAN_CONFIG_PASS", "hunter2");
        }
        let context =
            Context::new("local", "http://localhost:8081").with_password_env("TEST_AZKABAN_CONFIG_PASS");
        assert_eq!(context.password().unwrap().as_deref(), Some("hunter2"));
        // SAFETY: cleanup of the variable set above
        unsafe {
            std::env::remove_var("TEST_AZKABAN_CONFIG_PASS");
        }
    }

    #[test]
    fn test_password_unset() {
        let context = Context::new("local", "http://localhost:8081")
            .with_password_env("TEST_AZKABAN_NEVER_SET");
        assert!(context.password().unwrap().is_none());
    }

    #[test]
    fn test_context_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_ENDPOINT, "http://localhost:8081"),
            (ENV_USERNAME, "azkaban"),
            (ENV_PASSWORD, "azkaban"),
        ]);
        let context = Context::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(context.server, "http://localhost:8081");
        assert_eq!(context.username.as_deref(), Some("azkaban"));
        assert_eq!(context.password_env.as_deref(), Some(ENV_PASSWORD));
    }

    #[test]
    fn test_context_from_lookup_requires_all_vars() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_ENDPOINT, "http://localhost:8081"),
            (ENV_USERNAME, ""),
        ]);
        let err = Context::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(var) if var == ENV_USERNAME));
    }
}
