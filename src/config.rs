use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";
const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
const TAVILY_KEY_VAR: &str = "TAVILY_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{section} API key not set. Add [{section}] api_key to the secrets file or set {var}")]
    MissingKey {
        section: &'static str,
        var: &'static str,
    },

    #[error("failed to read secrets file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed secrets file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// An API credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// On-disk layout of the secrets store:
///
/// ```toml
/// [openai]
/// api_key = "sk-..."
///
/// [tavily]
/// api_key = "tvly-..."
/// ```
#[derive(Deserialize, Default, Debug)]
struct SecretsFile {
    #[serde(default)]
    openai: Section,
    #[serde(default)]
    tavily: Section,
}

#[derive(Deserialize, Default, Debug)]
struct Section {
    api_key: Option<String>,
}

/// Credentials for the two upstream APIs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub openai: ApiKey,
    pub tavily: ApiKey,
}

impl Secrets {
    /// Loads the secrets file (if present) and applies `OPENAI_API_KEY` / `TAVILY_API_KEY`
    /// overrides from the environment.
    ///
    /// A missing file is only an error when `path` was given explicitly.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => read_file(p)?,
            None => {
                let default = Path::new(DEFAULT_SECRETS_FILE);
                if default.exists() {
                    read_file(default)?
                } else {
                    debug!("no secrets file, using environment only");
                    SecretsFile::default()
                }
            }
        };
        Self::resolve(file, |var| env::var(var).ok())
    }

    fn resolve(
        file: SecretsFile,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let openai = pick_key(env_lookup(OPENAI_KEY_VAR), file.openai.api_key).ok_or(
            ConfigError::MissingKey {
                section: "openai",
                var: OPENAI_KEY_VAR,
            },
        )?;
        let tavily = pick_key(env_lookup(TAVILY_KEY_VAR), file.tavily.api_key).ok_or(
            ConfigError::MissingKey {
                section: "tavily",
                var: TAVILY_KEY_VAR,
            },
        )?;
        Ok(Self { openai, tavily })
    }
}

fn read_file(path: &Path) -> Result<SecretsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "secrets file loaded");
    Ok(file)
}

/// Environment wins over the file. Blank values count as unset.
fn pick_key(from_env: Option<String>, from_file: Option<String>) -> Option<ApiKey> {
    [from_env, from_file]
        .into_iter()
        .flatten()
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
        .map(ApiKey::new)
}
