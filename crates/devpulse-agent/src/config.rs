//! Agent configuration: the JSON source list plus credentials.
//!
//! Credentials may live in the config file or in the environment; the
//! environment wins so deployments can keep tokens out of the file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use devpulse_core::{Credentials, SourceList};

use crate::error::AgentError;

const GITHUB_TOKEN_VAR: &str = "DEVPULSE_GITHUB_TOKEN";
const STACKEXCHANGE_KEY_VAR: &str = "DEVPULSE_STACKEXCHANGE_KEY";

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    repos: Vec<devpulse_core::RepoSpec>,
    #[serde(default)]
    tags: Vec<devpulse_core::TagSpec>,
    #[serde(default)]
    github_token: Option<String>,
    #[serde(default)]
    stackexchange_key: Option<String>,
}

#[derive(Debug, Default)]
pub struct AgentConfig {
    pub sources: SourceList,
    pub credentials: Credentials,
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let raw = fs::read_to_string(path).map_err(|source| AgentError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile =
            serde_json::from_str(&raw).map_err(|source| AgentError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            sources: SourceList {
                repos: file.repos,
                tags: file.tags,
            },
            credentials: Credentials {
                github_token: env_or(GITHUB_TOKEN_VAR, file.github_token),
                stackexchange_key: env_or(STACKEXCHANGE_KEY_VAR, file.stackexchange_key),
            },
        })
    }
}

fn env_or(var: &str, fallback: Option<String>) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty()).or(fallback)
}
