use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::repository::Identity;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Path to the working copy the pipeline operates on
    #[serde(default)]
    pub repo_dir: String,

    /// Branch the translation updates land on
    #[serde(default = "default_branch")]
    pub branch: String,

    // @field: Commit author display name
    #[serde(default)]
    pub author_name: String,

    // @field: Commit author email
    #[serde(default)]
    pub author_email: String,

    /// Optional committer identity; defaults to the author when unset
    #[serde(default)]
    pub committer_name: Option<String>,

    #[serde(default)]
    pub committer_email: Option<String>,

    /// Name of the translation-service resource to push the source to
    #[serde(default = "default_resource")]
    pub resource: String,

    /// Canonical source-string file the extraction tool writes,
    /// relative to the project root
    #[serde(default = "default_source_file")]
    pub source_file: String,

    /// Optional source-generation command template; `%REPO%` is replaced
    /// with the repository path. When unset, known extraction tools are
    /// probed on the search path instead.
    #[serde(default)]
    pub source_gen_command: Option<String>,

    /// Reference URL of the translation project, placed in the second
    /// paragraph of the automated commit message
    #[serde(default = "default_project_url")]
    pub project_url: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Optional log file the logger duplicates its output to
    #[serde(default)]
    pub log_file: Option<String>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_resource() -> String {
    "txbot".to_string()
}

fn default_source_file() -> String {
    "translations/source.ts".to_string()
}

fn default_project_url() -> String {
    "https://www.transifex.com/projects/p/txbot/".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.repo_dir.is_empty() {
            return Err(anyhow!("repo_dir is required"));
        }
        if self.branch.is_empty() {
            return Err(anyhow!("branch must not be empty"));
        }
        if self.author_name.is_empty() || self.author_email.is_empty() {
            return Err(anyhow!("author_name and author_email are required"));
        }
        if !self.author_email.contains('@') {
            return Err(anyhow!("author_email is not a valid email address"));
        }
        // committer identity is all or nothing
        if self.committer_name.is_some() != self.committer_email.is_some() {
            return Err(anyhow!(
                "committer_name and committer_email must be set together"
            ));
        }
        if self.resource.is_empty() {
            return Err(anyhow!("resource must not be empty"));
        }
        Ok(())
    }

    // @returns: Commit author identity
    pub fn author_identity(&self) -> Identity {
        Identity::new(self.author_name.clone(), self.author_email.clone())
    }

    /// Explicit committer identity, when one is configured
    pub fn committer_identity(&self) -> Option<Identity> {
        match (&self.committer_name, &self.committer_email) {
            (Some(name), Some(email)) => Some(Identity::new(name.clone(), email.clone())),
            _ => None,
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            repo_dir: String::new(),
            branch: default_branch(),
            author_name: String::new(),
            author_email: String::new(),
            committer_name: None,
            committer_email: None,
            resource: default_resource(),
            source_file: default_source_file(),
            source_gen_command: None,
            project_url: default_project_url(),
            log_level: LogLevel::default(),
            log_file: None,
        }
    }
}
