/*!
 * Error types for the txbot application.
 *
 * This module contains custom error types for different parts of the
 * application, using the thiserror crate for ergonomic error definitions.
 * None of these errors trigger an automatic retry; the pipeline is meant to
 * be re-run externally once the underlying condition is fixed.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when operating on the git working copy
#[derive(Error, Debug)]
pub enum RepoError {
    /// The given path does not resolve to a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    /// The requested local branch does not exist
    #[error("Branch {0} does not exist")]
    NoSuchBranch(String),

    /// The working tree has uncommitted changes (or HEAD is not on a branch)
    #[error("The repository ({0}) has uncommitted changes")]
    DirtyRepository(String),

    /// The repository has no remote configured under the expected name
    #[error("The repository has no remote named {0}")]
    NoSuchRemote(String),

    /// No branch is checked out at call time
    #[error("No branch is currently checked out")]
    NoCurrentBranch,

    /// The current branch has no configured upstream to pull from
    #[error("Branch {0} has no configured upstream")]
    NoUpstream(String),

    /// Local and upstream histories diverged; only fast-forward is supported
    #[error("Branch {0} has diverged from its upstream")]
    DivergentHistory(String),

    /// Error from the underlying git library
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),
}

/// Errors that can occur while synchronizing with the translation service
#[derive(Error, Debug)]
pub enum SyncError {
    /// No known source-string extraction tool was found
    #[error("No source-string extraction tool found on PATH")]
    ExtractionToolNotFound,

    /// The extraction tool exited with a non-zero status
    #[error("Source extraction failed ({tool}): {stderr}")]
    ExtractionFailed {
        /// The tool or command line that was invoked
        tool: String,
        /// Captured standard error of the failed invocation
        stderr: String,
    },

    /// Uploading the regenerated source strings failed
    #[error("Uploading source strings failed: {0}")]
    PushFailed(String),

    /// Downloading translated resources failed
    #[error("Downloading translations failed: {0}")]
    PullFailed(String),

    /// An external tool could not be invoked at all
    #[error("Failed to invoke external tool: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while fetching the remote status resource
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP download failed
    #[error("Download failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A filesystem operation failed
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the working-copy layer
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    /// Error from the translation-service synchronization
    #[error("Translation sync error: {0}")]
    Sync(#[from] SyncError),

    /// Error from the status fetcher
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
