/*!
 * # txbot - Translation maintenance buildbot
 *
 * A Rust library that automates recurring server-side maintenance for a
 * software project:
 *
 * - Keep the project's translation source file synchronized with an external
 *   translation service and publish the results back to the project's git
 *   repository.
 * - Mirror a remote status resource to a local file with crash-safe
 *   replacement semantics.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `repository`: Safe, minimal operations on one git working copy
 * - `translation_sync`: Bridge between the local source tree and the
 *   external translation service
 * - `status_fetch`: Crash-safe download of the remote status resource
 * - `app_controller`: Main application controller sequencing the update
 *   pipeline
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod repository;
pub mod translation_sync;
pub mod status_fetch;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, UpdateOutcome};
pub use repository::{Identity, PullOutcome, RepositoryHandle};
pub use translation_sync::{SourceSync, TranslationSync};
pub use errors::{AppError, FetchError, RepoError, SyncError};
