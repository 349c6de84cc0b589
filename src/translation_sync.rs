/*!
 * Bridge between the local source tree and the external translation service.
 *
 * This module knows nothing about git beyond a filesystem path. It drives
 * two external tools: a source-string extraction tool (discovered on the
 * search path, or given as a command template) and the translation-service
 * command-line client. Both steps are fatal on failure; a failed extraction
 * never uploads, and a failed upload or download stops the pipeline before
 * the commit decision.
 */

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use crate::errors::SyncError;

/// Known source-string extraction executables, probed in order.
pub const EXTRACTION_TOOLS: &[&str] = &["lupdate", "lupdate-qt5", "lupdate-qt4"];

/// Placeholder substituted with the project path in a configured
/// generation-command template.
pub const REPO_PLACEHOLDER: &str = "%REPO%";

/// The translation-service command-line client.
const TX_EXECUTABLE: &str = "tx";

/// The two service-facing operations the orchestrator needs.
///
/// Implemented by [`TranslationSync`] for the real service client; tests
/// substitute their own implementation.
#[async_trait]
pub trait SourceSync {
    /// Regenerate the canonical source-string file and upload it to the
    /// service as the authoritative source revision.
    async fn push_source(&self, project_dir: &Path) -> Result<(), SyncError>;

    /// Download all translated resources, source language included,
    /// overwriting local copies unconditionally.
    async fn pull_translations(&self, project_dir: &Path) -> Result<(), SyncError>;
}

/// Service synchronization driven by external tools.
pub struct TranslationSync {
    resource: String,
    source_file: String,
    gen_command: Option<String>,
}

impl TranslationSync {
    /// Create a synchronizer for one named service resource.
    ///
    /// `source_file` is the canonical source-string file the extraction
    /// tool writes, relative to the project root. When `gen_command` is
    /// given it replaces the search-path discovery; [`REPO_PLACEHOLDER`]
    /// inside it is substituted with the project path.
    pub fn new(
        resource: impl Into<String>,
        source_file: impl Into<String>,
        gen_command: Option<String>,
    ) -> Self {
        TranslationSync {
            resource: resource.into(),
            source_file: source_file.into(),
            gen_command,
        }
    }

    /// Look up the first known extraction tool on the process search path.
    pub fn find_extraction_tool() -> Option<PathBuf> {
        let path_var = std::env::var_os("PATH")?;
        Self::find_tool_in_path(&path_var)
    }

    /// Look up the first known extraction tool in an explicit `PATH` value.
    pub fn find_tool_in_path(path_var: &OsStr) -> Option<PathBuf> {
        for dir in std::env::split_paths(path_var) {
            for tool in EXTRACTION_TOOLS {
                let candidate = dir.join(tool);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Run the extraction step only: regenerate the source-string file from
    /// the project's `source/` subtree.
    pub async fn regenerate_source(&self, project_dir: &Path) -> Result<(), SyncError> {
        let (display, mut command) = match &self.gen_command {
            Some(template) => {
                let rendered =
                    template.replace(REPO_PLACEHOLDER, &project_dir.to_string_lossy());
                let mut command = Command::new("sh");
                command.arg("-c").arg(&rendered);
                (rendered, command)
            }
            None => {
                let tool =
                    Self::find_extraction_tool().ok_or(SyncError::ExtractionToolNotFound)?;
                let mut command = Command::new(&tool);
                command
                    .args(["-no-obsolete", "-recursive", "source", "-ts"])
                    .arg(&self.source_file);
                (tool.to_string_lossy().into_owned(), command)
            }
        };

        debug!("Running extraction: {}", display);
        let output = command.current_dir(project_dir).output().await?;
        if !output.status.success() {
            return Err(SyncError::ExtractionFailed {
                tool: display,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    async fn run_tx(&self, project_dir: &Path, args: &[&str]) -> Result<Output, SyncError> {
        debug!("Running {} {}", TX_EXECUTABLE, args.join(" "));
        Ok(Command::new(TX_EXECUTABLE)
            .args(args)
            .current_dir(project_dir)
            .output()
            .await?)
    }
}

#[async_trait]
impl SourceSync for TranslationSync {
    async fn push_source(&self, project_dir: &Path) -> Result<(), SyncError> {
        self.regenerate_source(project_dir).await?;

        info!("Uploading source strings for resource {}...", self.resource);
        let output = self
            .run_tx(
                project_dir,
                &["push", "--source", "--resource", &self.resource],
            )
            .await?;
        if !output.status.success() {
            return Err(SyncError::PushFailed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(())
    }

    async fn pull_translations(&self, project_dir: &Path) -> Result<(), SyncError> {
        let output = self
            .run_tx(project_dir, &["pull", "--all", "--source", "--force"])
            .await?;
        if !output.status.success() {
            return Err(SyncError::PullFailed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(())
    }
}
