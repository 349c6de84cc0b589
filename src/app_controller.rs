/*!
 * Main application controller.
 *
 * Sequences the repository and translation-service operations into the
 * end-to-end update procedure. Every step's failure aborts the remaining
 * sequence; nothing is retried and partial progress is left in place, since
 * rolling back a working tree is itself unsafe without guaranteed
 * cleanliness. The controller assumes exclusive access to the working copy.
 */

use log::info;

use crate::app_config::Config;
use crate::errors::AppError;
use crate::repository::RepositoryHandle;
use crate::translation_sync::{SourceSync, TranslationSync};

/// First paragraph of the automated commit message.
pub const UPDATE_MESSAGE: &str = "Automatic translations update from Transifex";

/// Result of one update run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The translation pull produced no changes; nothing was committed.
    NoNewTranslations,
    /// New translations were committed and pushed to the remote.
    Published,
}

/// Main application controller for the update pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        Controller { config }
    }

    /// Run the full update procedure with the service client built from the
    /// configuration.
    pub async fn run_update(&self) -> Result<UpdateOutcome, AppError> {
        let sync = TranslationSync::new(
            self.config.resource.clone(),
            self.config.source_file.clone(),
            self.config.source_gen_command.clone(),
        );
        self.run_update_with(&sync).await
    }

    /// Run the full update procedure against an explicit service client.
    ///
    /// Steps, in order: open the working copy, check out the configured
    /// branch, fast-forward pull, regenerate and upload source strings,
    /// download translations, then commit and push only when the download
    /// actually changed the tree.
    pub async fn run_update_with(&self, sync: &dyn SourceSync) -> Result<UpdateOutcome, AppError> {
        let repo = RepositoryHandle::open(&self.config.repo_dir)?;

        info!("Checking out branch {}...", self.config.branch);
        repo.checkout(&self.config.branch)?;

        info!("Pulling...");
        repo.pull()?;

        info!("Updating source translation...");
        sync.push_source(repo.path()).await?;

        info!("Pulling translations...");
        sync.pull_translations(repo.path()).await?;

        if repo.is_clean()? {
            info!("No new translations.");
            return Ok(UpdateOutcome::NoNewTranslations);
        }

        info!("Pushing new translations to the repo...");
        let author = self.config.author_identity();
        let committer = self.config.committer_identity();
        repo.commit(
            &[UPDATE_MESSAGE, self.config.project_url.as_str()],
            &author,
            true,
            committer.as_ref(),
        )?;
        repo.push()?;

        Ok(UpdateOutcome::Published)
    }
}
