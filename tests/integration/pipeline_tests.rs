/*!
 * End-to-end tests for the translation update pipeline
 */
#![allow(non_snake_case)]

use std::fs;

use anyhow::Result;
use git2::Repository;

use crate::common;
use crate::common::mock_sync::{MockSync, PullBehavior};
use txbot::app_controller::UPDATE_MESSAGE;
use txbot::errors::{AppError, RepoError};
use txbot::{Config, Controller, UpdateOutcome};

fn pipeline_config(fixture: &common::RemoteFixture) -> Config {
    Config {
        repo_dir: fixture.work_dir.to_string_lossy().into_owned(),
        branch: "master".to_string(),
        author_name: "Buildbot".to_string(),
        author_email: "buildbot@example.com".to_string(),
        ..Config::default()
    }
}

/// Scenario A: upstream is one commit ahead and the translation pull
/// produces no changes. The branch is fast-forwarded but nothing is
/// committed or pushed.
#[tokio::test]
async fn test_run_update_withNoTranslationChanges_shouldFastForwardOnly() -> Result<()> {
    let fixture = common::remote_fixture()?;
    let remote_tip = fixture.advance_remote("extra.txt", "extra\n", "remote commit")?;

    let config = pipeline_config(&fixture);
    let controller = Controller::with_config(config);
    let sync = MockSync::new(PullBehavior::NoChanges);

    let outcome = controller.run_update_with(&sync).await?;

    assert_eq!(outcome, UpdateOutcome::NoNewTranslations);
    assert_eq!(sync.push_calls(), 1);
    assert_eq!(sync.pull_calls(), 1);
    // the service client operates on the opened working copy
    assert!(sync.seen_dirs().iter().all(|dir| dir == &fixture.work_dir));
    // fast-forwarded to the remote tip, no commit on top of it
    assert_eq!(fixture.work_tip()?, remote_tip);
    assert_eq!(fixture.upstream_tip()?, remote_tip);
    Ok(())
}

/// Scenario B: the translation pull modifies a file. The pipeline produces
/// exactly one new commit with the fixed message and pushes it.
#[tokio::test]
async fn test_run_update_withModifiedTranslation_shouldCommitAndPush() -> Result<()> {
    let fixture = common::remote_fixture()?;
    let remote_tip = fixture.advance_remote("extra.txt", "extra\n", "remote commit")?;

    let config = pipeline_config(&fixture);
    let project_url = config.project_url.clone();
    let controller = Controller::with_config(config);
    let sync = MockSync::with_modified_file("greeting.txt", "bonjour\n");

    let outcome = controller.run_update_with(&sync).await?;

    assert_eq!(outcome, UpdateOutcome::Published);

    let work = Repository::open(&fixture.work_dir)?;
    let head = work.head()?.peel_to_commit()?;
    let message = head.message().expect("commit message is utf-8");
    assert_eq!(
        message.lines().next(),
        Some(UPDATE_MESSAGE),
        "first message line is the fixed update description"
    );
    assert!(message.contains(&project_url));
    assert_eq!(head.author().name(), Some("Buildbot"));
    assert_eq!(head.author().email(), Some("buildbot@example.com"));
    // exactly one commit on top of the fast-forwarded remote tip
    assert_eq!(head.parent_count(), 1);
    assert_eq!(head.parent(0)?.id(), remote_tip);
    // and it was pushed
    assert_eq!(fixture.upstream_tip()?, head.id());
    Ok(())
}

/// Scenario C: a pre-existing uncommitted edit aborts the pipeline at the
/// pull step before any service operation runs. The edit is an untracked
/// file: the branch checkout force-overwrites tracked files, so only
/// untracked content can still be dirtying the tree when pull runs.
#[tokio::test]
async fn test_run_update_withDirtyTree_shouldAbortBeforeServiceCalls() -> Result<()> {
    let fixture = common::remote_fixture()?;
    fs::write(fixture.work_dir.join("untracked_edit.txt"), "uncommitted edit\n")?;

    let config = pipeline_config(&fixture);
    let controller = Controller::with_config(config);
    let sync = MockSync::new(PullBehavior::NoChanges);

    let result = controller.run_update_with(&sync).await;

    assert!(matches!(
        result,
        Err(AppError::Repo(RepoError::DirtyRepository(_)))
    ));
    assert_eq!(sync.push_calls(), 0);
    assert_eq!(sync.pull_calls(), 0);
    Ok(())
}

/// A failed translation download stops the pipeline before the commit
/// decision; partial progress stays in place.
#[tokio::test]
async fn test_run_update_withFailingPull_shouldNotCommit() -> Result<()> {
    let fixture = common::remote_fixture()?;
    let remote_tip = fixture.advance_remote("extra.txt", "extra\n", "remote commit")?;

    let config = pipeline_config(&fixture);
    let controller = Controller::with_config(config);
    let sync = MockSync::new(PullBehavior::Fail);

    let result = controller.run_update_with(&sync).await;

    assert!(matches!(result, Err(AppError::Sync(_))));
    // the earlier fast-forward is left in place, nothing committed on top
    assert_eq!(fixture.work_tip()?, remote_tip);
    assert_eq!(fixture.upstream_tip()?, remote_tip);
    Ok(())
}

/// Opening the pipeline against a directory that is not a repository fails
/// before anything else happens.
#[tokio::test]
async fn test_run_update_withNonRepoPath_shouldFailWithNotARepository() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config {
        repo_dir: temp_dir.path().to_string_lossy().into_owned(),
        author_name: "Buildbot".to_string(),
        author_email: "buildbot@example.com".to_string(),
        ..Config::default()
    };
    let controller = Controller::with_config(config);
    let sync = MockSync::new(PullBehavior::NoChanges);

    let result = controller.run_update_with(&sync).await;

    assert!(matches!(
        result,
        Err(AppError::Repo(RepoError::NotARepository(_)))
    ));
    Ok(())
}
