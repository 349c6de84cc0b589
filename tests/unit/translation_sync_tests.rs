/*!
 * Tests for the translation-service synchronization helpers
 */
#![allow(non_snake_case)]

use std::env;
use std::fs;

use anyhow::Result;

use crate::common;
use txbot::TranslationSync;
use txbot::errors::SyncError;

/// Test that tool discovery finds a known executable name on the path
#[test]
fn test_find_tool_in_path_withKnownToolPresent_shouldReturnIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let tool = temp_dir.path().join("lupdate");
    fs::write(&tool, "#!/bin/sh\nexit 0\n")?;

    let path_var = env::join_paths([temp_dir.path()])?;
    let found = TranslationSync::find_tool_in_path(&path_var);

    assert_eq!(found, Some(tool));
    Ok(())
}

/// Test that tool discovery returns nothing for a path without any
/// known executable
#[test]
fn test_find_tool_in_path_withEmptyDir_shouldReturnNone() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let path_var = env::join_paths([temp_dir.path()])?;

    assert_eq!(TranslationSync::find_tool_in_path(&path_var), None);
    Ok(())
}

/// Test that a configured command template has the repository placeholder
/// substituted before it runs
#[tokio::test]
async fn test_regenerate_source_withCommandTemplate_shouldSubstituteRepoPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let sync = TranslationSync::new(
        "app",
        "translations/source.ts",
        Some("touch %REPO%/generated.marker".to_string()),
    );

    sync.regenerate_source(temp_dir.path()).await?;

    assert!(temp_dir.path().join("generated.marker").is_file());
    Ok(())
}

/// Test that a non-zero extraction exit is fatal and reports the command
#[tokio::test]
async fn test_regenerate_source_withFailingCommand_shouldFailWithExtractionFailed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let sync = TranslationSync::new("app", "translations/source.ts", Some("false".to_string()));

    let result = sync.regenerate_source(temp_dir.path()).await;

    match result {
        Err(SyncError::ExtractionFailed { tool, .. }) => assert_eq!(tool, "false"),
        other => panic!("expected ExtractionFailed, got {:?}", other.map(|_| ())),
    }
    Ok(())
}
