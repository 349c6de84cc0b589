/*!
 * Crash-safe download of the remote status resource.
 *
 * The status file must never end up partially written or missing on disk,
 * even when the process dies mid-download. The whole response body is
 * buffered in memory first; the previous file is kept as a `.bak` sibling
 * until the new content is fully written. If the write fails, the `.bak`
 * stays behind as the last good copy for manual recovery.
 */

use std::path::{Path, PathBuf};

use log::info;

use crate::errors::FetchError;

/// Well-known URL of the status resource.
pub const STATUS_URL: &str = "http://status.vatsim.net/status.txt";

/// User-agent identifying this tool to the status server.
pub const USER_AGENT: &str = concat!("txbot/", env!("CARGO_PKG_VERSION"));

/// Download `url` and replace `target` with the response body.
pub async fn fetch_to(url: &str, target: &Path) -> Result<(), FetchError> {
    info!("Downloading {} to {}...", url, target.display());

    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let response = client.get(url).send().await?.error_for_status()?;
    // buffer the full body; never stream-write over the target
    let body = response.bytes().await?;

    replace_file(target, |path| std::fs::write(path, &body))?;
    info!("Download of {} done.", url);
    Ok(())
}

/// Replace `target` through an injected writer, keeping a `.bak` of the
/// previous content until the new content is fully written.
///
/// When the writer fails, the `.bak` file is left in place untouched; it
/// holds the pre-call content byte for byte. The caller (or an operator)
/// decides what to do with it.
pub fn replace_file<F>(target: &Path, write: F) -> Result<(), FetchError>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    let bak = bak_path(target);
    if target.is_file() {
        std::fs::rename(target, &bak)?;
    }
    write(target)?;
    if bak.is_file() {
        std::fs::remove_file(&bak)?;
    }
    Ok(())
}

fn bak_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}
