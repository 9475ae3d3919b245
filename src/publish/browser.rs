use std::process::{Command, Stdio};
use tracing::debug;

use crate::types::{FlowError, Result};

/// Open `url` with the platform's default handler without waiting for it
pub fn open_in_browser(url: &str) -> Result<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        Command::new("xdg-open")
    };

    debug!("Opening {} in browser", url);
    cmd.arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| FlowError::Publish(format!("Failed to open browser for {}: {}", url, e)))
}
