//! Opening URLs in the user's default browser

use crate::integration::ports::NavigationPort;
use crate::{AriaError, Result};
use std::process::{Command, Stdio};
use tracing::info;

/// Launches the platform URL opener
#[derive(Debug, Clone)]
pub struct SystemBrowser {
    program: String,
    args: Vec<String>,
}

impl SystemBrowser {
    /// Opener for the current platform
    pub fn new() -> Self {
        if cfg!(target_os = "macos") {
            Self::with_command("open", &[])
        } else if cfg!(target_os = "windows") {
            // The empty argument is the window title `start` expects first
            Self::with_command("cmd", &["/C", "start", ""])
        } else {
            Self::with_command("xdg-open", &[])
        }
    }

    /// Use a custom opener; the URL is appended after `args`
    pub fn with_command(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Default for SystemBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationPort for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AriaError::NavigationError(format!(
                "refusing to open non-web URL: {}",
                url
            )));
        }

        // The opener detaches; the child is not waited on
        self.command(url).spawn().map_err(|e| {
            AriaError::NavigationError(format!("failed to spawn {}: {}", self.program, e))
        })?;

        info!("Opened {} in browser", url);
        Ok(())
    }
}
