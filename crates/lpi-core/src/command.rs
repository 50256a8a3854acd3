//! Shell command execution for setup scripts and deployment links
//!
//! Commands are split on single spaces; quoting is not supported, so an
//! argument cannot contain a space.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Run `command` in `dir`, streaming its output to the log
///
/// Standard output and standard error are drained by two tasks that are
/// joined before this returns, so every line the child printed has been
/// logged. A non-zero exit is logged and returned, not raised.
pub async fn run_command(command: &str, dir: &Path) -> Result<ExitStatus> {
    let mut parts = command.split(' ').filter(|part| !part.is_empty());
    let program = parts
        .next()
        .ok_or_else(|| Error::command(command, std::io::ErrorKind::InvalidInput.into()))?;
    let args: Vec<&str> = parts.collect();

    info!("- Executing command: {}", command);
    debug!("Working directory: {}", dir.display());

    let mut child = Command::new(resolve_program(program, dir))
        .args(&args)
        .current_dir(dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::command(command, e))?;

    let stdout = child.stdout.take().map(|out| tokio::spawn(drain(out, false)));
    let stderr = child.stderr.take().map(|err| tokio::spawn(drain(err, true)));

    let status = child.wait().await.map_err(|e| Error::command(command, e))?;

    for reader in [stdout, stderr].into_iter().flatten() {
        if let Err(e) = reader.await {
            warn!("Output reader for `{}` failed: {}", command, e);
        }
    }

    if !status.success() {
        warn!("Command `{}` exited with {}", command, status);
    }

    Ok(status)
}

/// Relative programs with a directory component are taken from `dir`
fn resolve_program(program: &str, dir: &Path) -> PathBuf {
    let path = Path::new(program);
    if path.is_relative() && path.components().count() > 1 {
        dir.join(path)
    } else {
        path.to_path_buf()
    }
}

async fn drain<R>(stream: R, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            warn!("{}", line);
        } else {
            info!("{}", line);
        }
    }
}
