//! Copying text to the system clipboard through the platform's own tools

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{BridgeError, Result};

/// Clipboard programs tried in order, with the arguments that make them
/// read stdin into the clipboard.
const TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip.exe", &[]),
];

pub async fn copy(text: &str) -> Result<()> {
    copy_with(TOOLS, text).await
}

async fn copy_with(tools: &[(&str, &[&str])], text: &str) -> Result<()> {
    let mut failures = Vec::new();

    for (program, args) in tools {
        match pipe_into(program, args, text).await {
            Ok(()) => {
                info!("Copied {} characters to clipboard via {program}", text.chars().count());
                return Ok(());
            }
            Err(reason) => {
                debug!("{program}: {reason}");
                failures.push(format!("{program}: {reason}"));
            }
        }
    }

    Err(BridgeError::ClipboardUnavailable {
        reason: if failures.is_empty() {
            "no clipboard tool configured".to_string()
        } else {
            failures.join("; ")
        },
    })
}

async fn pipe_into(program: &str, args: &[&str], text: &str) -> std::result::Result<(), String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| e.to_string())?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| e.to_string())?;
    }

    let status = child.wait().await.map_err(|e| e.to_string())?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("exited with {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_tools_are_unavailable() {
        let tools: &[(&str, &[&str])] = &[("md2discord-no-such-clipboard-tool", &[])];

        let err = copy_with(tools, "text").await.unwrap_err();

        match err {
            BridgeError::ClipboardUnavailable { reason } => {
                assert!(reason.starts_with("md2discord-no-such-clipboard-tool:"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_tool_list_is_unavailable() {
        let err = copy_with(&[], "text").await.unwrap_err();
        assert!(matches!(err, BridgeError::ClipboardUnavailable { .. }));
    }
}
