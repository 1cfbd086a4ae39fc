//! Loading Markdown from a file or stdin under a size ceiling

use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::info;

use crate::error::{BridgeError, Result};

/// Where Markdown input comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// A missing argument or `-` means stdin.
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            Some(path) if path != Path::new("-") => Self::File(path.to_path_buf()),
            _ => Self::Stdin,
        }
    }
}

/// Read the whole source as UTF-8, rejecting anything over `limit` bytes.
pub async fn read_markdown(source: &Source, limit: u64) -> Result<String> {
    match source {
        Source::Stdin => read_limited(tokio::io::stdin(), limit).await,
        Source::File(path) => {
            let size = tokio::fs::metadata(path).await?.len();
            if size > limit {
                return Err(BridgeError::ContentTooLarge { size, limit });
            }

            let file = tokio::fs::File::open(path).await?;
            let markdown = read_limited(file, limit).await?;
            info!("Loaded {} ({} characters)", path.display(), markdown.chars().count());
            Ok(markdown)
        }
    }
}

/// Read at most `limit` bytes from `reader`.
///
/// One extra byte is requested so oversized input is detected without
/// buffering all of it.
pub async fn read_limited<R>(reader: R, limit: u64) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut buf).await?;

    let size = buf.len() as u64;
    if size > limit {
        return Err(BridgeError::ContentTooLarge { size, limit });
    }

    String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}
