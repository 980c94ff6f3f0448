//! Errors raised while persisting `config.ron`.

use std::path::PathBuf;

/// A config file could not be read, written, parsed or produced.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not valid RON for [`Config`](crate::Config).
    #[error("invalid config in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("cannot serialize config: {0}")]
    Serialize(#[source] ron::Error),
}

impl ConfigError {
    /// File the error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } | Self::Parse { path, .. } => {
                Some(path)
            }
            Self::Serialize(_) => None,
        }
    }
}
