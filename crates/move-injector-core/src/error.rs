//! Loader error taxonomy.
//!
//! Ingestion surfaces every failure directly. Resolution and resource serving
//! swallow per-step failures and only report [`LoaderError::NotFound`] once an
//! entire fallback chain is exhausted, carrying the last underlying cause.

use std::path::PathBuf;

/// Result alias used throughout the loader.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Structured loader errors.
#[derive(Debug)]
pub enum LoaderError {
    /// Name could not be resolved through any chain step.
    NotFound {
        /// The requested name (as normalized by the loader)
        name: String,
        /// Last underlying failure, if a step reported one
        cause: Option<anyhow::Error>,
    },

    /// Bytes could not be decoded into a compiled module.
    Decode {
        /// Where the bytes came from (file path, archive entry, module name)
        origin: String,
        /// Decoder message
        message: String,
    },

    /// A unit could not be serialized back into bytes after injection.
    Encode {
        /// Unit name
        name: String,
        /// Serializer message
        message: String,
    },

    /// The host define primitive rejected the bytes.
    Definition {
        /// Unit name handed to the definer
        name: String,
        /// Definer failure
        source: anyhow::Error,
    },

    /// Filesystem or archive access failed.
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },
}

impl LoaderError {
    /// NotFound without an underlying cause.
    pub fn not_found(name: impl Into<String>) -> Self {
        LoaderError::NotFound {
            name: name.into(),
            cause: None,
        }
    }

    /// NotFound wrapping the last cause seen along a chain.
    pub fn not_found_with(name: impl Into<String>, cause: Option<anyhow::Error>) -> Self {
        LoaderError::NotFound {
            name: name.into(),
            cause,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoaderError::Io {
            path: path.into(),
            source,
        }
    }

    /// Archive contents that fail to parse are reported as I/O errors so a
    /// corrupt archive is visible to the ingesting caller.
    pub fn corrupt_archive(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        LoaderError::Io {
            path: path.into(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, message.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoaderError::NotFound { .. })
    }
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderError::NotFound { name, cause } => {
                write!(f, "NotFound: {}", name)?;
                if let Some(cause) = cause {
                    write!(f, " (last cause: {})", cause)?;
                }
                Ok(())
            }
            LoaderError::Decode { origin, message } => {
                write!(f, "DecodeError: {}: {}", origin, message)
            }
            LoaderError::Encode { name, message } => {
                write!(f, "EncodeError: {}: {}", name, message)
            }
            LoaderError::Definition { name, source } => {
                write!(f, "DefinitionError: {}: {}", name, source)
            }
            LoaderError::Io { path, source } => {
                write!(f, "IOError: {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoaderError::NotFound {
                cause: Some(cause), ..
            } => Some(&**cause),
            LoaderError::Definition { source, .. } => Some(&**source),
            LoaderError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
