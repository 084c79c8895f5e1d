use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The session cannot start, e.g. no scene was chosen.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("malformed file {path:?}: {reason}")]
    FileFormat { path: PathBuf, reason: String },

    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    /// The crop box is not contained in the buffer it is applied to.
    #[error("crop box ({left}, {top})-({right}, {bottom}) lies outside a {rows}x{cols} buffer")]
    CropOutsideImage {
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        rows: usize,
        cols: usize,
    },

    #[error("joint {index} requested but the renderer reported {count} joints")]
    JointOutOfRange { index: usize, count: usize },

    #[error("joint {index} has no finite image position")]
    JointNotFinite { index: usize },

    #[error("perturbation range is empty")]
    EmptyRange,

    #[error("perturbation range is not finite")]
    NonFinite,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn file_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::FileFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
