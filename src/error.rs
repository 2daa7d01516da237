//! Error types for loading and exporting images.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmeterError {
    /// The file could not be read or decoded as an image
    #[error("cannot decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The decoded image has a zero dimension
    #[error("image {path} is empty ({width}x{height})")]
    EmptyImage {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    /// Export was requested before any image was loaded
    #[error("no image loaded")]
    NoImage,

    /// The surface could not be rasterized
    #[error("cannot render surface: {0}")]
    Render(String),

    /// The rendered surface could not be written
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, SegmeterError>;
