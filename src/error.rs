use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("unable to read {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("font file {0:?} may be invalid")]
    InvalidFont(PathBuf),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Color(#[from] csscolorparser::ParseColorError),

    #[error(transparent)]
    Svg(#[from] resvg::usvg::Error),

    #[error("unknown color map '{0}'")]
    UnknownColormap(String),

    #[error("unknown translation backend '{0}'")]
    UnknownBackend(String),

    #[error("there are no words to lay out")]
    NoWords,

    #[error("grid of {expected} cells got {names} file names and {captions} captions")]
    GridMismatch {
        expected: usize,
        names: usize,
        captions: usize,
    },
}

pub type Result<T> = core::result::Result<T, Error>;
