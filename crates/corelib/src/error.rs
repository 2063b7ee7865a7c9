//! Errors shared by the renderer-agnostic core.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unrecognised color code: '{0}'")]
    InvalidColor(String),
    #[error("Scene is missing its {0} settings")]
    SceneIncomplete(&'static str),
    #[error("Unknown environment preset: '{0}'")]
    UnknownEnvironment(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
