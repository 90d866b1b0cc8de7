use std::path::PathBuf;

use thiserror::Error;

use super::gpu::ShaderStage;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything the rendering core can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// A GL object, the window or the GL context could not be created.
    #[error("failed to create {what}: {reason}")]
    ResourceCreation {
        what: &'static str,
        reason: String,
    },

    #[error("could not compile {stage} shader: {log}")]
    ShaderCompile {
        stage: ShaderStage,
        log: String,
    },

    #[error("could not link/validate program: {0}")]
    ShaderLink(String),

    #[error("uniform location not found: {0}")]
    UniformNotFound(String),

    #[error("could not decode image {path:?}: {reason}")]
    Decode {
        path: PathBuf,
        reason: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A GL error code surfaced at a checkpoint.
    #[error("GL error: {description}, at {label}")]
    DriverState {
        label: String,
        description: &'static str,
    },
}

impl Error {
    pub(crate) fn resource(what: &'static str) -> impl FnOnce(String) -> Error {
        move |reason| Error::ResourceCreation { what, reason }
    }
}
