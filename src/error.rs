// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::device::{DeviceError, ShaderStage};
use crate::effect::creation::EffectDataError;
use crate::effect::rewrite::RewriteError;
use crate::resource::{ResourceId, ResourceKind};

/// Result code reported back over the command protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    NoError,
    /// The command was rejected.  Recoverable; the stream continues.
    InvalidArguments,
    /// The native context is gone.  Fatal to the engine instance.
    ContextLost,
}

impl ParseError {
    pub fn from_result<T>(result: &Result<T, Error>) -> Self {
        match result {
            Ok(_) => ParseError::NoError,
            Err(e) => e.parse_error(),
        }
    }
}

/// Why a command failed.
///
/// Every failing command leaves the engine's resource tables exactly as they
/// were before the call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("no {kind} with id {id}")]
    UnknownResource { kind: ResourceKind, id: ResourceId },
    #[error("transfer range is outside the resource")]
    OutOfRange,
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("malformed effect data: {0}")]
    EffectData(#[from] EffectDataError),
    #[error("can't rewrite vertex program: {0}")]
    Rewrite(#[from] RewriteError),
    #[error("{stage} program failed to compile")]
    Compile { stage: ShaderStage },
    #[error("{stage} program failed to load at {position}: {message}")]
    ProgramLoad {
        stage: ShaderStage,
        position: usize,
        message: String,
    },
    #[error("parameter {name} is declared with a different type in each stage")]
    ParamTypeMismatch { name: String },
    #[error("draw validation failed: {0}")]
    Validation(&'static str),
    #[error("device error {0}")]
    Device(#[from] DeviceError),
    #[error("device context lost")]
    ContextLost,
}

impl Error {
    pub(crate) fn unknown(kind: ResourceKind, id: ResourceId) -> Self {
        Error::UnknownResource { kind, id }
    }

    /// The protocol code this error is reported as.
    pub fn parse_error(&self) -> ParseError {
        match self {
            Error::ContextLost | Error::Device(DeviceError::ContextLost) => ParseError::ContextLost,
            _ => ParseError::InvalidArguments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_context_loss_is_fatal() {
        assert_eq!(Error::OutOfRange.parse_error(), ParseError::InvalidArguments);
        assert_eq!(
            Error::Compile {
                stage: ShaderStage::Vertex
            }
            .parse_error(),
            ParseError::InvalidArguments
        );
        assert_eq!(Error::ContextLost.parse_error(), ParseError::ContextLost);
        assert_eq!(
            Error::Device(DeviceError::ContextLost).parse_error(),
            ParseError::ContextLost
        );
        assert_eq!(ParseError::from_result(&Ok::<(), Error>(())), ParseError::NoError);
    }
}
