//! Errors reported by the writer.

use facet::Facet;

/// Errors that can occur while writing markup.
///
/// `InvalidArgument` is always reported before anything is written for the
/// offending call. The other two surface mid-write, so output up to the
/// failure point may already be in the sink unless the write happens inside
/// [`Writer::only_write_if_successful`](crate::Writer::only_write_if_successful).
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum WriteError {
    /// end tag requested but no element is open
    StackUnderflow,

    /// invalid argument: {reason}
    InvalidArgument { reason: String },

    /// output sink rejected a write
    SinkWriteFailure,
}

impl WriteError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        WriteError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

impl From<std::fmt::Error> for WriteError {
    fn from(_: std::fmt::Error) -> Self {
        WriteError::SinkWriteFailure
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = WriteError> = std::result::Result<T, E>;
