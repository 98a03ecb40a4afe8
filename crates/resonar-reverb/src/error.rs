//! Engine error taxonomy.

/// Errors returned by the reverb engine's public operations.
///
/// Every check is a precondition at the call boundary: a failed call
/// leaves all engine state, including previously staged parameters,
/// exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverbError {
    /// A required memory region or buffer is missing or too small for
    /// the planned layout.
    NullAddress,
    /// A control or instance parameter falls outside its documented
    /// domain.
    OutOfRange,
    /// The sample count is inconsistent with the supplied buffer
    /// lengths.
    InvalidNumSamples,
}

#[cfg(feature = "std")]
impl std::fmt::Display for ReverbError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NullAddress => write!(f, "required memory region or buffer missing or too small"),
            Self::OutOfRange => write!(f, "parameter outside its documented range"),
            Self::InvalidNumSamples => {
                write!(f, "sample count inconsistent with buffer lengths")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReverbError {}
