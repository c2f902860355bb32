/// Convenience alias for results produced by this crate.
pub type AdmixResult<T> = Result<T, AdmixError>;

/// Crate-wide error type.
///
/// Categories follow the engine's failure taxonomy: `Validation` for
/// malformed values, `Stack` for layer-stack contract violations (unknown
/// id, bad reorder set), `Asset` for image or font sources that cannot be
/// resolved or decoded, `Raster` for faults inside the export pipeline.
#[derive(thiserror::Error, Debug)]
pub enum AdmixError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("stack error: {0}")]
    Stack(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("raster error: {0}")]
    Raster(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdmixError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn stack(msg: impl Into<String>) -> Self {
        Self::Stack(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            AdmixError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(AdmixError::stack("x").to_string().contains("stack error:"));
        assert!(AdmixError::asset("x").to_string().contains("asset error:"));
        assert!(AdmixError::raster("x").to_string().contains("raster error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = AdmixError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
