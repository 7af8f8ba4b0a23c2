pub type MecateResult<T> = Result<T, MecateError>;

/// Top-level error taxonomy for the collage pipeline.
///
/// Everything here is fatal for the whole render. Recoverable per-photo
/// conditions travel through [`RenderWarning`] instead.
#[derive(thiserror::Error, Debug)]
pub enum MecateError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("font error: {0}")]
    Font(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("export error: {0}")]
    Export(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MecateError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

/// Non-fatal conditions reported alongside a successful render.
///
/// A skipped photo leaves a hole on its strand; the rest of the document is
/// unaffected.
#[derive(thiserror::Error, Debug)]
pub enum RenderWarning {
    #[error("photo '{photo}' for year '{label}' skipped: {cause}")]
    PhotoSkipped {
        label: String,
        photo: String,
        #[source]
        cause: MecateError,
    },

    #[error("year '{label}' has {supplied} photos; keeping the first {kept}")]
    PhotosTruncated {
        label: String,
        supplied: usize,
        kept: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            MecateError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(MecateError::font("x").to_string().contains("font error:"));
        assert!(
            MecateError::render("x")
                .to_string()
                .contains("render error:")
        );
        assert!(
            MecateError::export("x")
                .to_string()
                .contains("export error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = MecateError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn skipped_photo_warning_names_photo_and_cause() {
        let w = RenderWarning::PhotoSkipped {
            label: "2019".to_string(),
            photo: "beach.jpg".to_string(),
            cause: MecateError::render("decode failed"),
        };
        let msg = w.to_string();
        assert!(msg.contains("beach.jpg"));
        assert!(msg.contains("2019"));
        assert!(msg.contains("decode failed"));
    }
}
