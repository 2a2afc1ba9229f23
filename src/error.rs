use std::path::PathBuf;

pub type FolioResult<T> = Result<T, FolioError>;

#[derive(thiserror::Error, Debug)]
pub enum FolioError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid color {0:?}, expected #RRGGBB")]
    Color(String),

    #[error("content error: {0}")]
    Content(String),
}

impl FolioError {
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_input() {
        assert!(FolioError::Color("teal".into()).to_string().contains("\"teal\""));
        assert!(
            FolioError::content("unsupported extension")
                .to_string()
                .starts_with("content error:")
        );
    }
}
