use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlicePickError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load archive {name}: {message}")]
    Archive { name: String, message: String },

    #[error("Input directory not found or unreadable: {path}")]
    InputDirectory { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Failed to write manifest: {message}")]
    Manifest { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for SlicePickError {
    fn user_message(&self) -> String {
        match self {
            SlicePickError::Archive { name, message } => {
                format!("Error processing {}: {}", name, message)
            }
            SlicePickError::InputDirectory { path } => {
                format!("Input directory not found or unreadable: {}", path)
            }
            SlicePickError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            SlicePickError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            SlicePickError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            SlicePickError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied: {}", e)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SlicePickError::Permission { .. } => Some(
                "Make sure you have write permission for the output and manifest paths, \
                 run with elevated privileges, or point --output at a directory you can write to."
                    .to_string(),
            ),
            SlicePickError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Some(
                "Make sure you have write permission for the output and manifest paths, \
                 run with elevated privileges, or point --output at a directory you can write to."
                    .to_string(),
            ),
            SlicePickError::InputDirectory { .. } => Some(
                "Check that the data directory path is correct and contains .npz archives."
                    .to_string(),
            ),
            SlicePickError::Archive { .. } => Some(
                "Check that the NPZ files are consistent: each archive must contain same-shaped \
                 'image' and 'label' arrays."
                    .to_string(),
            ),
            SlicePickError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present."
                    .to_string(),
            ),
            SlicePickError::Manifest { .. } => Some(
                "Check that the manifest path is writable and there is enough disk space."
                    .to_string(),
            ),
            _ => Some(
                "Check that the data path is correct, the NPZ files share a consistent format, \
                 and there is enough disk space."
                    .to_string(),
            ),
        }
    }
}

impl From<csv::Error> for SlicePickError {
    fn from(error: csv::Error) -> Self {
        match error.into_kind() {
            csv::ErrorKind::Io(e) => SlicePickError::Io(e),
            other => SlicePickError::Manifest {
                message: format!("{:?}", other),
            },
        }
    }
}

impl From<toml::de::Error> for SlicePickError {
    fn from(error: toml::de::Error) -> Self {
        SlicePickError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SlicePickError>;
