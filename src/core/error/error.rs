use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Image,
    Config,
    Engine,
    Display,
    Protocol,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Io => "io",
            ErrorKind::Image => "image",
            ErrorKind::Config => "config",
            ErrorKind::Engine => "engine",
            ErrorKind::Display => "display",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Other => "error",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewError {
    pub kind: ErrorKind,
    pub msg: String,
}

impl PreviewError {
    pub fn new(kind: ErrorKind, msg: &str) -> Self {
        PreviewError {
            kind,
            msg: String::from(msg),
        }
    }

    pub fn error(msg: &str) -> Self {
        Self::new(ErrorKind::Other, msg)
    }

    pub fn config(msg: &str) -> Self {
        Self::new(ErrorKind::Config, msg)
    }

    pub fn engine(msg: &str) -> Self {
        Self::new(ErrorKind::Engine, msg)
    }

    pub fn display(msg: &str) -> Self {
        Self::new(ErrorKind::Display, msg)
    }

    pub fn protocol(msg: &str) -> Self {
        Self::new(ErrorKind::Protocol, msg)
    }
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.msg)
    }
}

impl std::error::Error for PreviewError {}

impl From<std::io::Error> for PreviewError {
    fn from(value: std::io::Error) -> Self {
        PreviewError::new(ErrorKind::Io, &value.to_string())
    }
}

impl From<String> for PreviewError {
    fn from(value: String) -> Self {
        PreviewError {
            kind: ErrorKind::Other,
            msg: value,
        }
    }
}

impl From<serde_json::Error> for PreviewError {
    fn from(value: serde_json::Error) -> Self {
        PreviewError::new(ErrorKind::Config, &value.to_string())
    }
}
