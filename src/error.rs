use std::fmt;

#[derive(Debug)]
pub enum CardError {
    // Configuration errors
    ConfigNotFound(String),
    ConfigParseError(String),

    // Transport errors (never fatal to the widget; cycles are skipped)
    TransportError(String),
    ProtocolError(String),

    // Underlying client errors
    HttpError(reqwest::Error),
    WebSocketError(tokio_tungstenite::tungstenite::Error),

    // Serialization errors
    SerdeError(serde_json::Error),

    // IO errors
    IoError(std::io::Error),
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardError::ConfigNotFound(path) => {
                write!(f, "config not found: {}", path)
            }
            CardError::ConfigParseError(msg) => {
                write!(f, "config parse error: {}", msg)
            }
            CardError::TransportError(msg) => {
                write!(f, "transport error: {}", msg)
            }
            CardError::ProtocolError(msg) => {
                write!(f, "protocol error: {}", msg)
            }
            CardError::HttpError(err) => {
                write!(f, "http error: {}", err)
            }
            CardError::WebSocketError(err) => {
                write!(f, "websocket error: {}", err)
            }
            CardError::SerdeError(err) => {
                write!(f, "serialization error: {}", err)
            }
            CardError::IoError(err) => {
                write!(f, "io error: {}", err)
            }
        }
    }
}

impl std::error::Error for CardError {}

impl From<reqwest::Error> for CardError {
    fn from(err: reqwest::Error) -> Self {
        CardError::HttpError(err)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CardError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        CardError::WebSocketError(err)
    }
}

impl From<serde_json::Error> for CardError {
    fn from(err: serde_json::Error) -> Self {
        CardError::SerdeError(err)
    }
}

impl From<std::io::Error> for CardError {
    fn from(err: std::io::Error) -> Self {
        CardError::IoError(err)
    }
}
