use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("unauthorized")]
    Unauthorized,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unrecognized timestamp `{0}`")]
    Timestamp(String),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned status {0}")]
    HttpStatus(u16),
    #[error("unauthorized")]
    Unauthorized,
    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remedy {
    Retry,
    Authenticate,
    Report,
}

impl ApiError {
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidRequest(_) => "Invalid URL".to_string(),
            ApiError::Network(_) | ApiError::Decode(_) => {
                "Unable to load. Check your connection and try again.".to_string()
            }
            ApiError::HttpStatus(code) => format!("Server error: {code}"),
            ApiError::Unauthorized => "Please log in to continue".to_string(),
        }
    }

    pub fn remedy(&self) -> Remedy {
        match self {
            ApiError::InvalidRequest(_) => Remedy::Report,
            ApiError::Unauthorized => Remedy::Authenticate,
            ApiError::Network(_) | ApiError::HttpStatus(_) | ApiError::Decode(_) => Remedy::Retry,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
            TransportError::Network(cause) => ApiError::Network(cause),
            TransportError::HttpStatus(code) => ApiError::HttpStatus(code),
            TransportError::Unauthorized => ApiError::Unauthorized,
        }
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_stays_distinct_from_server_errors() {
        let unauthorized = ApiError::from(TransportError::Unauthorized);
        let server = ApiError::from(TransportError::HttpStatus(500));
        assert_eq!(unauthorized, ApiError::Unauthorized);
        assert_eq!(server, ApiError::HttpStatus(500));
        assert_eq!(unauthorized.remedy(), Remedy::Authenticate);
        assert_eq!(server.remedy(), Remedy::Retry);
        assert_eq!(server.user_message(), "Server error: 500");
    }

    #[test]
    fn decode_and_network_share_user_text_but_not_diagnostics() {
        let network = ApiError::Network("connection refused".into());
        let decode = ApiError::from(DecodeError::Timestamp("yesterday".into()));
        assert_eq!(network.user_message(), decode.user_message());
        assert_ne!(network.to_string(), decode.to_string());
        assert!(decode.to_string().contains("yesterday"));
    }
}
