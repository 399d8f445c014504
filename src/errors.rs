use thiserror::Error;

/// Everything that can go wrong between a selection and its explanation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("API key is empty - set gemini_api_key in wit.toml or WIT_GEMINI_API_KEY")]
    MissingApiKey,

    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("No explanation in response")]
    MalformedResponse,

    /// The relay task is gone; the request never left the controller.
    #[error("Failed to get explanation")]
    Disconnected,
}

impl RelayError {
    /// The single string handed to the controller for any relay-side failure.
    pub fn normalized(&self) -> String {
        format!("Gemini Error: {}", self)
    }
}
