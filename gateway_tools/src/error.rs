use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayApiError {
    #[error("Could not initialize the gateway API client. {0}")]
    Initialization(String),
    #[error("Error sending request to the gateway. {0}")]
    RestResponseError(String),
    #[error("Could not deserialize gateway response. {0}")]
    JsonError(String),
    #[error("The gateway returned an error response. Code {status}: {message}")]
    QueryError { status: u16, message: String },
    #[error("The gateway has no record of transaction {0}")]
    TransactionNotFound(String),
}
