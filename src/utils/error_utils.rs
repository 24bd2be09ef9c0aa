use tokio::sync::AcquireError;
use tonic::Status;

#[derive(Debug, PartialEq)]
pub struct RpcError {
    pub message: String,
}

impl RpcError {
    pub fn new(data: String) -> Self {
        RpcError { message: data }
    }
}

impl From<sqlx::Error> for RpcError {
    fn from(e: sqlx::Error) -> Self {
        RpcError::new(format!("Sqlx error: {:?}", e))
    }
}

impl From<AcquireError> for RpcError {
    fn from(e: AcquireError) -> Self {
        RpcError::new(format!("Worker pool closed: {:?}", e))
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.message)
    }
}

impl std::error::Error for RpcError {}

// Callers get a generic fault; the details stay in the server log.
impl From<RpcError> for Status {
    fn from(e: RpcError) -> Self {
        log::error!("{}", e);
        Status::internal("internal server error")
    }
}
