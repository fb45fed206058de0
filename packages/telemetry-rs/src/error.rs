use thiserror::Error;

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("Invalid buffer configuration: {0}")]
    InvalidConfig(String),
}

pub type BufferResult<T> = std::result::Result<T, BufferError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Invalid payload for {task}: {message}")]
    InvalidPayload { task: String, message: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Computation failed: {0}")]
    Computation(String),

    #[error("Task {task} panicked: {message}")]
    HandlerPanicked { task: String, message: String },
}

pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Analytics worker channel closed")]
    ChannelClosed,

    #[error("Analytics worker queue is full")]
    Full,

    #[error("Invalid worker configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn analytics worker: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    #[error("Analytics worker thread panicked")]
    ThreadPanicked,
}

pub type WorkerResult<T> = std::result::Result<T, WorkerError>;
