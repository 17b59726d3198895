use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("job queue is full (capacity {capacity})")]
    Full { capacity: usize },

    #[error("job queue is shut down")]
    Closed,
}
