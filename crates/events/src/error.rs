use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventsError {
    #[error("Failed to format amount for display: {0}")]
    Formatting(#[from] CoreError),
}
