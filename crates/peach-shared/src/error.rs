use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdError {
    #[error("Invalid user id: {0}")]
    InvalidUserId(#[from] uuid::Error),

    #[error("Malformed channel id: {0}")]
    MalformedChannelId(String),

    #[error("A channel needs two distinct participants")]
    SameParticipant,
}
