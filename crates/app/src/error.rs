use ironlog_domain::{
    CreateError, DeleteError, ReadError, StorageError, UpdateError, ValidationError,
};

/// Failure of a session operation as presented to the user.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("workout not found")]
    NotFound,
    #[error("no connection")]
    Network,
    #[error("workout already finished")]
    SessionClosed,
    #[error("no workout in progress")]
    NoActiveSession,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Other(Box<dyn std::error::Error>),
}

impl From<StorageError> for SessionError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NoConnection => SessionError::Network,
            StorageError::Other(other) => SessionError::Other(other),
        }
    }
}

impl From<ReadError> for SessionError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => SessionError::NotFound,
            ReadError::Storage(storage) => storage.into(),
            ReadError::Other(other) => SessionError::Other(other),
        }
    }
}

impl From<CreateError> for SessionError {
    fn from(value: CreateError) -> Self {
        match value {
            CreateError::NotFound => SessionError::NotFound,
            CreateError::Closed => SessionError::SessionClosed,
            CreateError::Validation(validation) => SessionError::Validation(validation),
            CreateError::Storage(storage) => storage.into(),
            CreateError::Other(other) => SessionError::Other(other),
        }
    }
}

impl From<UpdateError> for SessionError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => SessionError::NotFound,
            UpdateError::Closed => SessionError::SessionClosed,
            UpdateError::Validation(validation) => SessionError::Validation(validation),
            UpdateError::Storage(storage) => storage.into(),
            UpdateError::Other(other) => SessionError::Other(other),
        }
    }
}

impl From<DeleteError> for SessionError {
    fn from(value: DeleteError) -> Self {
        match value {
            DeleteError::NotFound => SessionError::NotFound,
            DeleteError::Closed => SessionError::SessionClosed,
            DeleteError::Storage(storage) => storage.into(),
            DeleteError::Other(other) => SessionError::Other(other),
        }
    }
}
