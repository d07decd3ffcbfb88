use crate::remote::StoreError;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The remote store rejected or failed a create/update/delete/fetch. Local state is unchanged.
    #[error("remote operation failed: {0}")]
    RemoteOperation(#[from] StoreError),
    #[error("project {project_id} already has {limit} active shares")]
    ShareLimitExceeded { project_id: Uuid, limit: usize },
}

impl Error {
    pub fn is_share_limit(&self) -> bool {
        matches!(self, Error::ShareLimitExceeded { .. })
    }
}
