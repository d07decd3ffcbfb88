use crate::{
    error::{Error, Result},
    models::{AccessLevel, ProjectShare, ShareStatus},
    remote::{RemoteStore, Table},
    repository::{replace_by_id, Repository},
    utils, views,
};
use log::debug;
use serde_json::json;
use uuid::Uuid;

/// Non-revoked shares a single project may carry.
pub const MAX_ACTIVE_SHARES: usize = 5;

impl<S: RemoteStore> Repository<S> {
    /// Invites `email` to the project. Fails locally, without a request, once the cap is reached.
    pub async fn share_project(
        &mut self,
        project_id: Uuid,
        email: &str,
        access_level: AccessLevel,
    ) -> Result<ProjectShare> {
        if views::active_share_count(&self.shares, project_id) >= MAX_ACTIVE_SHARES {
            return Err(Error::ShareLimitExceeded {
                project_id,
                limit: MAX_ACTIVE_SHARES,
            });
        }

        let record = json!({
            "project_id": project_id,
            "owner_id": self.owner()?,
            "shared_with_email": email,
            "access_level": access_level,
            "invite_token": utils::generate_invite_token(),
            "status": ShareStatus::Pending,
        });
        let share: ProjectShare = self.insert(Table::ProjectShares, record).await?;
        debug!("shared project {} with {}", project_id, email);
        self.shares.push(share.clone());
        Ok(share)
    }

    /// Revoked shares stay in the collection; views filter them out.
    pub async fn revoke_share(&mut self, id: Uuid) -> Result<ProjectShare> {
        let share: ProjectShare = self
            .update(
                Table::ProjectShares,
                id,
                &json!({ "status": ShareStatus::Revoked }),
            )
            .await?;
        debug!("revoked share {}", id);
        replace_by_id(&mut self.shares, share.clone());
        Ok(share)
    }

    pub fn project_shares(&self, project_id: Uuid) -> Vec<&ProjectShare> {
        views::project_shares(&self.shares, project_id)
    }
}
