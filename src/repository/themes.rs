use crate::{
    error::Result,
    models::{NewTheme, Theme, ThemeUpdate},
    remote::{RemoteStore, Table},
    repository::{encode, remove_by_id, replace_by_id, Repository},
};
use log::debug;
use serde_json::json;
use uuid::Uuid;

impl<S: RemoteStore> Repository<S> {
    pub async fn add_theme(&mut self, theme: NewTheme) -> Result<Theme> {
        let mut record = encode(&theme)?;
        record["user_id"] = json!(self.owner()?);

        let theme: Theme = self.insert(Table::Themes, record).await?;
        debug!("added theme {}", theme.id);
        self.themes.push(theme.clone());
        if self.active_theme.is_none() {
            self.active_theme = Some(theme.id);
        }
        Ok(theme)
    }

    pub async fn update_theme(&mut self, id: Uuid, changes: ThemeUpdate) -> Result<Theme> {
        let theme: Theme = self.update(Table::Themes, id, &changes).await?;
        replace_by_id(&mut self.themes, theme.clone());
        Ok(theme)
    }

    /// The store cascades the delete to the theme's projects; the mirror follows suit.
    pub async fn delete_theme(&mut self, id: Uuid) -> Result<()> {
        self.store.delete(Table::Themes, id).await?;
        debug!("deleted theme {}", id);

        remove_by_id(&mut self.themes, id);
        self.forget_theme_dependants(id);
        if self.active_theme == Some(id) {
            self.active_theme = self.themes.first().map(|t| t.id);
        }
        Ok(())
    }
}
