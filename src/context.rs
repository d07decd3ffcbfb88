use crate::config::{self, Config};
use anyhow::{bail, Result};
use std::collections::HashMap;
use tasktree::{HttpStore, Repository};
use tokio::runtime::Runtime;

pub struct Context {
    pub repo: Repository<HttpStore>,
    pub config: Config,
    pub runtime: Runtime,
    pub data: HashMap<&'static str, String>,
    pub params: Vec<String>,
}

impl Context {
    pub fn new() -> Result<Context> {
        let config = config::load()?;
        let (base_url, api_key) = config.endpoint();
        let store = HttpStore::new(&base_url, &api_key).with_session(config.session.clone());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Context {
            repo: Repository::new(store),
            config,
            runtime,
            data: HashMap::new(),
            params: Vec::new(),
        })
    }

    pub fn require_endpoint(&self) -> Result<()> {
        let (base_url, api_key) = self.config.endpoint();
        if base_url.is_empty() || api_key.is_empty() {
            bail!("No base_url/api_key configured. Edit config.json or set TASKTREE_URL and TASKTREE_API_KEY");
        }
        Ok(())
    }

    /// Fetches everything for the signed-in user.
    pub fn load(&mut self) -> Result<()> {
        self.require_endpoint()?;
        self.repo.set_active_theme(self.config.active_theme);
        if !self.runtime.block_on(self.repo.restore())? {
            bail!("Not logged in. See the login command");
        }

        let session = self.repo.session();
        if session != self.config.session {
            log::debug!("persisting refreshed session");
            self.config.session = session;
            config::save(&self.config)?;
        }
        Ok(())
    }

    /// Persists the selected theme when it changed since the config was read.
    pub fn save_active_theme(&mut self) -> Result<()> {
        if self.config.active_theme != self.repo.active_theme() {
            self.config.active_theme = self.repo.active_theme();
            config::save(&self.config)?;
        }
        Ok(())
    }

    pub fn flag(&self, name: &str) -> Option<&String> {
        self.data.get(name)
    }

    pub fn switch(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }
}
