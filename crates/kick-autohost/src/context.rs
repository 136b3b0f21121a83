use anyhow::{Context, Result};
use autohost_config::{FileStore, GlobalConfig, PersistedSettings, validate_config};
use autohost_core::{AppError, Peer};
use autohost_platform::{Directory, MockDirectory};

/// Everything a command needs: validated config, the state file and the
/// settings loaded from it.
pub(crate) struct AppContext {
    pub config: GlobalConfig,
    pub store: FileStore,
    pub settings: PersistedSettings,
}

impl AppContext {
    pub(crate) fn load() -> Result<Self> {
        let config = GlobalConfig::load()?;
        validate_config(&config).context("Invalid global config (see `autohost config show`)")?;
        let store = FileStore::open_default();
        let settings = PersistedSettings::load(&store);
        Ok(Self {
            config,
            store,
            settings,
        })
    }

    pub(crate) fn token(&self) -> Result<String> {
        match self.settings.access_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(AppError::NotLoggedIn.into()),
        }
    }

    pub(crate) fn directory(&self) -> MockDirectory {
        MockDirectory::default()
    }

    pub(crate) async fn user(&self) -> Result<Peer> {
        let token = self.token()?;
        self.directory().fetch_user(&token).await
    }

    pub(crate) async fn friends(&self) -> Result<Vec<Peer>> {
        let token = self.token()?;
        self.directory().fetch_friends(&token).await
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
