//! Adapter wiring shared by the commands
//!
//! ```text
//! ScimClient ─→ ScimDirectoryClient ─┬─→ ChangePropagator ─→ HookedIdentityStore
//!                                    │                              │
//! DatabasePool ─→ SqliteIdentityStore┘                              ▼
//!                                                   Reconciler ─→ ReconciliationScheduler
//! ```
//!
//! The same [`SyncGuard`] is handed to the propagator and the reconciler.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use idsync_core::config::Config;
use idsync_core::ports::{IDirectoryClient, IIdentityStore, NoopLifecycleHooks};
use idsync_scim::client::ScimClient;
use idsync_scim::provider::ScimDirectoryClient;
use idsync_store::{DatabasePool, SqliteIdentityStore};
use idsync_sync::{ChangePropagator, HookedIdentityStore, Reconciler, SyncGuard};

/// Opened store plus, when configured, the remote directory
pub struct AppContext {
    pub config: Config,
    raw: Arc<SqliteIdentityStore>,
    directory: Option<Arc<dyn IDirectoryClient>>,
    guard: Arc<SyncGuard>,
}

impl AppContext {
    /// Opens the local store only
    pub async fn open_local(config: Config) -> Result<Self> {
        let path = &config.store.database_path;
        if path.as_os_str().is_empty() {
            bail!("store.database_path must be set");
        }
        let pool = DatabasePool::new(path)
            .await
            .context("Failed to open identity store")?;

        Ok(Self {
            raw: Arc::new(SqliteIdentityStore::new(pool.pool().clone())),
            directory: None,
            guard: Arc::new(SyncGuard::new()),
            config,
        })
    }

    /// Opens the local store and connects the remote directory
    ///
    /// Fails with every configuration problem listed when the configuration
    /// does not validate.
    pub async fn connect(config: Config) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            let listed: Vec<String> = errors.iter().map(ToString::to_string).collect();
            bail!("Invalid configuration:\n  {}", listed.join("\n  "));
        }

        let client = ScimClient::from_config(&config.directory)
            .context("Failed to create SCIM client")?;
        info!(base_url = %client.base_url(), "Using SCIM directory");
        let directory: Arc<dyn IDirectoryClient> = Arc::new(ScimDirectoryClient::new(client));

        let mut ctx = Self::open_local(config).await?;
        ctx.directory = Some(directory);
        Ok(ctx)
    }

    fn directory(&self) -> Result<Arc<dyn IDirectoryClient>> {
        match &self.directory {
            Some(directory) => Ok(Arc::clone(directory)),
            None => bail!("No directory connected"),
        }
    }

    /// Store without hooks, for reads
    pub fn reader(&self) -> Arc<dyn IIdentityStore> {
        self.raw.clone()
    }

    /// Store whose mutations are pushed to the directory
    pub fn store(&self) -> Result<Arc<dyn IIdentityStore>> {
        let propagator = Arc::new(ChangePropagator::new(
            self.directory()?,
            self.raw.clone(),
            self.guard.clone(),
        ));
        Ok(Arc::new(HookedIdentityStore::new(self.raw.clone(), propagator)))
    }

    /// Store whose mutations stay local
    ///
    /// The next reconciliation pass overwrites whatever the directory
    /// disagrees with.
    pub fn local_store(&self) -> Arc<dyn IIdentityStore> {
        Arc::new(HookedIdentityStore::new(
            self.raw.clone(),
            Arc::new(NoopLifecycleHooks),
        ))
    }

    pub fn reconciler(&self) -> Result<Reconciler> {
        Ok(Reconciler::new(self.directory()?, self.store()?, self.guard.clone())
            .with_skip_unchanged(self.config.sync.skip_unchanged))
    }
}
