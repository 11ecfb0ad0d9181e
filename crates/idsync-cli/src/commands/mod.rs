//! CLI command implementations

pub mod config;
pub mod daemon;
pub mod group;
pub mod member;
pub mod sync;
pub mod user;

use std::sync::Arc;

use anyhow::Result;

use idsync_core::config::Config;
use idsync_core::ports::IIdentityStore;

use crate::context::AppContext;

/// Opens the context and picks the store local mutations go through
///
/// With `local_only` the directory is neither contacted nor required.
pub async fn mutation_context(
    config: Config,
    local_only: bool,
) -> Result<(AppContext, Arc<dyn IIdentityStore>)> {
    if local_only {
        let ctx = AppContext::open_local(config).await?;
        let store = ctx.local_store();
        Ok((ctx, store))
    } else {
        let ctx = AppContext::connect(config).await?;
        let store = ctx.store()?;
        Ok((ctx, store))
    }
}
