//! Application server trait definition

use crate::common;
use crate::context::InstallContext;
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// An application server the portal is deployed into
#[async_trait]
pub trait ApplicationServer: Send + Sync {
    /// Registry key
    fn key(&self) -> &'static str;

    /// Unpack the server archive into the server directory
    async fn extract(&self, ctx: &InstallContext) -> Result<()> {
        common::extract_server(ctx).await
    }

    /// Wire the extracted portal into the server
    async fn configure(&self, ctx: &InstallContext) -> Result<()> {
        self.copy_portal_files(ctx).await?;

        if ctx.deploy_as_war() {
            common::package_war(ctx).await?;
            common::clean_portal_dir(ctx)?;
        }

        info!("  *** Configuring {} ***", self.key());
        self.configure_server(ctx).await?;
        common::set_scripts_executable(ctx)
    }

    /// Copy portal libraries and modules into the server
    async fn copy_portal_files(&self, ctx: &InstallContext) -> Result<()>;

    /// Rewrite descriptors and launch scripts, link the deployment
    async fn configure_server(&self, ctx: &InstallContext) -> Result<()>;
}
