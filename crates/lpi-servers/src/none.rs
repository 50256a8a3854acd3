//! Portal-only install: no application server is touched

use crate::context::InstallContext;
use crate::traits::ApplicationServer;
use anyhow::Result;
use async_trait::async_trait;

pub const KEY: &str = "NONE";

#[derive(Debug, Default, Clone, Copy)]
pub struct NoServer;

#[async_trait]
impl ApplicationServer for NoServer {
    fn key(&self) -> &'static str {
        KEY
    }

    async fn extract(&self, _ctx: &InstallContext) -> Result<()> {
        Ok(())
    }

    async fn configure(&self, _ctx: &InstallContext) -> Result<()> {
        Ok(())
    }

    async fn copy_portal_files(&self, _ctx: &InstallContext) -> Result<()> {
        Ok(())
    }

    async fn configure_server(&self, _ctx: &InstallContext) -> Result<()> {
        Ok(())
    }
}
