//! The install sequence
//!
//! Four top-level steps run in a fixed order, each moving the pipeline one
//! state forward:
//!
//! ```text
//! NotStarted -> PortalExtracted -> PortalConfigured -> ServerExtracted -> ServerConfigured -> Done
//! ```
//!
//! A failed step is logged and recorded and does not move the state. By
//! default the pipeline carries on with the next step and still ends in
//! `Done`, with the report naming the steps that completed and the ones that
//! failed; in strict mode it stops in `Failed`.

use crate::portal::Portal;
use crate::registry::{ResolutionError, StrategyRegistry};
use anyhow::Result;
use lpi_core::{InstallPath, InstallerSettings};
use lpi_database::{create_database, Database};
use lpi_fetch::Fetcher;
use lpi_servers::{ApplicationServer, InstallContext};
use std::fmt;
use tracing::{error, info};

/// Exit status of a strict run with a failed step
pub const STRICT_FAILURE_EXIT_CODE: i32 = 3;

/// Where an install run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    PortalExtracted,
    PortalConfigured,
    ServerExtracted,
    ServerConfigured,
    Done,
    Failed,
}

/// A top-level install step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    PortalExtract,
    PortalConfigure,
    ServerExtract,
    ServerConfigure,
}

impl Step {
    /// Every step, in execution order
    pub const ALL: [Step; 4] = [
        Step::PortalExtract,
        Step::PortalConfigure,
        Step::ServerExtract,
        Step::ServerConfigure,
    ];

    /// State reached once this step has run
    pub fn reached(self) -> PipelineState {
        match self {
            Self::PortalExtract => PipelineState::PortalExtracted,
            Self::PortalConfigure => PipelineState::PortalConfigured,
            Self::ServerExtract => PipelineState::ServerExtracted,
            Self::ServerConfigure => PipelineState::ServerConfigured,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PortalExtract => write!(f, "Extracting portal"),
            Self::PortalConfigure => write!(f, "Configuring portal"),
            Self::ServerExtract => write!(f, "Extracting server"),
            Self::ServerConfigure => write!(f, "Configuring server"),
        }
    }
}

/// A step that did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: Step,
    pub message: String,
}

/// Outcome of one install run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub state: PipelineState,
    /// Steps that ran to completion, in order
    pub completed: Vec<Step>,
    pub failures: Vec<StepFailure>,
    pub strict: bool,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status; failed steps only count in strict mode
    pub fn exit_code(&self) -> i32 {
        if self.strict && !self.is_success() {
            STRICT_FAILURE_EXIT_CODE
        } else {
            0
        }
    }
}

/// Ordered install of the portal and its application server
pub struct InstallPipeline {
    ctx: InstallContext,
    portal: Portal,
    database: Box<dyn Database>,
    server: Box<dyn ApplicationServer>,
    strict: bool,
    state: PipelineState,
}

impl InstallPipeline {
    pub fn new(
        ctx: InstallContext,
        database: Box<dyn Database>,
        server: Box<dyn ApplicationServer>,
    ) -> Self {
        Self {
            ctx,
            portal: Portal::new(),
            database,
            server,
            strict: false,
            state: PipelineState::NotStarted,
        }
    }

    /// Resolve the configured variants and build the pipeline for them
    pub fn from_settings(
        settings: InstallerSettings,
        fetcher: Fetcher,
    ) -> std::result::Result<Self, ResolutionError> {
        let variants = StrategyRegistry::resolve(&settings)?;
        let ctx = InstallContext::new(settings, variants.vendor, fetcher);
        let database = create_database(
            variants.vendor,
            &ctx.settings.database,
            ctx.path(InstallPath::PortalContextLib),
        );
        Ok(Self::new(ctx, database, variants.server))
    }

    /// Stop at the first failed step
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn context(&self) -> &InstallContext {
        &self.ctx
    }

    /// Run every step in order
    pub async fn run(&mut self) -> PipelineReport {
        let mut completed = Vec::new();
        let mut failures = Vec::new();

        for step in Step::ALL {
            info!("");
            info!("  *** {} ***", step);

            match self.run_step(step).await {
                Ok(()) => {
                    self.state = step.reached();
                    completed.push(step);
                }
                Err(e) => {
                    error!("{} failed: {:#}", step, e);
                    failures.push(StepFailure {
                        step,
                        message: format!("{:#}", e),
                    });
                    if self.strict {
                        self.state = PipelineState::Failed;
                        break;
                    }
                }
            }
        }

        if self.state != PipelineState::Failed {
            self.state = PipelineState::Done;
        }

        PipelineReport {
            state: self.state,
            completed,
            failures,
            strict: self.strict,
        }
    }

    async fn run_step(&self, step: Step) -> Result<()> {
        match step {
            Step::PortalExtract => {
                self.portal.extract(&self.ctx).await?;
                Ok(())
            }
            Step::PortalConfigure => self.portal.configure(&self.ctx, self.database.as_ref()).await,
            Step::ServerExtract => self.server.extract(&self.ctx).await,
            Step::ServerConfigure => self.server.configure(&self.ctx).await,
        }
    }
}
