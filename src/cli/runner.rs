//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::gateway::{RestGateway, SharePointGateway};
use crate::output::{JsonLinesWriter, ParquetTableWriter, ParquetWriterConfig};
use crate::spec::Spec;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Discover => self.discover().await,
            Commands::Sync { output, batch_size } => {
                self.sync(output.as_deref(), *batch_size).await
            }
            Commands::Validate => self.validate(),
        }
    }

    /// Load and prepare the source config
    fn load_spec(&self) -> Result<Spec> {
        let spec = if let Some(json_str) = &self.cli.config_json {
            Spec::from_json_str(json_str)?
        } else if let Some(path) = &self.cli.config {
            Spec::from_file(path)?
        } else {
            return Err(Error::config(
                "no configuration given, use --config or --config-json",
            ));
        };
        spec.prepare()
    }

    fn gateway(spec: &Spec) -> Result<Arc<dyn SharePointGateway>> {
        Ok(Arc::new(RestGateway::from_spec(spec)?))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let spec = self.load_spec()?;
        self.output_message(&json!({
            "type": "SPEC",
            "spec": spec.redacted()
        }));
        Ok(())
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let spec = self.load_spec()?;
        let gateway = Self::gateway(&spec)?;
        info!(site = %spec.site_url, "checking connection");

        let status = match gateway.list_all().await {
            Ok(lists) => json!({
                "status": "SUCCEEDED",
                "message": format!("Connection successful, {} lists visible", lists.len())
            }),
            Err(e) => json!({
                "status": "FAILED",
                "message": format!("Connection failed: {e}")
            }),
        };
        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": status
        }));
        Ok(())
    }

    /// Discover table schemas
    async fn discover(&self) -> Result<()> {
        let spec = self.load_spec()?;
        let gateway = Self::gateway(&spec)?;
        let engine = SyncEngine::new(spec, gateway);

        let tables = engine.discover().await?;
        let schemas: Vec<_> = tables.iter().map(|t| &t.schema).collect();
        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": { "tables": schemas }
        }));
        Ok(())
    }

    /// Sync all tables
    async fn sync(&self, output: Option<&Path>, batch_size: usize) -> Result<()> {
        let spec = self.load_spec()?;
        let gateway = Self::gateway(&spec)?;
        let mut engine = SyncEngine::new(spec, gateway);

        let tables = engine.discover().await?;
        let schemas: Vec<_> = tables.iter().map(|t| t.schema.clone()).collect();

        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling sync");
                on_signal.cancel();
            }
        });

        let result = match output {
            Some(dir) => {
                let writer = ParquetTableWriter::new(
                    dir,
                    &schemas,
                    ParquetWriterConfig::new().with_batch_size(batch_size),
                )?;
                let result = engine.sync_tables(&tables, &writer, cancel).await;
                // Rows already handed over are kept even when the run failed.
                let files = writer.finish()?;
                info!(files = files.len(), dir = %dir.display(), "parquet output complete");
                result
            }
            None => {
                let writer = JsonLinesWriter::new(std::io::stdout(), &schemas);
                engine.sync_tables(&tables, &writer, cancel).await
            }
        };

        let stats = engine.stats();
        self.output_message(&json!({
            "type": "STATS",
            "stats": stats
        }));
        result
    }

    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
