//! Inspection CLI for live wizard instances
//!
//! The HTTP application owns the user-facing flow; this binary is the ops
//! surface for looking at and unwinding an in-flight instance directly.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::cache::CacheStore;
use crate::domain::wizard::{InstanceId, KeyBuilder, StepTracker, WizardSession, WorkflowName};
use crate::infrastructure::CacheBackendFactory;

#[derive(Parser)]
#[command(name = "wizard-store", about = "Inspect and operate on wizard instances")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the debug snapshot of an instance
    Dump {
        workflow: String,
        instance: String,
    },
    /// Undo the most recent step of an instance, purging its data
    Undo {
        workflow: String,
        instance: String,
    },
    /// Purge an instance's entire namespace
    Purge {
        workflow: String,
        instance: String,
    },
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let backend = config.cache.backend_config()?;
    let store = CacheBackendFactory::create(&backend).await?;

    match cli.command {
        Command::Dump { workflow, instance } => dump(store, &workflow, &instance).await,
        Command::Undo { workflow, instance } => undo(store, &workflow, &instance).await,
        Command::Purge { workflow, instance } => purge(store, &workflow, &instance).await,
    }
}

async fn dump(
    store: Arc<dyn CacheStore>,
    workflow: &str,
    instance: &str,
) -> anyhow::Result<()> {
    let workflow = WorkflowName::new(workflow)?;
    let instance = InstanceId::new(instance)?;
    let keys = KeyBuilder::new(&workflow, &instance);

    let mut tracker = StepTracker::new(Arc::clone(&store), &keys);
    match tracker.peek_last().await? {
        None => println!("no steps recorded for {}:{}", workflow, instance),
        Some(step) => {
            // Re-entering the last recorded step leaves the trail unchanged
            let mut session =
                WizardSession::begin(store, workflow, Some(instance), step).await?;
            println!("{}", session.debug_snapshot().await?);
        }
    }

    Ok(())
}

async fn undo(
    store: Arc<dyn CacheStore>,
    workflow: &str,
    instance: &str,
) -> anyhow::Result<()> {
    let workflow = WorkflowName::new(workflow)?;
    let instance = InstanceId::new(instance)?;

    match WizardSession::undo_last_step(store, &workflow, &instance).await? {
        Some(step) => println!("undone; current step is now '{}'", step),
        None => println!("step trail is empty"),
    }

    Ok(())
}

async fn purge(
    store: Arc<dyn CacheStore>,
    workflow: &str,
    instance: &str,
) -> anyhow::Result<()> {
    let workflow = WorkflowName::new(workflow)?;
    let instance = InstanceId::new(instance)?;
    let keys = KeyBuilder::new(&workflow, &instance);

    let removed = store.delete_by_prefix(&keys.instance_pattern()).await?;
    println!("removed {} keys under {}:{}", removed, workflow, instance);

    Ok(())
}
