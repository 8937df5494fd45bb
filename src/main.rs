// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, Result};
use clap::Parser;
use kube::Client;
use kube_lease_manager::LeaseManagerBuilder;
use msop::{
    config::OperatorConfig,
    constants::TOKIO_WORKER_THREADS,
    context::Context,
    controller::run_controller,
    controlplane::ControlPlaneClient,
    crd::{Kafka, PostgreSQL},
    kinds::{
        ConnectionPoolAdapter, DatabaseAdapter, KafkaAclAdapter, KafkaTopicAdapter,
        ProjectVpcAdapter, ServiceAdapter, ServiceIntegrationAdapter, ServiceUserAdapter,
    },
    metrics,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    let config = OperatorConfig::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("msop-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or `text`).
fn initialize_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(config: OperatorConfig) -> Result<()> {
    initialize_logging();
    info!("Starting managed service operator");

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    config.validate().map_err(|e| anyhow!("invalid configuration: {e}"))?;
    debug!(
        api_url = %config.api_url,
        concurrency = config.concurrency,
        leader_election = config.leader_election,
        "Configuration validated"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    let control_plane = ControlPlaneClient::new(&config.api_url, config.api_token.clone())?
        .with_retry_window(config.api_retry_window());
    let context = Arc::new(Context::new(client.clone(), control_plane, config.settings()));

    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = metrics::serve(metrics_port).await {
            error!("Metrics server failed: {e:#}");
        }
    });

    if config.leader_election {
        run_as_leader(&config, client, context).await
    } else {
        metrics::set_ready(true);
        run_until_shutdown(context, config.concurrency).await
    }
}

/// Wait for the lease, then run the controllers until shutdown or until the lease is lost.
async fn run_as_leader(
    config: &OperatorConfig,
    client: Client,
    context: Arc<Context>,
) -> Result<()> {
    let identity = config.leader_identity();
    let manager = LeaseManagerBuilder::new(client, &config.lease_name)
        .with_namespace(&config.lease_namespace)
        .with_identity(&identity)
        .with_duration(config.lease_duration_secs)
        .build()
        .await?;
    let (mut leader, lease_task) = manager.watch().await;

    info!(
        lease = %config.lease_name,
        namespace = %config.lease_namespace,
        identity = %identity,
        "Waiting for leader lease"
    );
    while !*leader.borrow_and_update() {
        leader.changed().await?;
    }
    info!(identity = %identity, "Acquired leader lease");
    metrics::record_leader_elected(&identity);
    metrics::set_ready(true);

    let result = tokio::select! {
        result = run_until_shutdown(context, config.concurrency) => result,
        () = lost_leadership(&mut leader) => {
            metrics::record_leader_lost(&identity);
            metrics::set_ready(false);
            Err(anyhow!("lost leader lease {}", config.lease_name))
        }
    };

    // Dropping the receiver releases the lease.
    drop(leader);
    match lease_task.await {
        Ok(Ok(_)) => debug!("Released leader lease"),
        Ok(Err(e)) => warn!("Failed to release leader lease: {e}"),
        Err(e) => warn!("Lease task panicked: {e}"),
    }
    result
}

/// Resolves once the lease holder flag turns false or the lease task goes away.
async fn lost_leadership(leader: &mut watch::Receiver<bool>) {
    loop {
        if leader.changed().await.is_err() {
            return;
        }
        if !*leader.borrow_and_update() {
            return;
        }
    }
}

/// Resolves on SIGTERM or Ctrl+C.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM (pod termination), initiating graceful shutdown...");
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C, initiating graceful shutdown...");
    }
    Ok(())
}

async fn run_until_shutdown(context: Arc<Context>, concurrency: u16) -> Result<()> {
    tokio::select! {
        result = run_all_controllers(context, concurrency) => result,
        result = shutdown_signal() => {
            result?;
            info!("Graceful shutdown completed successfully");
            Ok(())
        }
    }
}

/// Controllers should never exit. If one does, log it and turn it into an error.
fn controller_exited(kind: &str, result: Result<()>) -> Result<()> {
    error!("CRITICAL: {kind} controller exited unexpectedly: {result:?}");
    result?;
    anyhow::bail!("{kind} controller exited unexpectedly without error")
}

async fn run_all_controllers(context: Arc<Context>, concurrency: u16) -> Result<()> {
    let cluster = context.cluster();
    info!("Starting all controllers");

    tokio::select! {
        result = run_controller(
            context.clone(),
            ServiceAdapter::<PostgreSQL>::new(cluster.clone()),
            concurrency,
        ) => controller_exited("PostgreSQL", result),
        result = run_controller(
            context.clone(),
            ServiceAdapter::<Kafka>::new(cluster.clone()),
            concurrency,
        ) => controller_exited("Kafka", result),
        result = run_controller(
            context.clone(),
            ServiceUserAdapter::new(cluster.clone()),
            concurrency,
        ) => controller_exited("ServiceUser", result),
        result = run_controller(
            context.clone(),
            DatabaseAdapter::new(cluster.clone()),
            concurrency,
        ) => controller_exited("Database", result),
        result = run_controller(
            context.clone(),
            ConnectionPoolAdapter::new(cluster.clone()),
            concurrency,
        ) => controller_exited("ConnectionPool", result),
        result = run_controller(
            context.clone(),
            KafkaTopicAdapter::new(cluster.clone()),
            concurrency,
        ) => controller_exited("KafkaTopic", result),
        result = run_controller(
            context.clone(),
            KafkaAclAdapter::new(cluster.clone()),
            concurrency,
        ) => controller_exited("KafkaACL", result),
        result = run_controller(
            context.clone(),
            ProjectVpcAdapter::new(cluster.clone()),
            concurrency,
        ) => controller_exited("ProjectVPC", result),
        result = run_controller(
            context.clone(),
            ServiceIntegrationAdapter::new(cluster),
            concurrency,
        ) => controller_exited("ServiceIntegration", result),
    }
}
