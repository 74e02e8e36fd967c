// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{routing::get, Router};
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use silence_operator::{
    alertmanager::Alertmanager,
    config::OperatorConfig,
    constants::{
        ERROR_REQUEUE_DURATION_SECS, KIND_RECURRING_SILENCE, KIND_SILENCE,
        METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PATH, METRICS_SERVER_PORT,
        SILENCE_REQUEUE_DURATION_SECS, TOKIO_WORKER_THREADS,
    },
    crd::{v1alpha1, v1alpha2},
    metrics,
    reconcilers::{
        reconcile_recurring_silence, reconcile_silence, reconcile_silence_v2, Context,
    },
    service::{Clock, SilenceService, SystemClock},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("silence-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initialize logging with custom format
///
/// Respects `RUST_LOG` environment variable if set, otherwise defaults to INFO level.
/// Respects `RUST_LOG_FORMAT` environment variable for output format (json or text).
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

    info!("Starting Alertmanager Silence Operator");
}

async fn async_main() -> Result<()> {
    initialize_logging();

    let config = OperatorConfig::load()?;
    let alertmanager = Alertmanager::new(config.alertmanager.clone())?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = SilenceService::new(Arc::new(alertmanager), clock.clone());

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    let context = Arc::new(Context {
        client: client.clone(),
        service,
        clock,
        config,
    });

    // Start the metrics HTTP server
    let _metrics_handle = start_metrics_server();

    run_controllers(client, context).await
}

/// Start the Prometheus metrics HTTP server
///
/// Serves metrics on the configured port and path (default: 0.0.0.0:8080/metrics)
fn start_metrics_server() -> tokio::task::JoinHandle<()> {
    info!(
        bind_address = METRICS_SERVER_BIND_ADDRESS,
        port = METRICS_SERVER_PORT,
        path = METRICS_SERVER_PATH,
        "Starting Prometheus metrics HTTP server"
    );

    tokio::spawn(async move {
        async fn metrics_handler() -> String {
            match metrics::gather_metrics() {
                Ok(metrics_text) => metrics_text,
                Err(e) => {
                    error!("Failed to gather metrics: {}", e);
                    String::from("# Error gathering metrics\n")
                }
            }
        }

        let app = Router::new().route(METRICS_SERVER_PATH, get(metrics_handler));

        let bind_addr = format!("{METRICS_SERVER_BIND_ADDRESS}:{METRICS_SERVER_PORT}");
        let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind metrics server to {bind_addr}: {e}");
                return;
            }
        };

        info!("Metrics server listening on http://{bind_addr}{METRICS_SERVER_PATH}");

        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {e}");
        }
    })
}

/// Run all controllers with signal handling
///
/// Controllers should never exit on their own - if one does, the process
/// exits so the orchestrator can restart it.
async fn run_controllers(client: Client, context: Arc<Context>) -> Result<()> {
    info!("Starting all controllers with signal handling");

    let shutdown_result: Result<()> = tokio::select! {
        // Monitor for SIGINT (Ctrl+C)
        result = tokio::signal::ctrl_c() => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
            result.map_err(anyhow::Error::from)
        }

        // Monitor for SIGTERM (Kubernetes sends this when deleting pods)
        result = async {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut sigterm = signal(SignalKind::terminate())?;
                sigterm.recv().await;
                Ok::<(), anyhow::Error>(())
            }
            #[cfg(not(unix))]
            {
                // On non-Unix platforms, just wait forever
                std::future::pending::<()>().await;
                Ok::<(), anyhow::Error>(())
            }
        } => {
            info!("Received SIGTERM (pod termination), initiating graceful shutdown...");
            result
        }

        result = run_all_controllers(client, context) => {
            result
        }
    };

    shutdown_result?;
    info!("Graceful shutdown completed successfully");

    Ok(())
}

/// Run the three controllers concurrently
async fn run_all_controllers(client: Client, context: Arc<Context>) -> Result<()> {
    tokio::select! {
        result = run_silence_controller(client.clone(), context.clone()) => {
            error!("CRITICAL: Silence controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Silence controller exited unexpectedly without error")
        }
        result = run_silence_v2_controller(client.clone(), context.clone()) => {
            error!("CRITICAL: Silence v1alpha2 controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Silence v1alpha2 controller exited unexpectedly without error")
        }
        result = run_recurring_silence_controller(client, context) => {
            error!("CRITICAL: RecurringSilence controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("RecurringSilence controller exited unexpectedly without error")
        }
    }
}

/// Watcher configuration carrying the optional silence label selector.
fn silence_watcher_config(context: &Context) -> watcher::Config {
    let config = watcher::Config::default();
    if context.config.silence_selector.is_empty() {
        config
    } else {
        config.labels(&context.config.silence_selector)
    }
}

/// Run the legacy (cluster-scoped) `Silence` controller
async fn run_silence_controller(client: Client, context: Arc<Context>) -> Result<()> {
    info!("Starting Silence v1alpha1 controller");

    let api = Api::<v1alpha1::Silence>::all(client);

    Controller::new(api, silence_watcher_config(&context))
        .run(reconcile_silence_wrapper, error_policy_silence, context)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the namespaced `Silence` controller
async fn run_silence_v2_controller(client: Client, context: Arc<Context>) -> Result<()> {
    info!("Starting Silence v1alpha2 controller");

    let api = Api::<v1alpha2::Silence>::all(client);

    Controller::new(api, silence_watcher_config(&context))
        .run(reconcile_silence_v2_wrapper, error_policy_silence_v2, context)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the `RecurringSilence` controller, watching its child silences
async fn run_recurring_silence_controller(client: Client, context: Arc<Context>) -> Result<()> {
    info!("Starting RecurringSilence controller");

    let api = Api::<v1alpha2::RecurringSilence>::all(client.clone());
    let child_api = Api::<v1alpha2::Silence>::all(client);

    Controller::new(api, watcher::Config::default())
        .owns(child_api, watcher::Config::default())
        .run(
            reconcile_recurring_silence_wrapper,
            error_policy_recurring,
            context,
        )
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for legacy `Silence`
async fn reconcile_silence_wrapper(
    silence: Arc<v1alpha1::Silence>,
    context: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();

    let result = reconcile_silence(&context, &silence).await;
    let duration = start.elapsed();

    match result {
        Ok(()) => {
            debug!("Successfully reconciled Silence: {}", silence.name_any());
            metrics::record_reconciliation_success(KIND_SILENCE, duration);
            Ok(Action::requeue(Duration::from_secs(
                SILENCE_REQUEUE_DURATION_SECS,
            )))
        }
        Err(e) => {
            error!("Failed to reconcile Silence {}: {:?}", silence.name_any(), e);
            metrics::record_reconciliation_error(KIND_SILENCE, duration);
            Err(e.into())
        }
    }
}

/// Reconcile wrapper for namespaced `Silence`
async fn reconcile_silence_v2_wrapper(
    silence: Arc<v1alpha2::Silence>,
    context: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();

    let result = reconcile_silence_v2(&context, &silence).await;
    let duration = start.elapsed();

    match result {
        Ok(()) => {
            debug!("Successfully reconciled Silence: {}", silence.name_any());
            metrics::record_reconciliation_success(KIND_SILENCE, duration);
            Ok(Action::requeue(Duration::from_secs(
                SILENCE_REQUEUE_DURATION_SECS,
            )))
        }
        Err(e) => {
            error!("Failed to reconcile Silence {}: {:?}", silence.name_any(), e);
            metrics::record_reconciliation_error(KIND_SILENCE, duration);
            Err(e.into())
        }
    }
}

/// Reconcile wrapper for `RecurringSilence`
async fn reconcile_recurring_silence_wrapper(
    recurring: Arc<v1alpha2::RecurringSilence>,
    context: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();

    let result = reconcile_recurring_silence(&context, &recurring).await;
    let duration = start.elapsed();

    match result {
        Ok(action) => {
            debug!(
                "Successfully reconciled RecurringSilence: {}",
                recurring.name_any()
            );
            metrics::record_reconciliation_success(KIND_RECURRING_SILENCE, duration);
            Ok(action)
        }
        Err(e) => {
            error!(
                "Failed to reconcile RecurringSilence {}: {:?}",
                recurring.name_any(),
                e
            );
            metrics::record_reconciliation_error(KIND_RECURRING_SILENCE, duration);
            Err(e.into())
        }
    }
}

/// Generic error policy for all controllers: requeue after a fixed delay.
fn error_policy<T>(_resource: Arc<T>, _err: &ReconcileError, _context: Arc<Context>) -> Action
where
    T: std::fmt::Debug,
{
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Error policy for the legacy `Silence` controller.
fn error_policy_silence(
    resource: Arc<v1alpha1::Silence>,
    err: &ReconcileError,
    context: Arc<Context>,
) -> Action {
    error_policy(resource, err, context)
}

/// Error policy for the namespaced `Silence` controller.
fn error_policy_silence_v2(
    resource: Arc<v1alpha2::Silence>,
    err: &ReconcileError,
    context: Arc<Context>,
) -> Action {
    error_policy(resource, err, context)
}

/// Error policy for the `RecurringSilence` controller.
fn error_policy_recurring(
    resource: Arc<v1alpha2::RecurringSilence>,
    err: &ReconcileError,
    context: Arc<Context>,
) -> Action {
    error_policy(resource, err, context)
}
