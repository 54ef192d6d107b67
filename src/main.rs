use std::{process, sync::Arc};

use tokio::net::TcpListener;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use vetrina::{
    application::{
        chrome::ChromeService,
        error::AppError,
        highlight::{HighlightConfig, configure_highlighting, highlight_service},
        newsletter::NewsletterService,
        site::SiteService,
    },
    config,
    domain::docs,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        list_service::list_transport_from_settings,
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("configuration did not load: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;
    configure_highlighting(HighlightConfig::from(&settings.render))
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = build_application_state(&settings)?;
    serve_http(&settings, state).await
}

fn build_application_state(settings: &config::Settings) -> Result<HttpState, AppError> {
    let site = Arc::new(SiteService::new(highlight_service()));
    site.warm()?;
    info!(
        target = "vetrina::startup",
        docs = docs::all().len(),
        "Rendered compiled-in content"
    );

    let chrome = Arc::new(ChromeService::new(settings.site.clone()));

    let transport = list_transport_from_settings(&settings.newsletter).map_err(AppError::from)?;
    let newsletter = Arc::new(NewsletterService::new(transport));

    Ok(HttpState {
        site,
        chrome,
        newsletter,
        trust_remote_markup: settings.newsletter.trust_remote_markup,
    })
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "vetrina::startup",
        addr = %settings.server.addr,
        "Listening for connections"
    );

    let grace = settings.server.graceful_shutdown;
    let (drain_started, mut drain_watch) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            shutdown_signal().await;
            let _ = drain_started.send(true);
        },
    );

    // The server future resolves once in-flight connections drain; dropping it
    // at the deadline closes whatever is still open.
    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = async {
            let _ = drain_watch.wait_for(|draining| *draining).await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(
                target = "vetrina::shutdown",
                deadline_seconds = grace.as_secs(),
                "Drain deadline reached; closing remaining connections"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(target = "vetrina::shutdown", "Shutdown signal received"),
        Err(err) => {
            error!(
                target = "vetrina::shutdown",
                error = %err,
                "Failed to install the shutdown signal handler"
            );
            std::future::pending::<()>().await;
        }
    }
}
