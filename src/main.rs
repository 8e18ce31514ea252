use driver_leads::store::Store as _;
use driver_leads::{build_axum_router, config, App};
use error_stack::{Result, ResultExt};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
#[error("Could not start Driver Leads HTTP server")]
struct StartError;

#[tracing::instrument(skip_all, name = "server.run")]
async fn start_server(config: config::Server) -> Result<(), StartError> {
    let app = App::new(config).change_context(StartError)?;
    app.store
        .setup()
        .await
        .change_context(StartError)
        .attach_printable("could not run database migrations")?;

    let listener = TcpListener::bind((app.config.ip, app.config.port))
        .await
        .change_context(StartError)
        .attach_printable("could not bind server with address and port")?;

    let addr = listener
        .local_addr()
        .change_context(StartError)
        .attach_printable("could not get socket address of the server")?;

    info!("Driver Leads HTTP server is listening at http://{addr}");

    axum::serve(listener, build_axum_router(app).into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received graceful shutdown signal. Shutting down server...");
        })
        .await
        .change_context(StartError)
        .attach_printable("could not serve Driver Leads HTTP service")?;

    Ok(())
}

fn run() -> Result<(), StartError> {
    let config = config::Server::load().change_context(StartError)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("driver_leads=debug,info")),
        )
        .init();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .change_context(StartError)?;

    rt.block_on(start_server(config))
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}
