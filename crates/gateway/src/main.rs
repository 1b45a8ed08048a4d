use {
    clap::Parser,
    gateway::{
        api::{self, AppState},
        arguments::Arguments,
    },
    shared::{
        http_client::HttpClientFactory,
        oneinch_api::{OneInchApi, OneInchClient},
        token_catalog::TokenCatalog,
    },
    std::sync::Arc,
};

#[tokio::main]
async fn main() {
    let args = Arguments::parse();
    observe::tracing::initialize(&args.logging.log_filter, args.logging.log_stderr_threshold);
    tracing::info!("running swap gateway with validated arguments:\n{}", args);

    let http_factory = HttpClientFactory::new(&args.http_client);
    let oneinch: Arc<dyn OneInchApi> = Arc::new(
        OneInchClient::new(
            args.one_inch_url.clone(),
            args.one_inch_api_key.clone(),
            args.default_provider.clone(),
            args.default_country.clone(),
            http_factory.create(),
        )
        .expect("invalid 1inch API base URL"),
    );
    let state = Arc::new(AppState {
        catalog: TokenCatalog::new(oneinch.clone()),
        oneinch,
        default_chain_id: args.default_chain_id,
    });
    let router = api::handle_all_routes(state, &args.frontend_url);

    let listener = tokio::net::TcpListener::bind(args.bind_address)
        .await
        .expect("failed to bind API address");
    tracing::info!(bind_address = %args.bind_address, "serving swap gateway API");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("API task failed");
}

#[cfg(unix)]
async fn shutdown_signal() {
    // Intercept main signals for graceful shutdown.
    // Kubernetes sends sigterm, whereas locally sigint (ctrl-c) is most common.
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to install signal handler");
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .expect("failed to install signal handler");
    tokio::select! {
        _ = sigterm.recv() => (),
        _ = sigint.recv() => (),
    }
}

#[cfg(windows)]
async fn shutdown_signal() {
    // We don't support signal handling on windows.
    std::future::pending().await
}
