use parkvault::{file_manager, init_tracing, Config};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env().expect("Failed to load configuration");
    let state = file_manager::FileManagerState::new(&config);
    state
        .store
        .ensure_root()
        .await
        .expect("Failed to create upload directory");
    tracing::info!("Storing uploads in {}", state.store.root().display());

    let app = file_manager::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("File manager running on http://{}", config.bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}
