use parkvault::{init_tracing, rental, Config};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env().expect("Failed to load configuration");
    let state = rental::RentalState::new(&config);
    state.db.init().expect("Failed to initialise database");

    let app = rental::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Park rental running on http://{}", config.bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}
