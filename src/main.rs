//! Walletgate application entry point.
//!
//! Bootstraps the server:
//! 1. Load configuration from environment (fatal if the secret is absent)
//! 2. Build the authenticator and shared state
//! 3. Spawn the challenge-store sweep task
//! 4. Build router and start the Axum server
//!
//! Also supports a `keygen` subcommand that prints a throwaway wallet
//! keypair for exercising the API by hand.

use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use walletgate::{
    auth::{middleware::AppState, store, Authenticator},
    config::Config,
    routes,
};

/// Generate a throwaway Ed25519 wallet keypair for manual testing.
///
/// Prints the base58 address (the public key, as wallets display it) and
/// the base64 seed a test client can sign with.
fn keygen() {
    use base64::{engine::general_purpose, Engine as _};
    use ed25519_dalek::SigningKey;
    use rand::Rng;

    let mut seed = [0u8; 32];
    rand::rng().fill(&mut seed);
    let signing_key = SigningKey::from_bytes(&seed);

    println!(
        "address: {}",
        bs58::encode(signing_key.verifying_key().as_bytes()).into_string()
    );
    println!("seed:    {}", general_purpose::STANDARD.encode(seed));
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && args[1] == "keygen" {
        keygen();
        return;
    }

    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config from environment; a missing secret must not serve requests
    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = %e, "Configuration error, refusing to start");
            std::process::exit(1);
        }
    };
    tracing::info!("Starting walletgate on {}", config.bind_addr);

    // Build shared state
    let auth = Arc::new(Authenticator::new(Arc::clone(&config)));
    let state = AppState {
        auth: Arc::clone(&auth),
        config: Arc::clone(&config),
    };

    // Periodically purge expired challenges nobody presented
    tokio::spawn(store::run_sweep_loop(
        auth.store(),
        Duration::from_secs(config.sweep_interval_secs),
    ));

    // Explicit CORS: deny all cross-origin requests (single-origin
    // deployment; the domain bound into the message is the only caller).
    let cors = CorsLayer::new();

    let app = routes::api_router().layer(cors).with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
