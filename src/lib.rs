//! Two small web applications sharing one crate:
//!
//! - [`file_manager`]: upload, list, download and delete files kept in a flat
//!   directory under timestamped names.
//! - [`rental`]: the park-rental booking flow (login, entry ticket, vehicle
//!   choice, payment) backed by SQLite.
//!
//! Each app ships as its own binary and takes an explicit [`Config`].

pub mod config;
pub mod db;
pub mod error;
pub mod file_manager;
pub mod flash;
pub mod models;
pub mod rental;
pub mod uploads;
pub mod views;

pub use config::Config;
pub use error::AppError;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parkvault=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
