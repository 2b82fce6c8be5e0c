mod codec;
mod config;
mod deployments;
mod logs;
mod migrate;
mod sequences;
mod store;

pub use migrate::run_migrations;
pub use store::PostgresStore;
