pub mod app_config;
pub mod database;
pub mod reservation_repo;

pub use database::DbClient;
pub use reservation_repo::PgStore;
