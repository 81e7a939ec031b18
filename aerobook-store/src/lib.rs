pub mod app_config;
pub mod database;
pub mod flight_repo;
pub mod booking_repo;
pub mod promotion_repo;
pub mod memory;
pub mod redis_repo;
pub mod seed;

pub use app_config::Config;
pub use database::DbClient;
pub use redis_repo::RedisClient;
