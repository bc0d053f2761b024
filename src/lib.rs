pub mod app_config;
pub mod error;
pub mod filing;
pub mod task;
pub mod time_util;

pub use app_config::AppConfig;
pub use error::{AppError, AppResult};
pub use filing::RunContext;
