//! 配置管理模块

pub mod env;
pub mod log;
pub mod settings;

// 重新导出
pub use env::*;
pub use settings::AppConfig;
