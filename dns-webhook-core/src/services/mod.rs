//! 业务逻辑服务层

mod apply_service;
mod change_executor;
mod record_service;

pub use apply_service::ApplyService;
pub use change_executor::{CategoryRun, ChangeExecutor};
pub use record_service::RecordService;
