// ==========================================
// 模具管理系统 - API 层
// ==========================================
// 职责: 对外业务接口, 供命令行入口及集成方调用
// ==========================================

pub mod error;
pub mod dashboard_api;
pub mod mold_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use dashboard_api::DashboardApi;
pub use mold_api::{MoldApi, TransitionOutcome};
