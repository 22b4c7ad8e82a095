// ==========================================
// 模具管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod mold;
pub mod mold_log;
pub mod types;

// 重导出核心类型
pub use mold::{derive_mold_id, Assignment, Mold, MoldState, MoldUsageMonitor};
pub use mold_log::MoldLog;
pub use types::{MoldAction, MoldStatus, TransitionPolicy};
