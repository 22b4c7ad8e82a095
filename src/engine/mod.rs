// ==========================================
// 模具管理系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// ==========================================

pub mod lifecycle;

// 重导出核心引擎
pub use lifecycle::{MoldLifecycleEngine, Transition, TransitionRejection};
