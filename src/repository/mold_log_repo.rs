// ==========================================
// 模具管理系统 - 模具履历数据仓储
// ==========================================
// 对齐: mold_log 表
// 红线: 只追加, 不提供更新/删除
// ==========================================

mod core;
mod queries;


pub use self::core::MoldLogRepository;
pub(crate) use self::core::insert_log;
