// ==========================================
// 模具管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod memory_store;
pub mod mold_log_repo;
pub mod mold_repo;
pub mod store;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use memory_store::InMemoryMoldStore;
pub use mold_log_repo::MoldLogRepository;
pub use mold_repo::MoldRepository;
pub use store::{MoldStatusCounts, MoldStore, MoldWrite};
