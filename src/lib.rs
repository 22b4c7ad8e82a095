// ==========================================
// 模具管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 模具台账 + 生命周期状态机 + 履历追踪
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 生命周期规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{MoldAction, MoldStatus, TransitionPolicy};

// 领域实体
pub use domain::{Assignment, Mold, MoldLog, MoldState, MoldUsageMonitor};

// 存储
pub use repository::{InMemoryMoldStore, MoldRepository, MoldStore};

// 引擎
pub use engine::MoldLifecycleEngine;

// API
pub use api::{ApiError, ApiResult, DashboardApi, MoldApi, TransitionOutcome};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "模具管理系统";

// 数据库版本
pub const DB_VERSION: &str = "v1";
