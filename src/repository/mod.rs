// ==========================================
// 配送线路看板 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod state_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use state_repo::{StateRepository, FAILURE_COUNTS_KEY, RECORDS_KEY};
