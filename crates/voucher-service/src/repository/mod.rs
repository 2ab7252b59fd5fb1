//! 存储网关
//!
//! 提供品牌、券、客户、兑换单的数据访问接口，封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 每个操作要么完整生效，要么对所涉及的行没有任何影响
//! - 兑换事务由服务层通过 [`RedemptionTx`] 驱动，未提交即丢弃时自动回滚
//! - 定义 trait 接口，PostgreSQL 与内存实现遵循同一契约

mod catalog_repo;
pub mod memory;
mod redemption_repo;
mod traits;

pub use catalog_repo::CatalogRepository;
pub use memory::InMemoryStore;
pub use redemption_repo::{PgRedemptionTx, RedemptionRepository};
pub use traits::*;
