//! 券兑换核心服务
//!
//! 提供品牌、券目录管理以及积分兑换券的核心事务逻辑。
//!
//! ## 核心功能
//!
//! - **目录管理**：创建品牌、创建券、按 ID 或品牌查询券
//! - **积分兑换**：在单个事务内校验库存与积分、写入兑换明细、扣减库存与积分
//! - **兑换查询**：按兑换单 ID 查询兑换结果及明细
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 存储网关（PostgreSQL 实现与内存实现）
//! - `service`: 业务服务层

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{EntityKind, Result, VoucherError};
pub use models::*;
pub use repository::{
    CatalogRepository, CatalogRepositoryTrait, InMemoryStore, RedemptionRepository,
    RedemptionRepositoryTrait, RedemptionTx,
};
pub use service::{CatalogService, RedemptionLine, RedemptionRequest, RedemptionService};
