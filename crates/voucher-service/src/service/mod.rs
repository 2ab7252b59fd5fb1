//! 服务层
//!
//! 实现目录管理与积分兑换业务逻辑，协调仓储层。
//!
//! ## 模块结构
//!
//! - `dto`: 服务层入参定义
//! - `catalog_service`: 品牌与券的创建和查询
//! - `redemption_service`: 积分兑换核心事务

pub mod catalog_service;
pub mod dto;
pub mod redemption_service;

pub use catalog_service::CatalogService;
pub use dto::*;
pub use redemption_service::RedemptionService;
