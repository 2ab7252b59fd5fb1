//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use voucher_core::{
    CatalogRepository, CatalogService, InMemoryStore, RedemptionRepository, RedemptionService,
};
use voucher_shared::database::Database;

/// Axum 应用共享状态
///
/// 服务在启动时构造一次，通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<CatalogService>,
    pub redemption_service: Arc<RedemptionService>,
    /// 就绪探针使用；内存存储模式下为 None
    pub database: Option<Database>,
}

impl AppState {
    pub fn new(
        catalog_service: Arc<CatalogService>,
        redemption_service: Arc<RedemptionService>,
    ) -> Self {
        Self {
            catalog_service,
            redemption_service,
            database: None,
        }
    }

    /// 基于 PostgreSQL 构造
    pub fn with_postgres(db: Database) -> Self {
        let pool = db.pool().clone();
        let catalog_repo = Arc::new(CatalogRepository::new(pool.clone()));
        let redemption_repo = Arc::new(RedemptionRepository::new(pool));

        Self {
            catalog_service: Arc::new(CatalogService::new(catalog_repo)),
            redemption_service: Arc::new(RedemptionService::new(redemption_repo)),
            database: Some(db),
        }
    }

    /// 基于内存存储构造
    pub fn with_memory(store: InMemoryStore) -> Self {
        Self::new(
            Arc::new(CatalogService::new(Arc::new(store.clone()))),
            Arc::new(RedemptionService::new(Arc::new(store))),
        )
    }
}
