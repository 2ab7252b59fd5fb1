//! PostgreSQL 连接池
//!
//! 服务启动时建立连接池、按需执行迁移，就绪探针通过 `health_check` 检查连通性。

use std::time::Duration;

use sqlx::Connection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::config::DatabaseConfig;
use crate::error::Result;

/// 连接池句柄，克隆后共享同一个池
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    #[instrument(skip_all, fields(
        max_connections = config.max_connections,
        min_connections = config.min_connections
    ))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await?;

        info!("数据库连接池已建立");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 从池中取一个连接并 ping
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    /// 应用 migrations/ 下的 schema 迁移，已执行过的版本会被跳过
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<()> {
        let migrator = sqlx::migrate!("../../migrations");
        info!(known = migrator.iter().count(), "执行数据库迁移");
        migrator.run(&self.pool).await?;
        Ok(())
    }

    /// 等待已借出的连接归还后关闭连接池
    pub async fn close(&self) {
        self.pool.close().await;
        info!("数据库连接池已关闭");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_database_config;

    #[tokio::test]
    #[ignore] // 需要数据库连接
    async fn test_connect_migrate_and_ping() {
        let db = Database::connect(&test_database_config()).await.unwrap();

        db.run_migrations().await.unwrap();
        // 重复执行不应报错
        db.run_migrations().await.unwrap();
        db.health_check().await.unwrap();

        db.close().await;
        assert!(db.health_check().await.is_err());
    }
}
