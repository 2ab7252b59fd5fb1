//! 测试工具模块
//!
//! 提供集成测试所需的配置和唯一标识生成辅助函数。

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{DEFAULT_DATABASE_URL, DatabaseConfig};

/// 创建测试用数据库配置
///
/// 优先使用 TEST_DATABASE_URL，其次 DATABASE_URL，否则使用默认库
pub fn test_database_config() -> DatabaseConfig {
    let url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
        connect_timeout_seconds: 10,
        idle_timeout_seconds: 300,
        run_migrations: true,
    }
}

/// 生成唯一后缀
///
/// 使用时间戳加原子计数器，确保并行测试生成的券码不冲突
pub fn unique_suffix() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{}-{}", nanos, COUNTER.fetch_add(1, Ordering::SeqCst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_suffix_differs() {
        assert_ne!(unique_suffix(), unique_suffix());
    }

    #[test]
    fn test_database_config_pool_size() {
        let config = test_database_config();
        assert_eq!(config.max_connections, 5);
        assert!(!config.url.is_empty());
    }
}
