//! 枚举类型定义
//!
//! 枚举同时支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 兑换单状态
///
/// 兑换单在事务开始时以 PENDING 写入，事务提交前更新为 COMPLETED。
/// 事务回滚时兑换单本身也不会留下，因此已提交的数据中只应出现 COMPLETED。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionStatus {
    /// 处理中
    #[default]
    Pending,
    /// 已完成
    Completed,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&RedemptionStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
        let parsed: RedemptionStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(parsed, RedemptionStatus::Pending);
        assert_eq!(RedemptionStatus::default().as_str(), "PENDING");

        // 写库用的字符串与 JSON 表示一致
        for status in [RedemptionStatus::Pending, RedemptionStatus::Completed] {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::json!(status.as_str())
            );
        }
    }
}
