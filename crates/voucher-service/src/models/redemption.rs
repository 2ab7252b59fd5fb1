//! 兑换相关实体定义
//!
//! 包含兑换单、兑换明细以及事务内使用的券快照

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::RedemptionStatus;

/// 兑换单（表头）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Redemption {
    pub id: i64,
    pub customer_id: i64,
    /// 兑换总积分，等于所有明细积分之和
    pub total_points: i64,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
}

/// 兑换明细
///
/// `points_per_unit` 冻结兑换当时的券积分价格，`voucher_name` 取查询时的券名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RedemptionItemDetail {
    pub voucher_id: i64,
    pub voucher_name: String,
    pub quantity: i64,
    pub points_per_unit: i64,
    pub total_points: i64,
}

/// 兑换结果
///
/// 兑换单表头加上按写入顺序排列的明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionResult {
    pub id: i64,
    pub customer_id: i64,
    pub total_points: i64,
    pub status: RedemptionStatus,
    pub items: Vec<RedemptionItemDetail>,
    pub created_at: DateTime<Utc>,
}

impl RedemptionResult {
    pub fn from_parts(header: Redemption, items: Vec<RedemptionItemDetail>) -> Self {
        Self {
            id: header.id,
            customer_id: header.customer_id,
            total_points: header.total_points,
            status: header.status,
            items,
            created_at: header.created_at,
        }
    }

    /// 明细积分合计
    pub fn items_total(&self) -> i64 {
        self.items.iter().map(|item| item.total_points).sum()
    }

    /// 表头总积分与明细合计一致
    pub fn is_balanced(&self) -> bool {
        self.total_points == self.items_total()
    }
}

/// 事务内加锁读取的券快照
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VoucherSnapshot {
    pub name: String,
    pub point_cost: i64,
    pub stock: i64,
}

/// 待写入的兑换明细
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRedemptionItem {
    pub redemption_id: i64,
    pub voucher_id: i64,
    pub quantity: i64,
    pub points_per_unit: i64,
    pub total_points: i64,
}
