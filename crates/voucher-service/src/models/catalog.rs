//! 目录实体定义
//!
//! 品牌与券。品牌创建后不再修改，券的库存只在兑换事务中扣减。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoucherError};

/// 品牌
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Brand {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 待创建的品牌
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewBrand {
    pub name: String,
    pub description: String,
}

impl NewBrand {
    /// 校验品牌字段
    pub fn ensure_valid(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(VoucherError::Validation("品牌名称不能为空".to_string()));
        }
        Ok(())
    }
}

/// 券
///
/// 归属于某个品牌，`point_cost` 为单张兑换所需积分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Voucher {
    pub id: i64,
    pub brand_id: i64,
    /// 券码（全局唯一）
    pub code: String,
    pub name: String,
    pub description: String,
    /// 单张所需积分，恒大于 0
    pub point_cost: i64,
    /// 剩余库存，恒不小于 0
    pub stock: i64,
    /// 有效期截止时间
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 待创建的券
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVoucher {
    pub brand_id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub point_cost: i64,
    pub stock: i64,
    pub valid_until: DateTime<Utc>,
}

impl NewVoucher {
    /// 校验券字段
    pub fn ensure_valid(&self) -> Result<()> {
        if self.brand_id <= 0 {
            return Err(VoucherError::Validation("brand_id 必须为正数".to_string()));
        }
        if self.code.trim().is_empty() {
            return Err(VoucherError::Validation("券码不能为空".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(VoucherError::Validation("券名称不能为空".to_string()));
        }
        if self.point_cost <= 0 {
            return Err(VoucherError::Validation("point_cost 必须大于 0".to_string()));
        }
        if self.stock < 0 {
            return Err(VoucherError::Validation("stock 不能为负数".to_string()));
        }
        Ok(())
    }
}
