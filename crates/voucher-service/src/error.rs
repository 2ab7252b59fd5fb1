//! 券兑换服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use std::fmt;

use thiserror::Error;

/// 业务实体类型
///
/// 用于 NotFound / Reference 错误中标识缺失的实体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Brand,
    Voucher,
    Customer,
    Redemption,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Voucher => "voucher",
            Self::Customer => "customer",
            Self::Redemption => "redemption",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 券兑换服务错误类型
#[derive(Debug, Error)]
pub enum VoucherError {
    // === 请求错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("{entity} 不存在: id={id}")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("数据冲突: {0}")]
    Conflict(String),

    #[error("引用的 {entity} 不存在: id={id}")]
    Reference { entity: EntityKind, id: i64 },

    // === 兑换相关错误 ===
    #[error("券库存不足: {voucher_name}")]
    InsufficientStock { voucher_name: String },

    #[error("积分不足: 当前 {have}, 需要 {need}")]
    InsufficientPoints { have: i64, need: i64 },

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 券兑换服务 Result 类型别名
pub type Result<T> = std::result::Result<T, VoucherError>;

impl VoucherError {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn reference(entity: EntityKind, id: i64) -> Self {
        Self::Reference { entity, id }
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { entity, .. } => match entity {
                EntityKind::Brand => "BRAND_NOT_FOUND",
                EntityKind::Voucher => "VOUCHER_NOT_FOUND",
                EntityKind::Customer => "CUSTOMER_NOT_FOUND",
                EntityKind::Redemption => "REDEMPTION_NOT_FOUND",
            },
            Self::Conflict(_) => "CONFLICT",
            Self::Reference { .. } => "REFERENCE_NOT_FOUND",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
