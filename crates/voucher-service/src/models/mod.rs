//! 券兑换领域模型
//!
//! 包含品牌、券、兑换单及兑换明细等核心实体定义

pub mod catalog;
pub mod enums;
pub mod redemption;

// 重新导出常用类型
pub use catalog::{Brand, NewBrand, NewVoucher, Voucher};
pub use enums::RedemptionStatus;
pub use redemption::{
    NewRedemptionItem, Redemption, RedemptionItemDetail, RedemptionResult, VoucherSnapshot,
};
