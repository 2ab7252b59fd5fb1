//! API 处理器

pub mod brand;
pub mod health;
pub mod redemption;
pub mod voucher;
