//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，支持 mock 测试和内存实现

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Brand, NewBrand, NewRedemptionItem, NewVoucher, RedemptionResult, Voucher, VoucherSnapshot,
};

/// 目录仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepositoryTrait: Send + Sync {
    // 品牌
    async fn create_brand(&self, brand: &NewBrand) -> Result<Brand>;
    async fn brand_exists(&self, id: i64) -> Result<bool>;

    // 券
    /// 券码重复返回 `Conflict`，品牌不存在返回 `Reference`
    async fn create_voucher(&self, voucher: &NewVoucher) -> Result<Voucher>;
    async fn get_voucher(&self, id: i64) -> Result<Option<Voucher>>;
    async fn list_vouchers_by_brand(&self, brand_id: i64) -> Result<Vec<Voucher>>;
}

/// 兑换仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionRepositoryTrait: Send + Sync {
    /// 开启兑换事务
    async fn begin(&self) -> Result<Box<dyn RedemptionTx>>;

    /// 查询兑换单及明细，明细按写入顺序排列
    async fn get_redemption(&self, id: i64) -> Result<Option<RedemptionResult>>;
}

/// 兑换事务
///
/// 一个实例对应一个数据库事务。`commit` 或 `rollback` 之后事务即结束，
/// 后续调用返回 `Internal` 错误；未结束就被 drop 的事务自动回滚。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionTx: Send {
    /// 加锁读取客户积分余额，客户不存在返回 None
    async fn get_customer_points_for_update(&mut self, customer_id: i64) -> Result<Option<i64>>;

    /// 创建 PENDING 状态、总积分为 0 的兑换单，返回兑换单 ID
    async fn create_pending_redemption(&mut self, customer_id: i64) -> Result<i64>;

    /// 按 ID 升序对券行加锁，不存在的 ID 直接忽略
    ///
    /// 所有兑换事务按同一顺序加锁，明细顺序不同的并发兑换不会互相死锁
    async fn lock_vouchers(&mut self, voucher_ids: &[i64]) -> Result<()>;

    /// 加锁读取券名称、积分价格与库存，券不存在返回 None
    async fn get_voucher_for_update(&mut self, voucher_id: i64) -> Result<Option<VoucherSnapshot>>;

    async fn insert_redemption_item(&mut self, item: &NewRedemptionItem) -> Result<()>;

    /// 扣减库存，库存不足时不做修改并返回 false
    async fn decrement_voucher_stock(&mut self, voucher_id: i64, quantity: i64) -> Result<bool>;

    /// 扣减积分，余额不足时不做修改并返回 false
    async fn decrement_customer_points(&mut self, customer_id: i64, amount: i64) -> Result<bool>;

    /// 写入总积分并将兑换单置为 COMPLETED
    async fn complete_redemption(&mut self, redemption_id: i64, total_points: i64) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;
    async fn rollback(&mut self) -> Result<()>;
}
