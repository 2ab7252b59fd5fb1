//! 内存存储实现
//!
//! 与 PostgreSQL 实现遵循同一仓储契约，用于服务层测试和本地调试。
//!
//! 兑换事务持有整个存储的互斥锁，并在暂存副本上修改：
//! 提交时写回副本，回滚或 drop 时直接丢弃。同一时刻只有一个兑换事务在执行，
//! 效果等同于对所有涉及的行加锁。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use super::traits::{CatalogRepositoryTrait, RedemptionRepositoryTrait, RedemptionTx};
use crate::error::{EntityKind, Result, VoucherError};
use crate::models::{
    Brand, NewBrand, NewRedemptionItem, NewVoucher, Redemption, RedemptionItemDetail,
    RedemptionResult, RedemptionStatus, Voucher, VoucherSnapshot,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    brands: BTreeMap<i64, Brand>,
    vouchers: BTreeMap<i64, Voucher>,
    /// customer_id -> 积分余额
    customers: BTreeMap<i64, i64>,
    redemptions: BTreeMap<i64, Redemption>,
    /// 按写入顺序保存
    items: Vec<NewRedemptionItem>,
    last_brand_id: i64,
    last_voucher_id: i64,
    last_redemption_id: i64,
}

impl MemoryState {
    fn load_redemption(&self, id: i64) -> Option<RedemptionResult> {
        let header = self.redemptions.get(&id)?.clone();
        let items = self
            .items
            .iter()
            .filter(|item| item.redemption_id == id)
            .map(|item| RedemptionItemDetail {
                voucher_id: item.voucher_id,
                voucher_name: self
                    .vouchers
                    .get(&item.voucher_id)
                    .map(|v| v.name.clone())
                    .unwrap_or_default(),
                quantity: item.quantity,
                points_per_unit: item.points_per_unit,
                total_points: item.total_points,
            })
            .collect();

        Some(RedemptionResult::from_parts(header, items))
    }
}

/// 内存存储
///
/// 同时实现目录仓储与兑换仓储，克隆后共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_next_commit: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入或覆盖客户积分
    pub async fn insert_customer(&self, customer_id: i64, points: i64) {
        self.state.lock().await.customers.insert(customer_id, points);
    }

    pub async fn customer_points(&self, customer_id: i64) -> Option<i64> {
        self.state.lock().await.customers.get(&customer_id).copied()
    }

    pub async fn voucher_stock(&self, voucher_id: i64) -> Option<i64> {
        self.state
            .lock()
            .await
            .vouchers
            .get(&voucher_id)
            .map(|v| v.stock)
    }

    /// 调整券积分价格，用于验证明细冻结兑换时的价格
    pub async fn set_voucher_point_cost(&self, voucher_id: i64, point_cost: i64) {
        if let Some(voucher) = self.state.lock().await.vouchers.get_mut(&voucher_id) {
            voucher.point_cost = point_cost;
            voucher.updated_at = Utc::now();
        }
    }

    pub async fn redemption_count(&self) -> usize {
        self.state.lock().await.redemptions.len()
    }

    pub async fn redemption_item_count(&self) -> usize {
        self.state.lock().await.items.len()
    }

    /// 让下一个开启的兑换事务在提交时失败
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogRepositoryTrait for InMemoryStore {
    async fn create_brand(&self, brand: &NewBrand) -> Result<Brand> {
        let mut state = self.state.lock().await;
        state.last_brand_id += 1;

        let now = Utc::now();
        let created = Brand {
            id: state.last_brand_id,
            name: brand.name.clone(),
            description: brand.description.clone(),
            created_at: now,
            updated_at: now,
        };
        state.brands.insert(created.id, created.clone());

        Ok(created)
    }

    async fn brand_exists(&self, id: i64) -> Result<bool> {
        Ok(self.state.lock().await.brands.contains_key(&id))
    }

    async fn create_voucher(&self, voucher: &NewVoucher) -> Result<Voucher> {
        let mut state = self.state.lock().await;

        if !state.brands.contains_key(&voucher.brand_id) {
            return Err(VoucherError::reference(EntityKind::Brand, voucher.brand_id));
        }
        if state.vouchers.values().any(|v| v.code == voucher.code) {
            return Err(VoucherError::Conflict(format!("券码已存在: {}", voucher.code)));
        }

        state.last_voucher_id += 1;
        let now = Utc::now();
        let created = Voucher {
            id: state.last_voucher_id,
            brand_id: voucher.brand_id,
            code: voucher.code.clone(),
            name: voucher.name.clone(),
            description: voucher.description.clone(),
            point_cost: voucher.point_cost,
            stock: voucher.stock,
            valid_until: voucher.valid_until,
            created_at: now,
            updated_at: now,
        };
        state.vouchers.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_voucher(&self, id: i64) -> Result<Option<Voucher>> {
        Ok(self.state.lock().await.vouchers.get(&id).cloned())
    }

    async fn list_vouchers_by_brand(&self, brand_id: i64) -> Result<Vec<Voucher>> {
        let state = self.state.lock().await;
        Ok(state
            .vouchers
            .values()
            .filter(|v| v.brand_id == brand_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RedemptionRepositoryTrait for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn RedemptionTx>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = MemoryState::clone(&guard);
        let fail_commit = self.fail_next_commit.swap(false, Ordering::SeqCst);

        Ok(Box::new(MemoryRedemptionTx {
            guard: Some(guard),
            staged,
            fail_commit,
        }))
    }

    async fn get_redemption(&self, id: i64) -> Result<Option<RedemptionResult>> {
        Ok(self.state.lock().await.load_redemption(id))
    }
}

struct MemoryRedemptionTx {
    guard: Option<OwnedMutexGuard<MemoryState>>,
    staged: MemoryState,
    fail_commit: bool,
}

impl MemoryRedemptionTx {
    fn staged(&mut self) -> Result<&mut MemoryState> {
        if self.guard.is_none() {
            return Err(VoucherError::Internal("兑换事务已结束".to_string()));
        }
        Ok(&mut self.staged)
    }

    fn take_guard(&mut self) -> Result<OwnedMutexGuard<MemoryState>> {
        self.guard
            .take()
            .ok_or_else(|| VoucherError::Internal("兑换事务已结束".to_string()))
    }
}

#[async_trait]
impl RedemptionTx for MemoryRedemptionTx {
    async fn get_customer_points_for_update(&mut self, customer_id: i64) -> Result<Option<i64>> {
        Ok(self.staged()?.customers.get(&customer_id).copied())
    }

    async fn create_pending_redemption(&mut self, customer_id: i64) -> Result<i64> {
        let state = self.staged()?;
        if !state.customers.contains_key(&customer_id) {
            return Err(VoucherError::Internal(format!(
                "兑换单引用的客户不存在: {}",
                customer_id
            )));
        }

        state.last_redemption_id += 1;
        let id = state.last_redemption_id;
        state.redemptions.insert(
            id,
            Redemption {
                id,
                customer_id,
                total_points: 0,
                status: RedemptionStatus::Pending,
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }

    /// 事务本身持有整个存储的锁，这里只检查事务是否仍然有效
    async fn lock_vouchers(&mut self, _voucher_ids: &[i64]) -> Result<()> {
        self.staged()?;
        Ok(())
    }

    async fn get_voucher_for_update(&mut self, voucher_id: i64) -> Result<Option<VoucherSnapshot>> {
        Ok(self
            .staged()?
            .vouchers
            .get(&voucher_id)
            .map(|v| VoucherSnapshot {
                name: v.name.clone(),
                point_cost: v.point_cost,
                stock: v.stock,
            }))
    }

    async fn insert_redemption_item(&mut self, item: &NewRedemptionItem) -> Result<()> {
        let state = self.staged()?;
        if !state.redemptions.contains_key(&item.redemption_id)
            || !state.vouchers.contains_key(&item.voucher_id)
        {
            return Err(VoucherError::Internal(format!(
                "兑换明细引用不存在: redemption_id={}, voucher_id={}",
                item.redemption_id, item.voucher_id
            )));
        }

        state.items.push(item.clone());
        Ok(())
    }

    async fn decrement_voucher_stock(&mut self, voucher_id: i64, quantity: i64) -> Result<bool> {
        let Some(voucher) = self.staged()?.vouchers.get_mut(&voucher_id) else {
            return Ok(false);
        };
        if voucher.stock < quantity {
            return Ok(false);
        }

        voucher.stock -= quantity;
        voucher.updated_at = Utc::now();
        Ok(true)
    }

    async fn decrement_customer_points(&mut self, customer_id: i64, amount: i64) -> Result<bool> {
        let Some(points) = self.staged()?.customers.get_mut(&customer_id) else {
            return Ok(false);
        };
        if *points < amount {
            return Ok(false);
        }

        *points -= amount;
        Ok(true)
    }

    async fn complete_redemption(&mut self, redemption_id: i64, total_points: i64) -> Result<()> {
        let redemption = self
            .staged()?
            .redemptions
            .get_mut(&redemption_id)
            .ok_or_else(|| VoucherError::not_found(EntityKind::Redemption, redemption_id))?;

        redemption.total_points = total_points;
        redemption.status = RedemptionStatus::Completed;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let mut guard = self.take_guard()?;
        if self.fail_commit {
            debug!("内存事务按设定提交失败，暂存修改已丢弃");
            return Err(VoucherError::Database(sqlx::Error::PoolClosed));
        }

        *guard = std::mem::take(&mut self.staged);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.take_guard()?;
        self.staged = MemoryState::default();
        Ok(())
    }
}
