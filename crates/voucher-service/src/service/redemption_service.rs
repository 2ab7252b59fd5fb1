//! 积分兑换服务
//!
//! 处理积分兑换券的核心业务逻辑，包括：
//! - 客户积分余额检查
//! - 券库存检查
//! - 冻结兑换时的积分价格并写入明细
//! - 事务性扣减库存与积分
//!
//! ## 兑换流程
//!
//! 1. 开启事务 -> 2. 锁定客户余额，再按券 ID 升序锁定全部券
//!    -> 3. 创建 PENDING 兑换单
//!    -> 4. 按请求顺序逐项读取券、检查库存、写明细、扣库存 -> 5. 检查积分
//!    -> 6. 扣积分 -> 7. 兑换单置为 COMPLETED -> 8. 提交 -> 9. 回读结果
//!
//! 步骤 1 到 8 之间任何提前返回都会 drop 事务对象，事务随之回滚，
//! 不会留下兑换单、明细或任何扣减。

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use voucher_shared::observability::metrics::{record_redeemed_points, record_redemption};

use crate::error::{EntityKind, Result, VoucherError};
use crate::models::{NewRedemptionItem, RedemptionResult};
use crate::repository::RedemptionRepositoryTrait;
use crate::service::dto::RedemptionRequest;

/// 积分兑换服务
pub struct RedemptionService {
    redemption_repo: Arc<dyn RedemptionRepositoryTrait>,
}

impl RedemptionService {
    pub fn new(redemption_repo: Arc<dyn RedemptionRepositoryTrait>) -> Self {
        Self { redemption_repo }
    }

    /// 执行兑换
    ///
    /// 按请求顺序处理明细，返回遇到的第一个错误
    #[instrument(
        skip(self, request),
        fields(customer_id = request.customer_id, lines = request.items.len())
    )]
    pub async fn execute_redemption(&self, request: &RedemptionRequest) -> Result<RedemptionResult> {
        let started = Instant::now();
        let outcome = self.redeem(request).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &outcome {
            Ok(result) => {
                record_redemption("completed", elapsed);
                record_redeemed_points(result.total_points);
                info!(
                    redemption_id = result.id,
                    total_points = result.total_points,
                    "兑换成功"
                );
            }
            Err(e) => {
                record_redemption(&e.error_code().to_ascii_lowercase(), elapsed);
                if e.is_business_error() {
                    info!(error = %e, "兑换被拒绝");
                } else {
                    warn!(error = %e, "兑换失败");
                }
            }
        }

        outcome
    }

    async fn redeem(&self, request: &RedemptionRequest) -> Result<RedemptionResult> {
        request.ensure_valid()?;
        let customer_id = request.customer_id;

        // 1. 开启事务
        let mut tx = self.redemption_repo.begin().await?;

        // 2. 锁定客户余额
        let balance = tx
            .get_customer_points_for_update(customer_id)
            .await?
            .ok_or_else(|| VoucherError::not_found(EntityKind::Customer, customer_id))?;

        // 客户之后统一按券 ID 升序加锁，避免与其他兑换事务交叉等待
        tx.lock_vouchers(&request.locking_order()).await?;

        // 3. 创建 PENDING 兑换单
        let redemption_id = tx.create_pending_redemption(customer_id).await?;

        // 4. 逐项处理
        let mut total_points: i64 = 0;
        for line in &request.items {
            let voucher = tx
                .get_voucher_for_update(line.voucher_id)
                .await?
                .ok_or_else(|| VoucherError::not_found(EntityKind::Voucher, line.voucher_id))?;

            if voucher.stock < line.quantity {
                return Err(VoucherError::InsufficientStock {
                    voucher_name: voucher.name,
                });
            }

            let line_total = voucher
                .point_cost
                .checked_mul(line.quantity)
                .ok_or_else(|| points_overflow(line.voucher_id))?;
            total_points = total_points
                .checked_add(line_total)
                .ok_or_else(|| points_overflow(line.voucher_id))?;

            tx.insert_redemption_item(&NewRedemptionItem {
                redemption_id,
                voucher_id: line.voucher_id,
                quantity: line.quantity,
                points_per_unit: voucher.point_cost,
                total_points: line_total,
            })
            .await?;

            if !tx
                .decrement_voucher_stock(line.voucher_id, line.quantity)
                .await?
            {
                return Err(VoucherError::InsufficientStock {
                    voucher_name: voucher.name,
                });
            }
        }

        // 5. 检查积分
        if total_points > balance {
            return Err(VoucherError::InsufficientPoints {
                have: balance,
                need: total_points,
            });
        }

        // 6. 扣减积分
        if !tx
            .decrement_customer_points(customer_id, total_points)
            .await?
        {
            return Err(VoucherError::InsufficientPoints {
                have: balance,
                need: total_points,
            });
        }

        // 7. 兑换单置为 COMPLETED
        tx.complete_redemption(redemption_id, total_points).await?;

        // 8. 提交
        tx.commit().await?;
        drop(tx);

        // 9. 回读
        self.redemption_repo
            .get_redemption(redemption_id)
            .await?
            .ok_or_else(|| {
                VoucherError::Internal(format!("已提交的兑换单无法读取: {}", redemption_id))
            })
    }

    /// 查询兑换单
    #[instrument(skip(self))]
    pub async fn get_redemption(&self, redemption_id: i64) -> Result<RedemptionResult> {
        self.redemption_repo
            .get_redemption(redemption_id)
            .await?
            .ok_or_else(|| VoucherError::not_found(EntityKind::Redemption, redemption_id))
    }
}

fn points_overflow(voucher_id: i64) -> VoucherError {
    VoucherError::Validation(format!("兑换积分超出范围: voucher_id={}", voucher_id))
}
