//! 兑换仓储
//!
//! 提供兑换事务原语以及兑换单查询

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;

use super::traits::{RedemptionRepositoryTrait, RedemptionTx};
use crate::error::{Result, VoucherError};
use crate::models::{
    NewRedemptionItem, Redemption, RedemptionItemDetail, RedemptionResult, RedemptionStatus,
    VoucherSnapshot,
};

/// 兑换仓储
pub struct RedemptionRepository {
    pool: PgPool,
}

impl RedemptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务或连接上查询兑换单明细
    ///
    /// 明细关联券表取当前券名称，按写入顺序排列
    pub async fn list_items_in_tx(
        conn: &mut PgConnection,
        redemption_id: i64,
    ) -> Result<Vec<RedemptionItemDetail>> {
        let items = sqlx::query_as::<_, RedemptionItemDetail>(
            r#"
            SELECT ri.voucher_id, v.name AS voucher_name, ri.quantity,
                   ri.points_per_unit, ri.total_points
            FROM redemption_items ri
            JOIN vouchers v ON v.id = ri.voucher_id
            WHERE ri.redemption_id = $1
            ORDER BY ri.id ASC
            "#,
        )
        .bind(redemption_id)
        .fetch_all(conn)
        .await?;

        Ok(items)
    }
}

#[async_trait]
impl RedemptionRepositoryTrait for RedemptionRepository {
    async fn begin(&self) -> Result<Box<dyn RedemptionTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgRedemptionTx { tx: Some(tx) }))
    }

    async fn get_redemption(&self, id: i64) -> Result<Option<RedemptionResult>> {
        let mut conn = self.pool.acquire().await?;

        let header = sqlx::query_as::<_, Redemption>(
            r#"
            SELECT id, customer_id, total_points, status, created_at
            FROM redemptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let items = Self::list_items_in_tx(&mut *conn, id).await?;
        Ok(Some(RedemptionResult::from_parts(header, items)))
    }
}

/// PostgreSQL 兑换事务
///
/// 持有一个 sqlx 事务；`commit`/`rollback` 后内部事务被取走，
/// 未取走时随结构体 drop，sqlx 会在连接归还前回滚。
pub struct PgRedemptionTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgRedemptionTx {
    fn conn(&mut self) -> Result<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| VoucherError::Internal("兑换事务已结束".to_string()))
    }

    fn take(&mut self) -> Result<Transaction<'static, Postgres>> {
        self.tx
            .take()
            .ok_or_else(|| VoucherError::Internal("兑换事务已结束".to_string()))
    }
}

/// 检查约束（23514）说明余额或库存会变为负数，按未扣减处理
fn guarded_update(result: std::result::Result<u64, sqlx::Error>) -> Result<bool> {
    match result {
        Ok(rows) => Ok(rows == 1),
        Err(e)
            if e
                .as_database_error()
                .is_some_and(|db_err| db_err.is_check_violation()) =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl RedemptionTx for PgRedemptionTx {
    async fn get_customer_points_for_update(&mut self, customer_id: i64) -> Result<Option<i64>> {
        let points: Option<i64> =
            sqlx::query_scalar("SELECT points FROM customers WHERE id = $1 FOR UPDATE")
                .bind(customer_id)
                .fetch_optional(self.conn()?)
                .await?;

        Ok(points)
    }

    async fn create_pending_redemption(&mut self, customer_id: i64) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO redemptions (customer_id, total_points, status)
            VALUES ($1, 0, $2)
            RETURNING id
            "#,
        )
        .bind(customer_id)
        .bind(RedemptionStatus::Pending.as_str())
        .fetch_one(self.conn()?)
        .await?;

        Ok(id)
    }

    async fn lock_vouchers(&mut self, voucher_ids: &[i64]) -> Result<()> {
        let locked: Vec<i64> = sqlx::query_scalar(
            "SELECT id FROM vouchers WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(voucher_ids)
        .fetch_all(self.conn()?)
        .await?;

        debug!(requested = voucher_ids.len(), locked = locked.len(), "券行已加锁");
        Ok(())
    }

    async fn get_voucher_for_update(&mut self, voucher_id: i64) -> Result<Option<VoucherSnapshot>> {
        let snapshot = sqlx::query_as::<_, VoucherSnapshot>(
            "SELECT name, point_cost, stock FROM vouchers WHERE id = $1 FOR UPDATE",
        )
        .bind(voucher_id)
        .fetch_optional(self.conn()?)
        .await?;

        Ok(snapshot)
    }

    async fn insert_redemption_item(&mut self, item: &NewRedemptionItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO redemption_items
                (redemption_id, voucher_id, quantity, points_per_unit, total_points)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(item.redemption_id)
        .bind(item.voucher_id)
        .bind(item.quantity)
        .bind(item.points_per_unit)
        .bind(item.total_points)
        .execute(self.conn()?)
        .await?;

        Ok(())
    }

    async fn decrement_voucher_stock(&mut self, voucher_id: i64, quantity: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vouchers
            SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND stock >= $2
            "#,
        )
        .bind(voucher_id)
        .bind(quantity)
        .execute(self.conn()?)
        .await
        .map(|r| r.rows_affected());

        guarded_update(result)
    }

    async fn decrement_customer_points(&mut self, customer_id: i64, amount: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET points = points - $2
            WHERE id = $1 AND points >= $2
            "#,
        )
        .bind(customer_id)
        .bind(amount)
        .execute(self.conn()?)
        .await
        .map(|r| r.rows_affected());

        guarded_update(result)
    }

    async fn complete_redemption(&mut self, redemption_id: i64, total_points: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE redemptions
            SET total_points = $2, status = $3
            WHERE id = $1
            "#,
        )
        .bind(redemption_id)
        .bind(total_points)
        .bind(RedemptionStatus::Completed.as_str())
        .execute(self.conn()?)
        .await?;

        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.take()?.commit().await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.take()?.rollback().await?;
        Ok(())
    }
}

impl Drop for PgRedemptionTx {
    fn drop(&mut self) {
        if self.tx.is_some() {
            debug!("兑换事务未提交即释放，自动回滚");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_update_rows() {
        assert!(guarded_update(Ok(1)).unwrap());
        assert!(!guarded_update(Ok(0)).unwrap());
        assert!(matches!(
            guarded_update(Err(sqlx::Error::PoolClosed)),
            Err(VoucherError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_finished_tx_rejects_calls() {
        let mut tx = PgRedemptionTx { tx: None };

        let err = tx.get_customer_points_for_update(1).await.unwrap_err();
        assert!(matches!(err, VoucherError::Internal(_)));
        assert!(matches!(
            tx.lock_vouchers(&[1, 2]).await,
            Err(VoucherError::Internal(_))
        ));
        assert!(matches!(tx.commit().await, Err(VoucherError::Internal(_))));
    }
}
