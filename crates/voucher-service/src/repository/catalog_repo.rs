//! 目录仓储
//!
//! 提供品牌与券的数据访问

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::traits::CatalogRepositoryTrait;
use crate::error::{EntityKind, Result, VoucherError};
use crate::models::{Brand, NewBrand, NewVoucher, Voucher};

const VOUCHER_COLUMNS: &str = r#"
    id, brand_id, code, name, description, point_cost, stock, valid_until,
    created_at, updated_at
"#;

/// 目录仓储
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 将券写入时的约束冲突转换为业务错误
///
/// 唯一约束（23505）对应券码重复，外键约束（23503）对应品牌不存在
fn map_voucher_insert_error(err: sqlx::Error, voucher: &NewVoucher) -> VoucherError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return VoucherError::Conflict(format!("券码已存在: {}", voucher.code));
        }
        if db_err.is_foreign_key_violation() {
            return VoucherError::reference(EntityKind::Brand, voucher.brand_id);
        }
    }
    VoucherError::Database(err)
}

#[async_trait]
impl CatalogRepositoryTrait for CatalogRepository {
    async fn create_brand(&self, brand: &NewBrand) -> Result<Brand> {
        let created = sqlx::query_as::<_, Brand>(
            r#"
            INSERT INTO brands (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(&brand.name)
        .bind(&brand.description)
        .fetch_one(&self.pool)
        .await?;

        debug!(brand_id = created.id, "品牌已写入");
        Ok(created)
    }

    async fn brand_exists(&self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM brands WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn create_voucher(&self, voucher: &NewVoucher) -> Result<Voucher> {
        let sql = format!(
            r#"
            INSERT INTO vouchers (brand_id, code, name, description, point_cost, stock, valid_until)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {VOUCHER_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Voucher>(&sql)
            .bind(voucher.brand_id)
            .bind(&voucher.code)
            .bind(&voucher.name)
            .bind(&voucher.description)
            .bind(voucher.point_cost)
            .bind(voucher.stock)
            .bind(voucher.valid_until)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_voucher_insert_error(e, voucher))?;

        debug!(voucher_id = created.id, code = %created.code, "券已写入");
        Ok(created)
    }

    async fn get_voucher(&self, id: i64) -> Result<Option<Voucher>> {
        let sql = format!("SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE id = $1");

        let voucher = sqlx::query_as::<_, Voucher>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(voucher)
    }

    async fn list_vouchers_by_brand(&self, brand_id: i64) -> Result<Vec<Voucher>> {
        let sql =
            format!("SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE brand_id = $1 ORDER BY id ASC");

        let vouchers = sqlx::query_as::<_, Voucher>(&sql)
            .bind(brand_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(vouchers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_non_database_errors_pass_through() {
        let voucher = NewVoucher {
            brand_id: 1,
            code: "C".to_string(),
            name: "N".to_string(),
            description: String::new(),
            point_cost: 1,
            stock: 1,
            valid_until: Utc::now(),
        };

        let err = map_voucher_insert_error(sqlx::Error::PoolTimedOut, &voucher);
        assert!(matches!(err, VoucherError::Database(sqlx::Error::PoolTimedOut)));
    }
}
