//! 目录服务
//!
//! 品牌与券的创建和查询

use std::sync::Arc;

use tracing::{info, instrument};

use voucher_shared::observability::metrics::record_voucher_created;

use crate::error::{EntityKind, Result, VoucherError};
use crate::models::{Brand, NewBrand, NewVoucher, Voucher};
use crate::repository::CatalogRepositoryTrait;

/// 目录服务
pub struct CatalogService {
    catalog_repo: Arc<dyn CatalogRepositoryTrait>,
}

impl CatalogService {
    pub fn new(catalog_repo: Arc<dyn CatalogRepositoryTrait>) -> Self {
        Self { catalog_repo }
    }

    /// 创建品牌
    #[instrument(skip(self, brand), fields(name = %brand.name))]
    pub async fn create_brand(&self, brand: NewBrand) -> Result<Brand> {
        brand.ensure_valid()?;

        let created = self.catalog_repo.create_brand(&brand).await?;
        info!(brand_id = created.id, "品牌创建成功");
        Ok(created)
    }

    /// 创建券
    ///
    /// 先确认品牌存在再写入；写入时的外键冲突同样映射为 `Reference`
    #[instrument(skip(self, voucher), fields(brand_id = voucher.brand_id, code = %voucher.code))]
    pub async fn create_voucher(&self, voucher: NewVoucher) -> Result<Voucher> {
        voucher.ensure_valid()?;

        if !self.catalog_repo.brand_exists(voucher.brand_id).await? {
            return Err(VoucherError::reference(EntityKind::Brand, voucher.brand_id));
        }

        let created = self.catalog_repo.create_voucher(&voucher).await?;
        record_voucher_created(created.brand_id);
        info!(voucher_id = created.id, "券创建成功");
        Ok(created)
    }

    /// 按 ID 查询券
    #[instrument(skip(self))]
    pub async fn get_voucher(&self, voucher_id: i64) -> Result<Voucher> {
        self.catalog_repo
            .get_voucher(voucher_id)
            .await?
            .ok_or_else(|| VoucherError::not_found(EntityKind::Voucher, voucher_id))
    }

    /// 列出品牌下的券，品牌不存在时返回空列表
    #[instrument(skip(self))]
    pub async fn list_vouchers_by_brand(&self, brand_id: i64) -> Result<Vec<Voucher>> {
        self.catalog_repo.list_vouchers_by_brand(brand_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCatalogRepositoryTrait;
    use chrono::{Duration, Utc};

    fn new_voucher(brand_id: i64) -> NewVoucher {
        NewVoucher {
            brand_id,
            code: "COFFEE-01".to_string(),
            name: "咖啡券".to_string(),
            description: "任意门店可用".to_string(),
            point_cost: 30,
            stock: 5,
            valid_until: Utc::now() + Duration::days(30),
        }
    }

    fn stored(voucher: &NewVoucher, id: i64) -> Voucher {
        let now = Utc::now();
        Voucher {
            id,
            brand_id: voucher.brand_id,
            code: voucher.code.clone(),
            name: voucher.name.clone(),
            description: voucher.description.clone(),
            point_cost: voucher.point_cost,
            stock: voucher.stock,
            valid_until: voucher.valid_until,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_voucher_missing_brand_skips_insert() {
        let mut repo = MockCatalogRepositoryTrait::new();
        repo.expect_brand_exists()
            .once()
            .withf(|id| *id == 999)
            .return_once(|_| Ok(false));
        repo.expect_create_voucher().never();

        let service = CatalogService::new(Arc::new(repo));
        let err = service.create_voucher(new_voucher(999)).await.unwrap_err();

        assert!(matches!(
            err,
            VoucherError::Reference {
                entity: EntityKind::Brand,
                id: 999
            }
        ));
    }

    #[tokio::test]
    async fn test_create_voucher_success() {
        let input = new_voucher(1);
        let expected = stored(&input, 10);

        let mut repo = MockCatalogRepositoryTrait::new();
        repo.expect_brand_exists().once().return_once(|_| Ok(true));
        repo.expect_create_voucher()
            .once()
            .withf(|v| v.code == "COFFEE-01" && v.point_cost == 30)
            .return_once(move |_| Ok(expected));

        let service = CatalogService::new(Arc::new(repo));
        let created = service.create_voucher(input).await.unwrap();

        assert_eq!(created.id, 10);
        assert_eq!(created.stock, 5);
    }

    #[tokio::test]
    async fn test_create_voucher_conflict_propagates() {
        let mut repo = MockCatalogRepositoryTrait::new();
        repo.expect_brand_exists().once().return_once(|_| Ok(true));
        repo.expect_create_voucher()
            .once()
            .return_once(|v| Err(VoucherError::Conflict(format!("券码已存在: {}", v.code))));

        let service = CatalogService::new(Arc::new(repo));
        let err = service.create_voucher(new_voucher(1)).await.unwrap_err();

        assert!(matches!(err, VoucherError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invalid_voucher_never_reaches_repository() {
        let mut repo = MockCatalogRepositoryTrait::new();
        repo.expect_brand_exists().never();
        repo.expect_create_voucher().never();

        let service = CatalogService::new(Arc::new(repo));
        let invalid = NewVoucher {
            point_cost: 0,
            ..new_voucher(1)
        };

        assert!(matches!(
            service.create_voucher(invalid).await,
            Err(VoucherError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_get_voucher_not_found() {
        let mut repo = MockCatalogRepositoryTrait::new();
        repo.expect_get_voucher()
            .once()
            .withf(|id| *id == 42)
            .return_once(|_| Ok(None));

        let service = CatalogService::new(Arc::new(repo));
        let err = service.get_voucher(42).await.unwrap_err();

        assert_eq!(err.error_code(), "VOUCHER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_brand_rejects_blank_name() {
        let mut repo = MockCatalogRepositoryTrait::new();
        repo.expect_create_brand().never();

        let service = CatalogService::new(Arc::new(repo));
        let result = service
            .create_brand(NewBrand {
                name: "   ".to_string(),
                description: String::new(),
            })
            .await;

        assert!(matches!(result, Err(VoucherError::Validation(_))));
    }
}
