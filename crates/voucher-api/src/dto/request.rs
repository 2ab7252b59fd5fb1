//! 请求 DTO 定义
//!
//! 字段级校验使用 validator，业务校验（品牌是否存在、库存、积分）由服务层完成

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use voucher_core::{NewBrand, NewVoucher, RedemptionLine, RedemptionRequest};

/// 创建品牌请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBrandRequest {
    #[validate(length(min = 1, max = 100, message = "品牌名称长度必须在1-100个字符之间"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<CreateBrandRequest> for NewBrand {
    fn from(req: CreateBrandRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

/// 创建券请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVoucherRequest {
    #[validate(range(min = 1, message = "brand_id 必须为正数"))]
    pub brand_id: i64,
    #[validate(length(min = 1, max = 50, message = "券码长度必须在1-50个字符之间"))]
    pub code: String,
    #[validate(length(min = 1, max = 100, message = "券名称长度必须在1-100个字符之间"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, message = "point_cost 必须大于 0"))]
    pub point_cost: i64,
    #[validate(range(min = 0, message = "stock 不能为负数"))]
    pub stock: i64,
    pub valid_until: DateTime<Utc>,
}

impl From<CreateVoucherRequest> for NewVoucher {
    fn from(req: CreateVoucherRequest) -> Self {
        Self {
            brand_id: req.brand_id,
            code: req.code,
            name: req.name,
            description: req.description,
            point_cost: req.point_cost,
            stock: req.stock,
            valid_until: req.valid_until,
        }
    }
}

/// 兑换明细行
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RedemptionItemRequest {
    #[validate(range(min = 1, message = "voucher_id 必须为正数"))]
    pub voucher_id: i64,
    #[validate(range(min = 1, message = "quantity 必须为正整数"))]
    pub quantity: i64,
}

/// 兑换请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRedemptionRequest {
    #[validate(range(min = 1, message = "customer_id 必须为正数"))]
    pub customer_id: i64,
    #[validate(length(min = 1, message = "兑换明细不能为空"), nested)]
    pub items: Vec<RedemptionItemRequest>,
}

impl From<CreateRedemptionRequest> for RedemptionRequest {
    fn from(req: CreateRedemptionRequest) -> Self {
        RedemptionRequest::new(
            req.customer_id,
            req.items
                .into_iter()
                .map(|item| RedemptionLine {
                    voucher_id: item.voucher_id,
                    quantity: item.quantity,
                })
                .collect(),
        )
    }
}

/// `?id=` 查询参数
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: i64,
}

/// `?transactionId=` 查询参数
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(rename = "transactionId")]
    pub transaction_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redemption_request_validation() {
        let ok: CreateRedemptionRequest = serde_json::from_value(serde_json::json!({
            "customer_id": 7,
            "items": [{"voucher_id": 1, "quantity": 2}]
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let empty: CreateRedemptionRequest = serde_json::from_value(serde_json::json!({
            "customer_id": 7,
            "items": []
        }))
        .unwrap();
        assert!(empty.validate().is_err());

        let zero_qty: CreateRedemptionRequest = serde_json::from_value(serde_json::json!({
            "customer_id": 7,
            "items": [{"voucher_id": 1, "quantity": 0}]
        }))
        .unwrap();
        assert!(zero_qty.validate().is_err());
    }

    #[test]
    fn test_empty_items_reported_on_items_field() {
        let empty: CreateRedemptionRequest = serde_json::from_value(serde_json::json!({
            "customer_id": 7,
            "items": []
        }))
        .unwrap();

        let errors = empty.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let items = field_errors.get("items").unwrap();
        assert_eq!(items[0].code, "length");
        assert_eq!(items[0].params["min"], serde_json::json!(1));
    }

    #[test]
    fn test_voucher_request_requires_valid_until() {
        let missing = serde_json::from_value::<CreateVoucherRequest>(serde_json::json!({
            "brand_id": 1,
            "code": "COFFEE-01",
            "name": "咖啡券",
            "point_cost": 30,
            "stock": 1
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn test_voucher_request_validation() {
        let base = serde_json::json!({
            "brand_id": 1,
            "code": "COFFEE-01",
            "name": "咖啡券",
            "point_cost": 30,
            "stock": 0,
            "valid_until": "2030-01-01T00:00:00Z"
        });
        let ok: CreateVoucherRequest = serde_json::from_value(base.clone()).unwrap();
        assert!(ok.validate().is_ok());
        assert!(ok.description.is_empty());

        let mut negative = base.clone();
        negative["stock"] = serde_json::json!(-1);
        let negative: CreateVoucherRequest = serde_json::from_value(negative).unwrap();
        assert!(negative.validate().is_err());

        let mut free = base;
        free["point_cost"] = serde_json::json!(0);
        let free: CreateVoucherRequest = serde_json::from_value(free).unwrap();
        assert!(free.validate().is_err());
    }

    #[test]
    fn test_transaction_query_name() {
        let q: TransactionQuery = serde_json::from_value(serde_json::json!({
            "transactionId": 12
        }))
        .unwrap();
        assert_eq!(q.transaction_id, 12);
    }

    #[test]
    fn test_into_service_request_keeps_order() {
        let req = CreateRedemptionRequest {
            customer_id: 3,
            items: vec![
                RedemptionItemRequest {
                    voucher_id: 9,
                    quantity: 1,
                },
                RedemptionItemRequest {
                    voucher_id: 4,
                    quantity: 2,
                },
            ],
        };
        let converted: RedemptionRequest = req.into();
        assert_eq!(converted.customer_id, 3);
        assert_eq!(converted.items[0].voucher_id, 9);
        assert_eq!(converted.items[1].quantity, 2);
    }
}
