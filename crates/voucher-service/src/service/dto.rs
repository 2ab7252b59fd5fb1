//! 服务层数据传输对象

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoucherError};

/// 兑换行：券 ID 与兑换数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionLine {
    pub voucher_id: i64,
    pub quantity: i64,
}

/// 兑换请求
///
/// 明细按调用方给出的顺序处理，同一张券可以出现多次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRequest {
    pub customer_id: i64,
    pub items: Vec<RedemptionLine>,
}

impl RedemptionRequest {
    pub fn new(customer_id: i64, items: Vec<RedemptionLine>) -> Self {
        Self { customer_id, items }
    }

    /// 校验明细非空且数量为正
    pub fn ensure_valid(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(VoucherError::Validation("兑换明细不能为空".to_string()));
        }

        if let Some(line) = self.items.iter().find(|line| line.quantity <= 0) {
            return Err(VoucherError::Validation(format!(
                "兑换数量必须为正数: voucher_id={}, quantity={}",
                line.voucher_id, line.quantity
            )));
        }

        Ok(())
    }

    /// 涉及的券 ID，升序去重，即事务内券行的加锁顺序
    pub fn locking_order(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.items.iter().map(|line| line.voucher_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let ok = RedemptionRequest::new(
            7,
            vec![RedemptionLine {
                voucher_id: 1,
                quantity: 2,
            }],
        );
        assert!(ok.ensure_valid().is_ok());

        let empty = RedemptionRequest::new(7, vec![]);
        assert!(matches!(
            empty.ensure_valid(),
            Err(VoucherError::Validation(_))
        ));

        let zero = RedemptionRequest::new(
            7,
            vec![
                RedemptionLine {
                    voucher_id: 1,
                    quantity: 1,
                },
                RedemptionLine {
                    voucher_id: 2,
                    quantity: 0,
                },
            ],
        );
        let err = zero.ensure_valid().unwrap_err();
        assert!(err.to_string().contains("voucher_id=2"));
    }

    #[test]
    fn test_locking_order_sorted_and_deduped() {
        let request = RedemptionRequest::new(
            7,
            [(9, 1), (1, 2), (4, 1), (9, 3)]
                .into_iter()
                .map(|(voucher_id, quantity)| RedemptionLine {
                    voucher_id,
                    quantity,
                })
                .collect(),
        );

        assert_eq!(request.locking_order(), vec![1, 4, 9]);
    }
}
