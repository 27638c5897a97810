//! 產品可用量彙總

use avail_core::precision::add;
use avail_core::{ProductId, RequestContext, Result, StockLookup};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::PotentialCalculator;

/// 單一產品的可用量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAvailability {
    pub product_id: ProductId,

    /// 現有庫存
    pub qty_available: Decimal,

    /// 預計可用量
    pub virtual_available: Decimal,

    /// 以現有元件可生產的數量
    pub potential_qty: Decimal,

    /// 立即可用量 = 預計可用量 + 潛在量
    pub immediately_usable_qty: Decimal,
}

impl ProductAvailability {
    /// 基礎可用量（不含潛在量）
    pub fn base_availability(&self) -> Decimal {
        self.virtual_available
    }
}

impl<'a> PotentialCalculator<'a> {
    /// 計算單一產品的完整可用量
    pub fn availability(
        &self,
        product_id: &ProductId,
        ctx: &RequestContext,
    ) -> Result<ProductAvailability> {
        let qty_available = self.stock().qty_available(product_id, ctx)?;
        let virtual_available = self.stock().virtual_available(product_id, ctx)?;
        let potential_qty = self.compute_potential(product_id, ctx)?;

        Ok(ProductAvailability {
            product_id: product_id.clone(),
            qty_available,
            virtual_available,
            potential_qty,
            immediately_usable_qty: add(virtual_available, potential_qty)?,
        })
    }

    /// 批次計算：結果與逐一計算相同，任一產品失敗則整批失敗
    pub fn compute_many(
        &self,
        product_ids: &[ProductId],
        ctx: &RequestContext,
    ) -> Result<BTreeMap<ProductId, ProductAvailability>> {
        tracing::info!("批次計算可用量：{} 個產品", product_ids.len());

        let mut results = BTreeMap::new();
        for product_id in product_ids {
            if results.contains_key(product_id) {
                continue;
            }
            let availability = self.availability(product_id, ctx)?;
            results.insert(product_id.clone(), availability);
        }

        Ok(results)
    }
}
