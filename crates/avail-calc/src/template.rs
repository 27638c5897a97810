//! 產品模板彙總

use avail_core::precision::add;
use avail_core::{ProductCatalog, RequestContext, Result, TemplateId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PotentialCalculator, ProductAvailability};

/// 產品模板的可用量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAvailability {
    pub template_id: TemplateId,

    /// 各變體潛在量的最大值
    pub potential_qty: Decimal,

    /// 變體基礎可用量的最大值 + 潛在量
    pub immediately_usable_qty: Decimal,
}

impl TemplateAvailability {
    /// 模板本身沒有庫存時的基礎結果
    pub fn empty(template_id: TemplateId) -> Self {
        Self {
            template_id,
            potential_qty: Decimal::ZERO,
            immediately_usable_qty: Decimal::ZERO,
        }
    }
}

/// 模板彙總器
pub struct TemplateAggregator;

impl TemplateAggregator {
    /// 依變體結果彙總模板
    ///
    /// 沒有變體時原樣回傳 `base`。否則潛在量取變體最大值，
    /// 立即可用量 = 變體基礎可用量的最大值 + 該潛在量。
    /// 變體可能共用元件，因此潛在量不加總。
    pub fn aggregate(
        base: TemplateAvailability,
        variants: &[ProductAvailability],
    ) -> Result<TemplateAvailability> {
        let Some(potential) = variants.iter().map(|v| v.potential_qty).max() else {
            return Ok(base);
        };
        let base_availability = variants
            .iter()
            .map(|v| v.base_availability())
            .max()
            .unwrap_or(Decimal::ZERO);

        Ok(TemplateAvailability {
            template_id: base.template_id,
            potential_qty: potential,
            immediately_usable_qty: add(base_availability, potential)?,
        })
    }
}

impl<'a> PotentialCalculator<'a> {
    /// 計算模板的可用量
    pub fn template_availability(
        &self,
        template_id: &TemplateId,
        ctx: &RequestContext,
    ) -> Result<TemplateAvailability> {
        let variants = self.catalog().variants_of(template_id)?;

        let results = variants
            .iter()
            .map(|variant| self.availability(&variant.id, ctx))
            .collect::<Result<Vec<_>>>()?;

        let aggregated =
            TemplateAggregator::aggregate(TemplateAvailability::empty(template_id.clone()), &results)?;

        tracing::debug!(
            "模板 {}：{} 個變體，潛在量 {}",
            template_id,
            results.len(),
            aggregated.potential_qty
        );

        Ok(aggregated)
    }
}
