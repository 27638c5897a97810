//! BOM 多層展開

use avail_core::precision::{div, mul};
use avail_core::uom::round_to_step;
use avail_core::{
    AvailError, Product, ProductCatalog, ProductId, RequestContext, Result, TemplateId, UomConverter,
    UomId,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::{Bom, BomLine, BomStore};

/// 展開後的元件行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplodedLine {
    /// 來源 BOM 行
    pub bom_line_id: Uuid,

    pub component_id: ProductId,

    /// 行單位
    pub uom_id: UomId,

    /// 累積用量（行單位，已套用虛擬件倍數與效率）
    pub qty: Decimal,

    /// 呼叫展開時傳入的數量
    pub original_qty: Decimal,

    /// 上層虛擬件行
    pub parent_line_id: Option<Uuid>,

    /// 由頂層到此行穿透的虛擬件產品
    pub phantom_ids: Vec<ProductId>,
}

/// BOM 展開協作者
pub trait BomExplosion {
    /// 將 `bom` 展開 `quantity` 次生產，虛擬件遞迴穿透
    fn explode(
        &self,
        bom: &Bom,
        product: &Product,
        quantity: Decimal,
        ctx: &RequestContext,
    ) -> Result<Vec<ExplodedLine>>;
}

/// 待展開的行
struct PendingLine {
    line: BomLine,
    /// 此行所屬 BOM 的產品（用於變體適用判斷）
    owner: ProductId,
    current_qty: Decimal,
    parent_line_id: Option<Uuid>,
    /// 由頂層到此行經過的模板
    path: Vec<TemplateId>,
    phantom_ids: Vec<ProductId>,
}

impl BomExplosion for BomStore {
    fn explode(
        &self,
        bom: &Bom,
        product: &Product,
        quantity: Decimal,
        ctx: &RequestContext,
    ) -> Result<Vec<ExplodedLine>> {
        let root_path = vec![product.template_id.clone()];
        let mut pending: VecDeque<PendingLine> = bom
            .lines
            .iter()
            .map(|line| PendingLine {
                line: line.clone(),
                owner: product.id.clone(),
                current_qty: quantity,
                parent_line_id: None,
                path: root_path.clone(),
                phantom_ids: Vec::new(),
            })
            .collect();

        let mut exploded = Vec::new();

        // 深度優先：虛擬件的子行插到佇列前端
        while let Some(current) = pending.pop_front() {
            if !current.line.applies_to(&current.owner) {
                continue;
            }

            let line_qty = mul(current.current_qty, current.line.effective_qty()?)?;
            let component = self.catalog.product(&current.line.product_id)?;

            let sub_bom = self
                .find_for_explosion(&component, bom.company_id.as_ref())
                .filter(|sub| sub.is_phantom());

            let Some(sub_bom) = sub_bom else {
                let rounding = self.uoms.rounding(&current.line.uom_id)?;
                exploded.push(ExplodedLine {
                    bom_line_id: current.line.id,
                    component_id: component.id,
                    uom_id: current.line.uom_id.clone(),
                    qty: round_to_step(line_qty, rounding, RoundingStrategy::AwayFromZero)?,
                    original_qty: quantity,
                    parent_line_id: current.parent_line_id,
                    phantom_ids: current.phantom_ids,
                });
                continue;
            };

            if !ctx.can_see(sub_bom.company_id.as_ref()) {
                return Err(AvailError::AccessDenied(format!(
                    "無權讀取元件 {} 的虛擬件 BOM {}",
                    component.id, sub_bom.id
                )));
            }

            if current.path.contains(&component.template_id) {
                let chain: Vec<&str> = current.path.iter().map(|t| t.as_str()).collect();
                return Err(AvailError::CyclicBom(format!(
                    "{} → {}",
                    chain.join(" → "),
                    component.template_id
                )));
            }

            if sub_bom.product_qty <= Decimal::ZERO {
                return Err(AvailError::InvalidBom(format!(
                    "BOM {} 產出數量必須為正數",
                    sub_bom.id
                )));
            }

            let converted = self.uoms.convert(
                div(line_qty, sub_bom.product_qty)?,
                &current.line.uom_id,
                &sub_bom.uom_id,
            )?;

            tracing::trace!(
                "虛擬件展開: {} x {} → {} 行",
                component.id,
                converted,
                sub_bom.lines.len()
            );

            let mut path = current.path.clone();
            path.push(component.template_id.clone());
            let mut phantom_ids = current.phantom_ids.clone();
            phantom_ids.push(component.id.clone());

            for line in sub_bom.lines.iter().rev() {
                pending.push_front(PendingLine {
                    line: line.clone(),
                    owner: component.id.clone(),
                    current_qty: converted,
                    parent_line_id: Some(current.line.id),
                    path: path.clone(),
                    phantom_ids: phantom_ids.clone(),
                });
            }
        }

        Ok(exploded)
    }
}
