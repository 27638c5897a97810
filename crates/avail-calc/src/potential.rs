//! 潛在可生產量計算器

use avail_bom::{BomExplosion, BomLookup, ExplodedLine};
use avail_core::{
    AvailError, AvailabilityConfig, OnHandBasis, ProductCatalog, ProductId, RequestContext, Result,
    StockLookup, UomConverter,
};
use avail_core::precision::{add, mul};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::NeedsResolver;

/// 潛在量計算器
///
/// 潛在量 = BOM 產出數量 × 以現有元件可完成的生產次數。
/// 計算器本身不持有狀態，所有資料都經由協作者即時讀取。
pub struct PotentialCalculator<'a> {
    catalog: &'a dyn ProductCatalog,
    boms: &'a dyn BomLookup,
    explosion: &'a dyn BomExplosion,
    uoms: &'a dyn UomConverter,
    stock: &'a dyn StockLookup,

    /// 在組合邊界讀取的配置
    config: AvailabilityConfig,
}

impl<'a> PotentialCalculator<'a> {
    /// 創建新的潛在量計算器
    pub fn new(
        catalog: &'a dyn ProductCatalog,
        boms: &'a dyn BomLookup,
        explosion: &'a dyn BomExplosion,
        uoms: &'a dyn UomConverter,
        stock: &'a dyn StockLookup,
        config: AvailabilityConfig,
    ) -> Self {
        Self {
            catalog,
            boms,
            explosion,
            uoms,
            stock,
            config,
        }
    }

    pub fn config(&self) -> &AvailabilityConfig {
        &self.config
    }

    pub(crate) fn catalog(&self) -> &'a dyn ProductCatalog {
        self.catalog
    }

    pub(crate) fn stock(&self) -> &'a dyn StockLookup {
        self.stock
    }

    pub fn resolver(&self) -> NeedsResolver<'a> {
        NeedsResolver::new(
            self.catalog,
            self.explosion,
            self.uoms,
            self.config.precision,
        )
    }

    /// 計算產品的潛在量（產品自身單位）
    ///
    /// 無 BOM、BOM 無權讀取、或沒有任何可換算的元件時回傳 0。
    /// 以立即可用量為依據時會遞迴計算元件的潛在量；循環回傳 `CyclicBom`。
    /// 同一次計算中共用的子件只計算一次。
    pub fn compute_potential(&self, product_id: &ProductId, ctx: &RequestContext) -> Result<Decimal> {
        let mut walk = Walk::default();
        self.potential_guarded(product_id, ctx, &mut walk)
    }

    fn potential_guarded(
        &self,
        product_id: &ProductId,
        ctx: &RequestContext,
        walk: &mut Walk,
    ) -> Result<Decimal> {
        if let Some(known) = walk.known.get(product_id) {
            return Ok(*known);
        }

        let stack = &mut walk.stack;
        if stack.contains(product_id) {
            let chain: Vec<&str> = stack.iter().map(|p| p.as_str()).collect();
            return Err(AvailError::CyclicBom(format!(
                "{} → {}",
                chain.join(" → "),
                product_id
            )));
        }

        stack.push(product_id.clone());
        let result = self.potential_of(product_id, ctx, walk);
        walk.stack.pop();

        let potential = result?;
        walk.known.insert(product_id.clone(), potential);
        Ok(potential)
    }

    fn potential_of(
        &self,
        product_id: &ProductId,
        ctx: &RequestContext,
        walk: &mut Walk,
    ) -> Result<Decimal> {
        let product = self.catalog.product(product_id)?;

        // Step 1: 找 BOM
        let Some(bom) = self.boms.find_bom(&product, ctx)? else {
            tracing::debug!("產品 {} 沒有可用的 BOM", product_id);
            return Ok(Decimal::ZERO);
        };

        // Step 2: 元件需求
        let needs = match self.resolver().resolve(&product, &bom, ctx) {
            Ok(needs) => needs,
            Err(AvailError::AccessDenied(reason)) => {
                tracing::debug!("產品 {} 的 BOM 無法展開: {}", product_id, reason);
                return Ok(Decimal::ZERO);
            }
            Err(e) => return Err(e),
        };
        if needs.is_empty() {
            tracing::debug!("產品 {} 沒有有效的元件需求", product_id);
            return Ok(Decimal::ZERO);
        }

        // Step 3: 各元件可完成的生產次數取最小值
        let precision = self.config.precision;
        let mut runs: Option<Decimal> = None;
        for (component_id, need) in needs.iter() {
            let on_hand = self.component_on_hand(component_id, ctx, walk)?;
            let component_runs = precision.floor_div(on_hand, *need)?;
            tracing::trace!(
                "元件 {}: 在庫 {} / 需求 {} = {} 次",
                component_id,
                on_hand,
                need,
                component_runs
            );
            runs = Some(runs.map_or(component_runs, |current| current.min(component_runs)));
        }
        let runs = runs.unwrap_or(Decimal::ZERO).max(Decimal::ZERO);

        // Step 4: 換算為產品單位
        let bom_qty = self
            .uoms
            .convert(bom.product_qty, &bom.uom_id, &product.uom_id)?;
        let potential = precision.round(mul(bom_qty, runs)?);

        tracing::debug!(
            "產品 {} 潛在量 {}（{} 次 × {}）",
            product_id,
            potential,
            runs,
            bom_qty
        );

        Ok(potential)
    }

    /// 依配置取得元件的在庫量
    fn component_on_hand(
        &self,
        component: &ProductId,
        ctx: &RequestContext,
        walk: &mut Walk,
    ) -> Result<Decimal> {
        match self.config.on_hand_basis {
            OnHandBasis::QtyAvailable => self.stock.qty_available(component, ctx),
            OnHandBasis::VirtualAvailable => self.stock.virtual_available(component, ctx),
            OnHandBasis::ImmediatelyUsable => {
                let virtual_qty = self.stock.virtual_available(component, ctx)?;
                let potential = self.potential_guarded(component, ctx, walk)?;
                add(virtual_qty, potential)
            }
        }
    }

    /// 產品 BOM 展開後的所有元件（虛擬件已穿透）
    pub fn component_ids(
        &self,
        product_id: &ProductId,
        ctx: &RequestContext,
    ) -> Result<BTreeSet<ProductId>> {
        Ok(self
            .exploded_lines(product_id, ctx)?
            .into_iter()
            .map(|l| l.component_id)
            .collect())
    }

    /// 潛在量依賴的產品：展開後的元件及途中穿透的虛擬件
    pub fn dependency_ids(
        &self,
        product_id: &ProductId,
        ctx: &RequestContext,
    ) -> Result<BTreeSet<ProductId>> {
        let mut ids = BTreeSet::new();
        for line in self.exploded_lines(product_id, ctx)? {
            ids.extend(line.phantom_ids);
            ids.insert(line.component_id);
        }
        Ok(ids)
    }

    fn exploded_lines(
        &self,
        product_id: &ProductId,
        ctx: &RequestContext,
    ) -> Result<Vec<ExplodedLine>> {
        let product = self.catalog.product(product_id)?;
        let Some(bom) = self.boms.find_bom(&product, ctx)? else {
            return Ok(Vec::new());
        };

        match self.explosion.explode(&bom, &product, Decimal::ONE, ctx) {
            Err(AvailError::AccessDenied(_)) => Ok(Vec::new()),
            other => other,
        }
    }
}

/// 單次潛在量計算的走訪狀態
#[derive(Default)]
struct Walk {
    /// 目前遞迴路徑，用於偵測循環
    stack: Vec<ProductId>,

    /// 已算出的潛在量；情境與配置在一次計算中不變
    known: BTreeMap<ProductId, Decimal>,
}
