//! 增量計算：緩存可用量，依明確通知失效

use avail_calc::{PotentialCalculator, ProductAvailability};
use avail_core::{AvailabilityConfig, OnHandBasis, ProductId, RequestContext, Result};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::DirtyTracker;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    product: ProductId,
    ctx: RequestContext,
    config: AvailabilityConfig,
}

/// 增量計算器
///
/// 資料變動時由呼叫端通知，被標記的產品在下次讀取時重算；
/// 讀到的結果總是與重新計算相同。
#[derive(Debug, Default)]
pub struct IncrementalCalculator {
    cache: HashMap<CacheKey, ProductAvailability>,
    tracker: DirtyTracker,
}

impl IncrementalCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得產品可用量，必要時重算
    pub fn availability(
        &mut self,
        calculator: &PotentialCalculator<'_>,
        product: &ProductId,
        ctx: &RequestContext,
    ) -> Result<ProductAvailability> {
        if self.tracker.is_dirty(product) {
            self.cache.retain(|key, _| &key.product != product);
            self.tracker.clear_dirty(product);
        }

        let key = CacheKey {
            product: product.clone(),
            ctx: ctx.clone(),
            config: *calculator.config(),
        };
        if let Some(cached) = self.cache.get(&key) {
            tracing::trace!("緩存命中: {}", product);
            return Ok(cached.clone());
        }

        let availability = calculator.availability(product, ctx)?;
        self.record_dependencies(calculator, product, ctx)?;
        self.cache.insert(key, availability.clone());

        Ok(availability)
    }

    /// 批次取得可用量
    pub fn compute_many(
        &mut self,
        calculator: &PotentialCalculator<'_>,
        products: &[ProductId],
        ctx: &RequestContext,
    ) -> Result<BTreeMap<ProductId, ProductAvailability>> {
        let mut results = BTreeMap::new();
        for product in products {
            let availability = self.availability(calculator, product, ctx)?;
            results.insert(product.clone(), availability);
        }
        Ok(results)
    }

    /// 記錄依賴；立即可用量依據下元件的依賴也一併記錄
    fn record_dependencies(
        &mut self,
        calculator: &PotentialCalculator<'_>,
        product: &ProductId,
        ctx: &RequestContext,
    ) -> Result<()> {
        let recursive = calculator.config().on_hand_basis == OnHandBasis::ImmediatelyUsable;
        let mut visited = HashSet::new();
        let mut queue = vec![product.clone()];

        while let Some(current) = queue.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let dependencies = calculator.dependency_ids(&current, ctx)?;
            if recursive {
                queue.extend(dependencies.iter().cloned());
            }
            self.tracker.record_dependencies(&current, dependencies);
        }

        Ok(())
    }

    /// 產品庫存變動
    pub fn notify_stock_changed(&mut self, product: &ProductId) {
        let marked = self.tracker.mark_dirty(product);
        tracing::debug!("庫存變動 {}：標記 {} 個產品", product, marked);
    }

    /// 產品的 BOM 變動（新增、修改、刪除）
    pub fn notify_bom_changed(&mut self, product: &ProductId) {
        let marked = self.tracker.mark_dirty(product);
        tracing::debug!("BOM 變動 {}：標記 {} 個產品", product, marked);
    }

    /// 配置變動：清除全部緩存
    pub fn notify_config_changed(&mut self) {
        tracing::info!("配置變動，清除 {} 筆緩存", self.cache.len());
        self.cache.clear();
        self.tracker.clear();
    }

    /// 緩存中的結果數
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_dirty(&self, product: &ProductId) -> bool {
        self.tracker.is_dirty(product)
    }
}
