//! 髒標記追蹤

use avail_core::ProductId;
use std::collections::{HashMap, HashSet};

/// 髒標記追蹤器
///
/// 除了髒產品集合，也記錄反向依賴（元件 → 使用它的產品），
/// 標記時沿反向依賴遞移擴散。
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_products: HashSet<ProductId>,
    dependents: HashMap<ProductId, HashSet<ProductId>>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 記錄 `product` 的潛在量依賴這些產品
    pub fn record_dependencies(
        &mut self,
        product: &ProductId,
        dependencies: impl IntoIterator<Item = ProductId>,
    ) {
        for dependency in dependencies {
            self.dependents
                .entry(dependency)
                .or_default()
                .insert(product.clone());
        }
    }

    /// 標記產品及所有遞移依賴它的產品為髒，回傳新標記的數量
    pub fn mark_dirty(&mut self, product: &ProductId) -> usize {
        let mut marked = 0;
        let mut visited = HashSet::new();
        let mut queue = vec![product.clone()];

        while let Some(current) = queue.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(dependents) = self.dependents.get(&current) {
                queue.extend(dependents.iter().cloned());
            }
            if self.dirty_products.insert(current) {
                marked += 1;
            }
        }

        marked
    }

    /// 檢查產品是否為髒
    pub fn is_dirty(&self, product: &ProductId) -> bool {
        self.dirty_products.contains(product)
    }

    /// 重新計算後清除單一產品的髒標記
    pub fn clear_dirty(&mut self, product: &ProductId) {
        self.dirty_products.remove(product);
    }

    /// 清除所有髒標記與依賴
    pub fn clear(&mut self) {
        self.dirty_products.clear();
        self.dependents.clear();
    }

    /// 獲取所有髒產品（排序後）
    pub fn dirty_products(&self) -> Vec<ProductId> {
        let mut products: Vec<_> = self.dirty_products.iter().cloned().collect();
        products.sort();
        products
    }
}
