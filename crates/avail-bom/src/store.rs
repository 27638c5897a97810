//! BOM 儲存與查找

use avail_core::{CompanyId, Product, ProductCatalog, RequestContext, Result, UomConverter};
use std::sync::Arc;
use uuid::Uuid;

use crate::Bom;

/// BOM 查找協作者
pub trait BomLookup {
    /// 找出產品適用的 BOM；None 表示不可製造（或對呼叫者不可見）
    fn find_bom(&self, product: &Product, ctx: &RequestContext) -> Result<Option<Bom>>;
}

/// 記憶體內 BOM 儲存
pub struct BomStore {
    boms: Vec<Bom>,
    pub(crate) catalog: Arc<dyn ProductCatalog + Send + Sync>,
    pub(crate) uoms: Arc<dyn UomConverter + Send + Sync>,
}

impl BomStore {
    pub fn new(
        catalog: Arc<dyn ProductCatalog + Send + Sync>,
        uoms: Arc<dyn UomConverter + Send + Sync>,
    ) -> Self {
        Self {
            boms: Vec::new(),
            catalog,
            uoms,
        }
    }

    /// 新增 BOM，回傳其 ID
    pub fn add(&mut self, bom: Bom) -> Uuid {
        let id = bom.id;
        tracing::debug!(
            "新增 BOM {}：模板 {}，{} 行",
            id,
            bom.template_id,
            bom.lines.len()
        );
        self.boms.push(bom);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&Bom> {
        self.boms.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Bom> {
        self.boms.iter_mut().find(|b| b.id == id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Bom> {
        let index = self.boms.iter().position(|b| b.id == id)?;
        Some(self.boms.remove(index))
    }

    /// 在候選 BOM 中挑選：排序小者優先，同排序時變體專用 BOM 優先
    fn best<'a>(candidates: impl Iterator<Item = &'a Bom>) -> Option<&'a Bom> {
        candidates.min_by_key(|b| (b.sequence, b.product_id.is_none()))
    }

    /// 展開時查找元件的子 BOM（限定與父 BOM 相同的公司範圍，不套用可見性）
    pub(crate) fn find_for_explosion(
        &self,
        component: &Product,
        company: Option<&CompanyId>,
    ) -> Option<&Bom> {
        Self::best(self.boms.iter().filter(|b| {
            b.matches(component)
                && match company {
                    Some(company) => b.company_id.as_ref() == Some(company),
                    None => true,
                }
        }))
    }
}

impl BomLookup for BomStore {
    fn find_bom(&self, product: &Product, ctx: &RequestContext) -> Result<Option<Bom>> {
        let found = Self::best(
            self.boms
                .iter()
                .filter(|b| b.matches(product) && ctx.can_see(b.company_id.as_ref())),
        );
        Ok(found.cloned())
    }
}
