//! 測試用的記憶體內資料組

use avail_bom::BomStore;
use avail_core::{
    AvailabilityConfig, CompanyId, InMemoryCatalog, Location, LocationId, Product, ProductCatalog,
    ProductId, Principal, RequestContext, StockLedger, UomRegistry,
};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::{NeedsResolver, PotentialCalculator};

pub(crate) const STOCK: &str = "WH/Stock";

pub(crate) struct World {
    pub catalog: Arc<InMemoryCatalog>,
    pub uoms: Arc<UomRegistry>,
    pub boms: BomStore,
    pub stock: StockLedger,
}

impl World {
    pub fn new(catalog: InMemoryCatalog) -> Self {
        let catalog = Arc::new(catalog);
        let uoms = Arc::new(UomRegistry::with_defaults());
        let boms = BomStore::new(catalog.clone(), uoms.clone());
        let mut stock = StockLedger::new();
        stock.add_location(Location::internal(STOCK, "WH", "main"));
        Self {
            catalog,
            uoms,
            boms,
            stock,
        }
    }

    /// 每個 (產品, 單位) 建立一個單一變體的模板
    pub fn with_products(products: &[(&str, &str)]) -> Self {
        let mut catalog = InMemoryCatalog::new();
        for (id, uom) in products {
            catalog.add_simple(id, uom);
        }
        Self::new(catalog)
    }

    pub fn ctx() -> RequestContext {
        RequestContext::new(Principal::superuser(CompanyId::new("main")))
    }

    pub fn product(&self, id: &str) -> Product {
        self.catalog
            .product(&ProductId::new(id))
            .expect("測試產品必須存在")
    }

    pub fn set_stock(&mut self, product: &str, qty: Decimal) {
        self.stock
            .set_quantity(&ProductId::new(product), &LocationId::new(STOCK), qty);
    }

    pub fn resolver(&self) -> NeedsResolver<'_> {
        NeedsResolver::new(
            &*self.catalog,
            &self.boms,
            &*self.uoms,
            AvailabilityConfig::default().precision,
        )
    }

    pub fn calculator(&self, config: AvailabilityConfig) -> PotentialCalculator<'_> {
        PotentialCalculator::new(
            &*self.catalog,
            &self.boms,
            &self.boms,
            &*self.uoms,
            &self.stock,
            config,
        )
    }
}
