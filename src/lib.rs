//! # Stock Avail
//!
//! 以 BOM 推算製成品的潛在可生產量，並併入「立即可用量」。
//!
//! 由下而上的組成：
//! - [`avail_core`]：識別碼、單位換算、請求上下文、庫存、配置、錯誤
//! - [`avail_bom`]：BOM 模型、查找與多層展開
//! - [`avail_calc`]：元件需求、潛在量、模板彙總
//! - [`avail_cache`]：明確失效的增量計算
//!
//! ```no_run
//! use std::sync::Arc;
//! use stock_avail::prelude::*;
//!
//! # fn main() -> Result<(), AvailError> {
//! let mut catalog = InMemoryCatalog::new();
//! let kit = catalog.add_simple("KIT", "unit");
//! catalog.add_simple("PART", "unit");
//! let catalog = Arc::new(catalog);
//! let uoms = Arc::new(UomRegistry::with_defaults());
//!
//! let mut boms = BomStore::new(catalog.clone(), uoms.clone());
//! boms.add(Bom::new("KIT", "unit").with_line(BomLine::new("PART", Decimal::from(2), "unit")));
//!
//! let mut stock = StockLedger::new();
//! stock.add_location(Location::internal("WH/Stock", "WH", "main"));
//! stock.set_quantity(&ProductId::new("PART"), &LocationId::new("WH/Stock"), Decimal::from(9));
//!
//! let config = AvailabilityConfig::from_store(&InMemoryConfigStore::new())?;
//! let calculator = PotentialCalculator::new(&*catalog, &boms, &boms, &*uoms, &stock, config);
//! let ctx = RequestContext::new(Principal::superuser(CompanyId::new("main")));
//!
//! assert_eq!(calculator.compute_potential(&kit, &ctx)?, Decimal::from(4));
//! # Ok(())
//! # }
//! ```

pub mod logging;

pub use avail_bom;
pub use avail_cache;
pub use avail_calc;
pub use avail_core;

/// 常用類型
pub mod prelude {
    pub use avail_bom::{Bom, BomExplosion, BomLine, BomLookup, BomStore, BomType, ExplodedLine};
    pub use avail_cache::{DirtyTracker, IncrementalCalculator};
    pub use avail_calc::{
        ComponentNeeds, NeedsResolver, PotentialCalculator, ProductAvailability,
        TemplateAggregator, TemplateAvailability,
    };
    pub use avail_core::{
        AvailError, AvailabilityConfig, CompanyDirectory, CompanyId, ConfigStore,
        InMemoryCatalog, InMemoryConfigStore, Location, LocationId, LocationUsage, MoveState,
        OnHandBasis, Principal, Product, ProductCatalog, ProductId, QuantityPrecision,
        RequestContext, StockLedger, StockLookup, StockMove, TemplateId, Uom, UomConverter,
        UomId, UomRegistry, WarehouseId,
    };
    pub use rust_decimal::Decimal;
}
