//! # Availability Core
//!
//! 潛在可生產量計算的核心資料模型、協作者介面與錯誤類型

pub mod config;
pub mod context;
pub mod ids;
pub mod inventory;
pub mod precision;
pub mod product;
pub mod uom;

// Re-export 主要類型
pub use config::{AvailabilityConfig, ConfigStore, InMemoryConfigStore, OnHandBasis};
pub use context::{CompanyDirectory, Principal, RequestContext};
pub use ids::{CompanyId, LocationId, ProductId, TemplateId, UomCategoryId, UomId, WarehouseId};
pub use inventory::{Location, LocationUsage, MoveState, StockLedger, StockLookup, StockMove};
pub use precision::QuantityPrecision;
pub use product::{InMemoryCatalog, Product, ProductCatalog, ProductTemplate};
pub use uom::{Uom, UomConverter, UomRegistry};

/// 可用量計算錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum AvailError {
    /// 呼叫者無權讀取 BOM 或相關主資料
    #[error("存取被拒: {0}")]
    AccessDenied(String),

    #[error("單位類別不相容: {from} → {to}")]
    IncompatibleUnitCategory { from: UomId, to: UomId },

    #[error("BOM 循環引用: {0}")]
    CyclicBom(String),

    #[error("找不到產品: {0}")]
    ProductNotFound(ProductId),

    #[error("找不到產品模板: {0}")]
    TemplateNotFound(TemplateId),

    #[error("找不到計量單位: {0}")]
    UomNotFound(UomId),

    #[error("無效的 BOM 資料: {0}")]
    InvalidBom(String),

    #[error("無效的配置值: {key}={value}")]
    InvalidConfig { key: String, value: String },

    #[error("計算錯誤: {0}")]
    CalculationError(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AvailError>;
