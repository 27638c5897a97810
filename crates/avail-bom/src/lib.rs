//! # Availability BOM
//!
//! BOM 模型、BOM 查找與多層展開（含虛擬件）

pub mod bom;
pub mod explode;
pub mod store;

// Re-export 主要類型
pub use bom::{Bom, BomLine, BomType};
pub use explode::{BomExplosion, ExplodedLine};
pub use store::{BomLookup, BomStore};
