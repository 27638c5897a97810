//! # Availability Calculation Engine
//!
//! 依 BOM 計算潛在可生產量，並彙總到產品模板

pub mod availability;
pub mod needs;
pub mod potential;
pub mod template;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export 主要類型
pub use availability::ProductAvailability;
pub use needs::{ComponentNeeds, NeedsResolver};
pub use potential::PotentialCalculator;
pub use template::{TemplateAggregator, TemplateAvailability};
