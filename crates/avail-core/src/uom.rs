//! 計量單位與換算

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::precision::{div, mul};
use crate::{AvailError, Result, UomCategoryId, UomId};

/// 計量單位
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Uom {
    pub id: UomId,

    pub name: String,

    /// 單位類別（只有同類別可以互相換算）
    pub category_id: UomCategoryId,

    /// 一個此單位等於多少個類別基準單位（打 = 12）
    pub ratio: Decimal,

    /// 捨入步長（例如 0.01）
    pub rounding: Decimal,
}

impl Uom {
    /// 創建類別基準單位
    pub fn reference(id: &str, name: &str, category_id: &str) -> Self {
        Self {
            id: UomId::new(id),
            name: name.to_string(),
            category_id: UomCategoryId::new(category_id),
            ratio: Decimal::ONE,
            rounding: Decimal::new(1, 2),
        }
    }

    /// 創建比基準單位大 `ratio` 倍的單位
    pub fn bigger(id: &str, name: &str, category_id: &str, ratio: Decimal) -> Self {
        Self {
            ratio,
            ..Self::reference(id, name, category_id)
        }
    }

    /// 建構器模式：設置捨入步長
    pub fn with_rounding(mut self, rounding: Decimal) -> Self {
        self.rounding = rounding;
        self
    }
}

/// 單位換算協作者
pub trait UomConverter {
    /// 將 `qty` 從 `from` 換算到 `to`；類別不同時回傳 `IncompatibleUnitCategory`
    fn convert(&self, qty: Decimal, from: &UomId, to: &UomId) -> Result<Decimal>;

    /// 單位的捨入步長
    fn rounding(&self, uom: &UomId) -> Result<Decimal>;
}

/// 記憶體內單位登錄表
#[derive(Debug, Clone, Default)]
pub struct UomRegistry {
    uoms: HashMap<UomId, Uom>,
}

impl UomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 預設單位：件/打（數量類）、公斤/克（重量類）
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(Uom::reference("unit", "Unit(s)", "unit"));
        registry.insert(Uom::bigger("dozen", "Dozen(s)", "unit", Decimal::from(12)));
        registry.insert(Uom::reference("kg", "kg", "weight").with_rounding(Decimal::new(1, 3)));
        registry.insert(
            Uom::bigger("g", "g", "weight", Decimal::new(1, 3)).with_rounding(Decimal::new(1, 2)),
        );
        registry
    }

    pub fn insert(&mut self, uom: Uom) {
        self.uoms.insert(uom.id.clone(), uom);
    }

    pub fn get(&self, id: &UomId) -> Result<&Uom> {
        self.uoms
            .get(id)
            .ok_or_else(|| AvailError::UomNotFound(id.clone()))
    }
}

/// 按步長捨入
pub fn round_to_step(qty: Decimal, step: Decimal, strategy: RoundingStrategy) -> Result<Decimal> {
    if step <= Decimal::ZERO {
        return Ok(qty);
    }
    mul(div(qty, step)?.round_dp_with_strategy(0, strategy), step)
}

impl UomConverter for UomRegistry {
    fn convert(&self, qty: Decimal, from: &UomId, to: &UomId) -> Result<Decimal> {
        if from == to {
            return Ok(qty);
        }

        let from_uom = self.get(from)?;
        let to_uom = self.get(to)?;

        if from_uom.category_id != to_uom.category_id {
            return Err(AvailError::IncompatibleUnitCategory {
                from: from.clone(),
                to: to.clone(),
            });
        }

        for uom in [from_uom, to_uom] {
            if uom.ratio <= Decimal::ZERO {
                return Err(AvailError::CalculationError(format!(
                    "單位 {} 的換算比例必須為正數: {}",
                    uom.id, uom.ratio
                )));
            }
        }

        let converted = div(mul(qty, from_uom.ratio)?, to_uom.ratio)?;
        round_to_step(
            converted,
            to_uom.rounding,
            RoundingStrategy::MidpointAwayFromZero,
        )
    }

    fn rounding(&self, uom: &UomId) -> Result<Decimal> {
        Ok(self.get(uom)?.rounding)
    }
}
