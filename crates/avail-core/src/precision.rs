//! 數量精度（Product Unit of Measure）

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{AvailError, Result};

/// 數量精度：所有數量運算在此小數位數下進行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuantityPrecision {
    /// 小數位數
    pub digits: u32,
}

impl QuantityPrecision {
    pub const DEFAULT_DIGITS: u32 = 3;

    pub fn new(digits: u32) -> Self {
        Self { digits }
    }

    /// 四捨五入到精度（中點遠離零）
    pub fn round(&self, qty: Decimal) -> Decimal {
        qty.round_dp_with_strategy(self.digits, RoundingStrategy::MidpointAwayFromZero)
    }

    /// 在精度下是否為正數
    pub fn is_positive(&self, qty: Decimal) -> bool {
        self.round(qty) > Decimal::ZERO
    }

    /// 整數除法：兩個運算元先四捨五入到精度，再向下取整
    ///
    /// 不允許部分批次：0.9 份零件無法組出 1 份成品。
    pub fn floor_div(&self, dividend: Decimal, divisor: Decimal) -> Result<Decimal> {
        let divisor = self.round(divisor);
        if divisor <= Decimal::ZERO {
            return Err(AvailError::CalculationError(format!(
                "除數必須為正數: {}",
                divisor
            )));
        }

        self.round(dividend)
            .checked_div(divisor)
            .map(|ratio| ratio.floor())
            .ok_or_else(|| {
                AvailError::CalculationError(format!("除法溢出: {} / {}", dividend, divisor))
            })
    }
}

/// 檢查溢出的乘法
pub fn mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| AvailError::CalculationError(format!("乘法溢出: {} × {}", a, b)))
}

/// 檢查溢出的加法
pub fn add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| AvailError::CalculationError(format!("加法溢出: {} + {}", a, b)))
}

/// 檢查溢出與零除數的除法
pub fn div(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_div(b)
        .ok_or_else(|| AvailError::CalculationError(format!("除法失敗: {} / {}", a, b)))
}

impl Default for QuantityPrecision {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIGITS)
    }
}
