//! 可用量計算配置

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{AvailError, QuantityPrecision, Result};

/// 在庫量依據的參數鍵
pub const ON_HAND_BASIS_KEY: &str = "stock_available_mrp_based_on";

/// 數量精度的參數鍵
pub const PRODUCT_UOM_PRECISION_KEY: &str = "decimal_precision.product_uom";

/// 元件在庫量依據
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnHandBasis {
    /// 現有庫存（預設）
    #[default]
    #[serde(rename = "qty_available")]
    QtyAvailable,

    /// 預計可用量
    #[serde(rename = "virtual_available")]
    VirtualAvailable,

    /// 立即可用量（預計可用量 + 元件自身的潛在量，遞迴）
    #[serde(rename = "immediately_usable_qty")]
    ImmediatelyUsable,
}

impl OnHandBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnHandBasis::QtyAvailable => "qty_available",
            OnHandBasis::VirtualAvailable => "virtual_available",
            OnHandBasis::ImmediatelyUsable => "immediately_usable_qty",
        }
    }
}

impl fmt::Display for OnHandBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnHandBasis {
    type Err = AvailError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "qty_available" => Ok(OnHandBasis::QtyAvailable),
            "virtual_available" => Ok(OnHandBasis::VirtualAvailable),
            "immediately_usable_qty" => Ok(OnHandBasis::ImmediatelyUsable),
            other => Err(AvailError::InvalidConfig {
                key: ON_HAND_BASIS_KEY.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// 可用量計算配置
///
/// 在組合邊界讀取一次，之後以值傳入計算器。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    /// 元件在庫量依據
    pub on_hand_basis: OnHandBasis,

    /// 數量精度
    pub precision: QuantityPrecision,
}

impl AvailabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置在庫量依據
    pub fn with_on_hand_basis(mut self, basis: OnHandBasis) -> Self {
        self.on_hand_basis = basis;
        self
    }

    /// 建構器模式：設置數量精度
    pub fn with_precision(mut self, precision: QuantityPrecision) -> Self {
        self.precision = precision;
        self
    }

    /// 從配置儲存讀取
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self> {
        let basis = store
            .get_param(ON_HAND_BASIS_KEY, OnHandBasis::default().as_str())
            .parse::<OnHandBasis>()?;

        let digits_param = store.get_param(
            PRODUCT_UOM_PRECISION_KEY,
            &QuantityPrecision::DEFAULT_DIGITS.to_string(),
        );
        let digits = digits_param
            .trim()
            .parse::<u32>()
            .map_err(|_| AvailError::InvalidConfig {
                key: PRODUCT_UOM_PRECISION_KEY.to_string(),
                value: digits_param.clone(),
            })?;

        tracing::debug!("可用量配置: 依據 {}，精度 {} 位", basis, digits);

        Ok(Self::new()
            .with_on_hand_basis(basis)
            .with_precision(QuantityPrecision::new(digits)))
    }
}

/// 配置儲存協作者（全域鍵值參數）
pub trait ConfigStore {
    fn get_param(&self, key: &str, default: &str) -> String;
}

/// 記憶體內配置儲存
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryConfigStore {
    params: HashMap<String, String>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 物件載入（值必須為字串）
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AvailError::Other(format!("配置 JSON 解析失敗: {}", e)))
    }

    pub fn set_param(&mut self, key: &str, value: &str) {
        self.params.insert(key.to_string(), value.to_string());
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn get_param(&self, key: &str, default: &str) -> String {
        self.params
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}
