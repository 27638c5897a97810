//! BOM 模型

use avail_core::precision::div;
use avail_core::{AvailError, CompanyId, Product, ProductId, Result, TemplateId, UomId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// BOM 類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BomType {
    /// 一般製造
    Normal,
    /// 虛擬件（展開時直接穿透到其子件）
    Phantom,
}

/// BOM 行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomLine {
    pub id: Uuid,

    /// 元件
    pub product_id: ProductId,

    /// 每次生產所需數量（行單位）
    pub product_qty: Decimal,

    /// 行單位
    pub uom_id: UomId,

    /// 效率（有效用量 = 數量 / 效率）
    pub efficiency: Decimal,

    /// 僅適用於這些變體（空 = 全部）
    pub variant_ids: Vec<ProductId>,
}

impl BomLine {
    pub fn new(product_id: &str, product_qty: Decimal, uom_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: ProductId::new(product_id),
            product_qty,
            uom_id: UomId::new(uom_id),
            efficiency: Decimal::ONE,
            variant_ids: Vec::new(),
        }
    }

    /// 建構器模式：設置效率
    pub fn with_efficiency(mut self, efficiency: Decimal) -> Self {
        self.efficiency = efficiency;
        self
    }

    /// 建構器模式：限制適用變體
    pub fn for_variants(mut self, variants: &[&str]) -> Self {
        self.variant_ids = variants.iter().map(|v| ProductId::new(*v)).collect();
        self
    }

    /// 此行是否適用於該產品
    pub fn applies_to(&self, product: &ProductId) -> bool {
        self.variant_ids.is_empty() || self.variant_ids.contains(product)
    }

    /// 考慮效率後的用量
    pub fn effective_qty(&self) -> Result<Decimal> {
        if self.efficiency <= Decimal::ZERO {
            return Err(AvailError::InvalidBom(format!(
                "BOM 行 {} 效率必須為正數: {}",
                self.product_id, self.efficiency
            )));
        }
        div(self.product_qty, self.efficiency)
    }
}

/// BOM（物料清單）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bom {
    pub id: Uuid,

    /// 產品模板
    pub template_id: TemplateId,

    /// 特定變體（None = 模板所有變體）
    pub product_id: Option<ProductId>,

    /// 每次生產的產出數量
    pub product_qty: Decimal,

    /// 產出單位
    pub uom_id: UomId,

    pub bom_type: BomType,

    /// 排序（越小越優先）
    pub sequence: u32,

    pub company_id: Option<CompanyId>,

    pub lines: Vec<BomLine>,
}

impl Bom {
    /// 創建模板 BOM（每次產出 1 件）
    pub fn new(template_id: &str, uom_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id: TemplateId::new(template_id),
            product_id: None,
            product_qty: Decimal::ONE,
            uom_id: UomId::new(uom_id),
            bom_type: BomType::Normal,
            sequence: 10,
            company_id: None,
            lines: Vec::new(),
        }
    }

    /// 創建變體專用 BOM
    pub fn for_product(product: &Product) -> Self {
        Self {
            product_id: Some(product.id.clone()),
            ..Self::new(product.template_id.as_str(), product.uom_id.as_str())
        }
    }

    /// 建構器模式：設置產出數量與單位
    pub fn with_output(mut self, product_qty: Decimal, uom_id: &str) -> Self {
        self.product_qty = product_qty;
        self.uom_id = UomId::new(uom_id);
        self
    }

    /// 建構器模式：設為虛擬件
    pub fn phantom(mut self) -> Self {
        self.bom_type = BomType::Phantom;
        self
    }

    /// 建構器模式：設置排序
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// 建構器模式：設置所屬公司
    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    /// 建構器模式：添加 BOM 行
    pub fn with_line(mut self, line: BomLine) -> Self {
        self.lines.push(line);
        self
    }

    /// BOM 是否適用於該產品
    pub fn matches(&self, product: &Product) -> bool {
        match &self.product_id {
            Some(variant) => variant == &product.id,
            None => self.template_id == product.template_id,
        }
    }

    pub fn is_phantom(&self) -> bool {
        self.bom_type == BomType::Phantom
    }
}
