//! 產品主資料

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{AvailError, CompanyId, ProductId, Result, TemplateId, UomId};

/// 產品模板（變體共用定義，本身不持有庫存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductTemplate {
    pub id: TemplateId,
    pub name: String,
    pub uom_id: UomId,
    /// 變體（依建立順序）
    pub variant_ids: Vec<ProductId>,
}

/// 產品（可銷售/可製造的變體）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub template_id: TemplateId,
    pub name: String,
    /// 庫存單位
    pub uom_id: UomId,
    pub company_id: Option<CompanyId>,
}

impl Product {
    pub fn new(id: &str, template_id: &str, uom_id: &str) -> Self {
        Self {
            id: ProductId::new(id),
            template_id: TemplateId::new(template_id),
            name: id.to_string(),
            uom_id: UomId::new(uom_id),
            company_id: None,
        }
    }

    /// 建構器模式：設置名稱
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 建構器模式：設置所屬公司
    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }
}

/// 產品主資料協作者
pub trait ProductCatalog {
    fn product(&self, id: &ProductId) -> Result<Product>;

    fn template(&self, id: &TemplateId) -> Result<ProductTemplate>;

    fn variants_of(&self, template: &TemplateId) -> Result<Vec<Product>> {
        self.template(template)?
            .variant_ids
            .iter()
            .map(|id| self.product(id))
            .collect()
    }
}

/// 記憶體內產品目錄
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: HashMap<ProductId, Product>,
    templates: HashMap<TemplateId, ProductTemplate>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增模板（不含變體）
    pub fn add_template(&mut self, id: &str, name: &str, uom_id: &str) {
        self.templates.insert(
            TemplateId::new(id),
            ProductTemplate {
                id: TemplateId::new(id),
                name: name.to_string(),
                uom_id: UomId::new(uom_id),
                variant_ids: Vec::new(),
            },
        );
    }

    /// 新增產品；模板不存在時以產品資料自動建立
    pub fn add_product(&mut self, product: Product) {
        let template = self
            .templates
            .entry(product.template_id.clone())
            .or_insert_with(|| ProductTemplate {
                id: product.template_id.clone(),
                name: product.name.clone(),
                uom_id: product.uom_id.clone(),
                variant_ids: Vec::new(),
            });
        if !template.variant_ids.contains(&product.id) {
            template.variant_ids.push(product.id.clone());
        }
        self.products.insert(product.id.clone(), product);
    }

    /// 新增單一變體產品（模板 ID 與產品 ID 相同）
    pub fn add_simple(&mut self, id: &str, uom_id: &str) -> ProductId {
        self.add_product(Product::new(id, id, uom_id));
        ProductId::new(id)
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn product(&self, id: &ProductId) -> Result<Product> {
        self.products
            .get(id)
            .cloned()
            .ok_or_else(|| AvailError::ProductNotFound(id.clone()))
    }

    fn template(&self, id: &TemplateId) -> Result<ProductTemplate> {
        self.templates
            .get(id)
            .cloned()
            .ok_or_else(|| AvailError::TemplateNotFound(id.clone()))
    }
}
