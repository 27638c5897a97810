//! 請求上下文：呼叫者、公司、倉庫/庫位篩選

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::{CompanyId, LocationId, WarehouseId};

/// 發起計算的使用者
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,

    /// 目前公司
    pub company_id: CompanyId,

    /// 可見公司（目前公司及其子公司）
    pub allowed_company_ids: BTreeSet<CompanyId>,

    /// 超級使用者不受公司規則限制
    pub superuser: bool,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, company_id: CompanyId) -> Self {
        let allowed_company_ids = BTreeSet::from([company_id.clone()]);
        Self {
            user_id: user_id.into(),
            company_id,
            allowed_company_ids,
            superuser: false,
        }
    }

    /// 超級使用者
    pub fn superuser(company_id: CompanyId) -> Self {
        Self {
            superuser: true,
            ..Self::new("__system__", company_id)
        }
    }

    /// 建構器模式：設置可見公司
    pub fn with_allowed_companies(mut self, companies: impl IntoIterator<Item = CompanyId>) -> Self {
        self.allowed_company_ids = companies.into_iter().collect();
        self.allowed_company_ids.insert(self.company_id.clone());
        self
    }

    /// 記錄是否可見：無所屬公司的記錄對所有人可見
    pub fn can_see(&self, owner: Option<&CompanyId>) -> bool {
        match owner {
            None => true,
            Some(_) if self.superuser => true,
            Some(company) => self.allowed_company_ids.contains(company),
        }
    }
}

/// 公司樹
#[derive(Debug, Clone, Default)]
pub struct CompanyDirectory {
    parents: HashMap<CompanyId, Option<CompanyId>>,
}

impl CompanyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_company(&mut self, company: CompanyId, parent: Option<CompanyId>) {
        self.parents.insert(company, parent);
    }

    /// 公司本身及所有子孫公司
    pub fn descendants_of(&self, company: &CompanyId) -> BTreeSet<CompanyId> {
        let mut result = BTreeSet::from([company.clone()]);
        let mut changed = true;
        while changed {
            changed = false;
            for (child, parent) in &self.parents {
                if let Some(parent) = parent {
                    if result.contains(parent) && result.insert(child.clone()) {
                        changed = true;
                    }
                }
            }
        }
        result
    }

    /// 依公司樹建立使用者：可見目前公司及其子公司
    pub fn principal_for(&self, user_id: &str, company: CompanyId) -> Principal {
        let allowed = self.descendants_of(&company);
        Principal::new(user_id, company).with_allowed_companies(allowed)
    }
}

/// 請求上下文
///
/// 取代隱式環境：每次呼叫都明確傳入。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestContext {
    pub principal: Principal,

    /// 強制公司（BOM 查找與庫存只看此公司）
    pub force_company: Option<CompanyId>,

    /// 倉庫篩選
    pub warehouse: Option<WarehouseId>,

    /// 庫位篩選（優先於倉庫）
    pub location: Option<LocationId>,

    /// 預計量只計入此日期（含）之前的移動
    pub to_date: Option<NaiveDate>,
}

impl RequestContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            force_company: None,
            warehouse: None,
            location: None,
            to_date: None,
        }
    }

    /// 建構器模式：設置強制公司
    pub fn with_force_company(mut self, company: CompanyId) -> Self {
        self.force_company = Some(company);
        self
    }

    /// 建構器模式：設置倉庫
    pub fn with_warehouse(mut self, warehouse: WarehouseId) -> Self {
        self.warehouse = Some(warehouse);
        self
    }

    /// 建構器模式：設置庫位
    pub fn with_location(mut self, location: LocationId) -> Self {
        self.location = Some(location);
        self
    }

    /// 建構器模式：設置截止日期
    pub fn with_to_date(mut self, to_date: NaiveDate) -> Self {
        self.to_date = Some(to_date);
        self
    }

    /// 記錄對呼叫者是否可見（含強制公司限制）
    pub fn can_see(&self, owner: Option<&CompanyId>) -> bool {
        if let (Some(forced), Some(owner)) = (&self.force_company, owner) {
            if forced != owner {
                return false;
            }
        }
        self.principal.can_see(owner)
    }
}
