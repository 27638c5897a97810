//! 主資料識別碼

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// 產品（變體）ID
    ProductId
);
string_id!(
    /// 產品模板 ID
    TemplateId
);
string_id!(
    /// 公司 ID
    CompanyId
);
string_id!(
    /// 倉庫 ID
    WarehouseId
);
string_id!(
    /// 庫位 ID
    LocationId
);
string_id!(
    /// 計量單位 ID
    UomId
);
string_id!(
    /// 計量單位類別 ID
    UomCategoryId
);
