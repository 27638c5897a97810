//! 庫存模型：庫位、在庫量與庫存移動

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::precision::add;
use crate::{CompanyId, LocationId, ProductId, RequestContext, Result, WarehouseId};

/// 庫位用途
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationUsage {
    /// 內部庫位（計入庫存）
    Internal,
    /// 供應商
    Supplier,
    /// 客戶
    Customer,
    /// 盤點調整
    Inventory,
}

/// 庫位
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub warehouse_id: Option<WarehouseId>,
    pub company_id: Option<CompanyId>,
    pub usage: LocationUsage,
}

impl Location {
    /// 創建內部庫位
    pub fn internal(id: &str, warehouse_id: &str, company_id: &str) -> Self {
        Self {
            id: LocationId::new(id),
            warehouse_id: Some(WarehouseId::new(warehouse_id)),
            company_id: Some(CompanyId::new(company_id)),
            usage: LocationUsage::Internal,
        }
    }

    /// 創建外部庫位（客戶/供應商等）
    pub fn external(id: &str, usage: LocationUsage) -> Self {
        Self {
            id: LocationId::new(id),
            warehouse_id: None,
            company_id: None,
            usage,
        }
    }
}

/// 移動狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveState {
    Draft,
    Confirmed,
    Assigned,
    Done,
    Cancelled,
}

impl MoveState {
    /// 是否計入預計量
    pub fn is_pending(&self) -> bool {
        matches!(self, MoveState::Confirmed | MoveState::Assigned)
    }
}

/// 庫存移動
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMove {
    pub id: Uuid,
    pub product_id: ProductId,
    pub source: LocationId,
    pub destination: LocationId,
    /// 數量（產品庫存單位）
    pub quantity: Decimal,
    pub expected_date: NaiveDate,
    pub state: MoveState,
}

impl StockMove {
    /// 創建已確認的移動
    pub fn confirmed(
        product_id: ProductId,
        source: LocationId,
        destination: LocationId,
        quantity: Decimal,
        expected_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            source,
            destination,
            quantity,
            expected_date,
            state: MoveState::Confirmed,
        }
    }

    /// 建構器模式：設置狀態
    pub fn with_state(mut self, state: MoveState) -> Self {
        self.state = state;
        self
    }
}

/// 庫存查詢協作者（唯讀、時點快照）
pub trait StockLookup {
    /// 現有庫存
    fn qty_available(&self, product: &ProductId, ctx: &RequestContext) -> Result<Decimal>;

    /// 預計可用量（現有 + 預計入庫 - 預計出庫）
    fn virtual_available(&self, product: &ProductId, ctx: &RequestContext) -> Result<Decimal>;
}

/// 記憶體內庫存帳
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    locations: HashMap<LocationId, Location>,
    quants: HashMap<(ProductId, LocationId), Decimal>,
    moves: Vec<StockMove>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_location(&mut self, location: Location) {
        self.locations.insert(location.id.clone(), location);
    }

    /// 盤點：將產品在庫位的數量設為 `quantity`
    pub fn set_quantity(&mut self, product: &ProductId, location: &LocationId, quantity: Decimal) {
        tracing::debug!("盤點 {} @ {}: {}", product, location, quantity);
        self.quants
            .insert((product.clone(), location.clone()), quantity);
    }

    pub fn add_move(&mut self, stock_move: StockMove) {
        self.moves.push(stock_move);
    }

    /// 完成移動：更新在庫量並標記為完成
    pub fn complete_move(&mut self, move_id: Uuid) {
        let Some(stock_move) = self.moves.iter_mut().find(|m| m.id == move_id) else {
            return;
        };
        if !stock_move.state.is_pending() {
            return;
        }
        stock_move.state = MoveState::Done;

        let qty = stock_move.quantity;
        let product = stock_move.product_id.clone();
        let source = stock_move.source.clone();
        let destination = stock_move.destination.clone();

        if self.is_internal(&source) {
            *self.quants.entry((product.clone(), source)).or_default() -= qty;
        }
        if self.is_internal(&destination) {
            *self.quants.entry((product, destination)).or_default() += qty;
        }
    }

    fn is_internal(&self, location: &LocationId) -> bool {
        self.locations
            .get(location)
            .map(|l| l.usage == LocationUsage::Internal)
            .unwrap_or(false)
    }

    /// 庫位是否在上下文範圍內：庫位 > 倉庫 > 可見公司
    ///
    /// 指定庫位或倉庫只會縮小範圍，看不到的公司庫位一律排除。
    fn in_scope(&self, location: &LocationId, ctx: &RequestContext) -> bool {
        let Some(loc) = self.locations.get(location) else {
            return false;
        };
        if loc.usage != LocationUsage::Internal || !ctx.can_see(loc.company_id.as_ref()) {
            return false;
        }

        if let Some(wanted) = &ctx.location {
            return &loc.id == wanted;
        }
        if let Some(wanted) = &ctx.warehouse {
            return loc.warehouse_id.as_ref() == Some(wanted);
        }
        true
    }
}

impl StockLookup for StockLedger {
    fn qty_available(&self, product: &ProductId, ctx: &RequestContext) -> Result<Decimal> {
        self.quants
            .iter()
            .filter(|((p, loc), _)| p == product && self.in_scope(loc, ctx))
            .try_fold(Decimal::ZERO, |total, (_, qty)| add(total, *qty))
    }

    fn virtual_available(&self, product: &ProductId, ctx: &RequestContext) -> Result<Decimal> {
        let mut qty = self.qty_available(product, ctx)?;

        let pending = self.moves.iter().filter(|m| {
            &m.product_id == product
                && m.state.is_pending()
                && ctx.to_date.map_or(true, |limit| m.expected_date <= limit)
        });

        for stock_move in pending {
            let from_inside = self.in_scope(&stock_move.source, ctx);
            let to_inside = self.in_scope(&stock_move.destination, ctx);
            match (from_inside, to_inside) {
                (false, true) => qty = add(qty, stock_move.quantity)?,
                (true, false) => qty = add(qty, -stock_move.quantity)?,
                _ => {}
            }
        }

        Ok(qty)
    }
}
