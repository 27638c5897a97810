//! 元件需求解析

use avail_bom::{Bom, BomExplosion};
use avail_core::precision::{add, mul};
use avail_core::{
    AvailError, Product, ProductCatalog, ProductId, QuantityPrecision, RequestContext, Result,
    UomConverter,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// 元件需求：生產一次 BOM 所需的各元件數量（元件自身單位）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentNeeds {
    needs: BTreeMap<ProductId, Decimal>,
}

impl ComponentNeeds {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加需求（同一元件可出現在多行、多層）
    pub fn add(&mut self, component: ProductId, qty: Decimal) -> Result<()> {
        let total = self.needs.entry(component).or_insert(Decimal::ZERO);
        *total = add(*total, qty)?;
        Ok(())
    }

    pub fn get(&self, component: &ProductId) -> Option<Decimal> {
        self.needs.get(component).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.needs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.needs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &Decimal)> {
        self.needs.iter()
    }

    /// 移除在精度下不為正數的需求
    fn retain_positive(&mut self, precision: QuantityPrecision) {
        self.needs.retain(|_, qty| precision.is_positive(*qty));
    }
}

/// 元件需求解析器
pub struct NeedsResolver<'a> {
    catalog: &'a dyn ProductCatalog,
    explosion: &'a dyn BomExplosion,
    uoms: &'a dyn UomConverter,
    precision: QuantityPrecision,
}

impl<'a> NeedsResolver<'a> {
    pub fn new(
        catalog: &'a dyn ProductCatalog,
        explosion: &'a dyn BomExplosion,
        uoms: &'a dyn UomConverter,
        precision: QuantityPrecision,
    ) -> Self {
        Self {
            catalog,
            explosion,
            uoms,
            precision,
        }
    }

    /// 解析 `product` 依 `bom` 生產一次所需的元件數量
    ///
    /// 單位類別不相容的行會被略過；`AccessDenied` 原樣回傳，由呼叫端視為無需求資料。
    pub fn resolve(
        &self,
        product: &Product,
        bom: &Bom,
        ctx: &RequestContext,
    ) -> Result<ComponentNeeds> {
        if !bom.matches(product) {
            return Err(AvailError::InvalidBom(format!(
                "BOM {} 不適用於產品 {}",
                bom.id, product.id
            )));
        }

        let lines = self.explosion.explode(bom, product, Decimal::ONE, ctx)?;
        let mut needs = ComponentNeeds::new();

        for line in &lines {
            let component = self.catalog.product(&line.component_id)?;

            let per_run = match self
                .uoms
                .convert(line.original_qty, &line.uom_id, &component.uom_id)
            {
                Ok(qty) => qty,
                Err(AvailError::IncompatibleUnitCategory { from, to }) => {
                    tracing::warn!(
                        "略過 BOM 行: 元件 {} 的行單位 {} 無法換算為 {}",
                        component.id,
                        from,
                        to
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            needs.add(component.id, mul(per_run, line.qty)?)?;
        }

        needs.retain_positive(self.precision);

        tracing::debug!(
            "產品 {} 展開 {} 行，{} 種元件",
            product.id,
            lines.len(),
            needs.len()
        );

        Ok(needs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::World;
    use avail_bom::{BomLine, BomLookup};
    use avail_core::{CompanyId, Principal};

    fn resolve(world: &World, product: &str) -> Result<ComponentNeeds> {
        let product = world.product(product);
        let bom = world
            .boms
            .find_bom(&product, &World::ctx())?
            .expect("測試產品必須有 BOM");
        world.resolver().resolve(&product, &bom, &World::ctx())
    }

    #[test]
    fn test_multi_level_multi_unit_needs_are_summed() {
        // 1 打 P3 + 2 × 2 件 P3 = 16 件
        let mut world = World::with_products(&[("P1", "unit"), ("P2", "unit"), ("P3", "unit")]);
        world.boms.add(
            Bom::new("P1", "unit")
                .with_line(BomLine::new("P3", Decimal::ONE, "dozen"))
                .with_line(BomLine::new("P2", Decimal::from(2), "unit")),
        );
        world.boms.add(
            Bom::new("P2", "unit")
                .phantom()
                .with_line(BomLine::new("P3", Decimal::from(2), "unit")),
        );

        let needs = resolve(&world, "P1").unwrap();
        assert_eq!(needs.len(), 1);
        assert_eq!(needs.get(&ProductId::new("P3")), Some(Decimal::from(16)));
    }

    #[test]
    fn test_component_uom_differs_from_line_uom() {
        // 元件以打計量，行以件計量：24 件 = 2 打
        let mut world = World::with_products(&[("BOX", "unit"), ("EGG", "dozen")]);
        world
            .boms
            .add(Bom::new("BOX", "unit").with_line(BomLine::new("EGG", Decimal::from(24), "unit")));

        // 1 件 → 0.08 打（單位捨入），× 24
        let needs = resolve(&world, "BOX").unwrap();
        assert_eq!(needs.get(&ProductId::new("EGG")), Some(Decimal::new(192, 2)));
    }

    #[test]
    fn test_incompatible_line_is_skipped() {
        let mut world = World::with_products(&[("CAKE", "unit"), ("FLOUR", "kg"), ("EGG", "unit")]);
        world.boms.add(
            Bom::new("CAKE", "unit")
                .with_line(BomLine::new("FLOUR", Decimal::ONE, "unit"))
                .with_line(BomLine::new("EGG", Decimal::from(3), "unit")),
        );

        let needs = resolve(&world, "CAKE").unwrap();
        assert_eq!(needs.len(), 1);
        assert_eq!(needs.get(&ProductId::new("FLOUR")), None);
        assert_eq!(needs.get(&ProductId::new("EGG")), Some(Decimal::from(3)));
    }

    #[test]
    fn test_all_lines_incompatible_gives_empty_needs() {
        let mut world = World::with_products(&[("CAKE", "unit"), ("FLOUR", "kg")]);
        world
            .boms
            .add(Bom::new("CAKE", "unit").with_line(BomLine::new("FLOUR", Decimal::ONE, "unit")));

        assert!(resolve(&world, "CAKE").unwrap().is_empty());
    }

    #[test]
    fn test_zero_quantity_lines_dropped() {
        let mut world = World::with_products(&[("TOP", "unit"), ("PART", "unit")]);
        world
            .boms
            .add(Bom::new("TOP", "unit").with_line(BomLine::new("PART", Decimal::ZERO, "unit")));

        assert!(resolve(&world, "TOP").unwrap().is_empty());
    }

    #[test]
    fn test_summing_needs_checks_overflow() {
        let mut needs = ComponentNeeds::new();
        let part = ProductId::new("PART");
        needs.add(part.clone(), Decimal::from(3)).unwrap();
        needs.add(part.clone(), Decimal::from(4)).unwrap();
        assert_eq!(needs.get(&part), Some(Decimal::from(7)));

        let err = needs.add(part, Decimal::MAX).unwrap_err();
        assert!(matches!(err, AvailError::CalculationError(_)));
    }

    #[test]
    fn test_bom_must_match_product() {
        let mut world = World::with_products(&[("TOP", "unit"), ("OTHER", "unit"), ("PART", "unit")]);
        let bom_id = world
            .boms
            .add(Bom::new("TOP", "unit").with_line(BomLine::new("PART", Decimal::ONE, "unit")));
        let bom = world.boms.get(bom_id).unwrap().clone();

        let err = world
            .resolver()
            .resolve(&world.product("OTHER"), &bom, &World::ctx())
            .unwrap_err();
        assert!(matches!(err, AvailError::InvalidBom(_)));
    }

    #[test]
    fn test_access_denied_is_returned() {
        let mut world = World::with_products(&[("TOP", "unit"), ("KIT", "unit"), ("PART", "unit")]);
        world
            .boms
            .add(Bom::new("TOP", "unit").with_line(BomLine::new("KIT", Decimal::ONE, "unit")));
        world.boms.add(
            Bom::new("KIT", "unit")
                .phantom()
                .with_company(CompanyId::new("other"))
                .with_line(BomLine::new("PART", Decimal::ONE, "unit")),
        );

        let user = RequestContext::new(Principal::new("demo", CompanyId::new("main")));
        let product = world.product("TOP");
        let bom = world.boms.find_bom(&product, &user).unwrap().unwrap();
        let err = world.resolver().resolve(&product, &bom, &user).unwrap_err();
        assert!(matches!(err, AvailError::AccessDenied(_)));
    }
}
