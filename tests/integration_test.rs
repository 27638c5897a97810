//! 集成測試

use chrono::NaiveDate;
use rstest::rstest;
use std::sync::Arc;
use stock_avail::logging;
use stock_avail::prelude::*;

const MAIN_STOCK: &str = "WH/Stock";
const CHICAGO_STOCK: &str = "CH/Stock";
const CUSTOMERS: &str = "Customers";

/// 兩家公司、兩個倉庫的示範資料
///
/// 模板 PC 有兩個變體：PC-A 需 1 CPU + 1 RAM-A，PC-B 需 1 CPU + 1 RAM-B。
struct Shop {
    catalog: Arc<InMemoryCatalog>,
    uoms: Arc<UomRegistry>,
    boms: BomStore,
    stock: StockLedger,
    directory: CompanyDirectory,
}

impl Shop {
    fn new() -> Self {
        logging::init_test();

        let mut catalog = InMemoryCatalog::new();
        catalog.add_template("PC", "Computer", "unit");
        catalog.add_product(Product::new("PC-A", "PC", "unit"));
        catalog.add_product(Product::new("PC-B", "PC", "unit"));
        for id in [
            "CPU", "RAM-A", "RAM-B", "P1", "P2", "P3", "IMAC", "IMAC-PART", "DESK",
        ] {
            catalog.add_simple(id, "unit");
        }
        let catalog = Arc::new(catalog);
        let uoms = Arc::new(UomRegistry::with_defaults());

        let mut boms = BomStore::new(catalog.clone(), uoms.clone());
        boms.add(
            Bom::new("PC", "unit")
                .with_line(BomLine::new("CPU", Decimal::ONE, "unit"))
                .with_line(BomLine::new("RAM-A", Decimal::ONE, "unit").for_variants(&["PC-A"]))
                .with_line(BomLine::new("RAM-B", Decimal::ONE, "unit").for_variants(&["PC-B"])),
        );

        let mut stock = StockLedger::new();
        stock.add_location(Location::internal(MAIN_STOCK, "WH", "main"));
        stock.add_location(Location::internal(CHICAGO_STOCK, "CH", "chicago"));
        stock.add_location(Location::external(CUSTOMERS, LocationUsage::Customer));

        let mut directory = CompanyDirectory::new();
        directory.add_company(CompanyId::new("main"), None);
        directory.add_company(CompanyId::new("chicago"), Some(CompanyId::new("main")));

        Self {
            catalog,
            uoms,
            boms,
            stock,
            directory,
        }
    }

    fn admin(&self) -> RequestContext {
        RequestContext::new(Principal::superuser(CompanyId::new("main")))
    }

    fn user(&self, company: &str) -> RequestContext {
        RequestContext::new(self.directory.principal_for("demo", CompanyId::new(company)))
    }

    fn receive(&mut self, product: &str, location: &str, qty: i64) {
        self.stock.set_quantity(
            &ProductId::new(product),
            &LocationId::new(location),
            Decimal::from(qty),
        );
    }

    fn calculator(&self, config: AvailabilityConfig) -> PotentialCalculator<'_> {
        PotentialCalculator::new(
            &*self.catalog,
            &self.boms,
            &self.boms,
            &*self.uoms,
            &self.stock,
            config,
        )
    }

    fn potential(&self, product: &str, ctx: &RequestContext) -> Decimal {
        self.calculator(AvailabilityConfig::default())
            .compute_potential(&ProductId::new(product), ctx)
            .unwrap()
    }

    fn template_potential(&self, ctx: &RequestContext) -> Decimal {
        self.calculator(AvailabilityConfig::default())
            .template_availability(&TemplateId::new("PC"), ctx)
            .unwrap()
            .potential_qty
    }

    fn simple_bom(&mut self, product: &str, component: &str) {
        self.boms
            .add(Bom::new(product, "unit").with_line(BomLine::new(component, Decimal::ONE, "unit")));
    }
}

fn qty(value: i64) -> Decimal {
    Decimal::from(value)
}

#[test]
fn test_potential_qty_no_bom() {
    let mut shop = Shop::new();
    shop.receive("CPU", MAIN_STOCK, 10);

    let cpu = shop
        .calculator(AvailabilityConfig::default())
        .availability(&ProductId::new("CPU"), &shop.admin())
        .unwrap();
    assert_eq!(cpu.potential_qty, Decimal::ZERO);
    assert_eq!(cpu.immediately_usable_qty, qty(10));
}

#[test]
fn test_potential_qty_template_and_variants() {
    let mut shop = Shop::new();
    let admin = shop.admin();

    for product in ["PC-A", "PC-B"] {
        assert_eq!(shop.potential(product, &admin), Decimal::ZERO);
    }
    assert_eq!(shop.template_potential(&admin), Decimal::ZERO);

    // 只有 CPU 不足以生產
    shop.receive("CPU", MAIN_STOCK, 1000);
    assert_eq!(shop.template_potential(&admin), Decimal::ZERO);

    // 主倉收到 PC-A 的記憶體
    shop.receive("RAM-A", MAIN_STOCK, 1000);
    assert_eq!(shop.template_potential(&admin), qty(1000));
    assert_eq!(shop.potential("PC-A", &admin), qty(1000));
    assert_eq!(shop.potential("PC-B", &admin), Decimal::ZERO);

    // 芝加哥倉收到 PC-B 的元件
    shop.receive("CPU", CHICAGO_STOCK, 1000);
    shop.receive("RAM-B", CHICAGO_STOCK, 313);
    assert_eq!(shop.template_potential(&admin), qty(1000));
    assert_eq!(shop.potential("PC-A", &admin), qty(1000));
    assert_eq!(shop.potential("PC-B", &admin), qty(313));

    // 變體沒有庫存：立即可用量等於潛在量
    let pc_b = shop
        .calculator(AvailabilityConfig::default())
        .availability(&ProductId::new("PC-B"), &admin)
        .unwrap();
    assert_eq!(pc_b.immediately_usable_qty, qty(313));
}

#[rstest]
#[case::main_warehouse(Some("WH"), None, 1000)]
#[case::chicago_warehouse(Some("CH"), None, 313)]
#[case::main_location(None, Some(MAIN_STOCK), 1000)]
#[case::chicago_location(None, Some(CHICAGO_STOCK), 313)]
fn test_potential_qty_by_scope(
    #[case] warehouse: Option<&str>,
    #[case] location: Option<&str>,
    #[case] expected: i64,
) {
    let mut shop = Shop::new();
    shop.receive("CPU", MAIN_STOCK, 1000);
    shop.receive("RAM-A", MAIN_STOCK, 1000);
    shop.receive("CPU", CHICAGO_STOCK, 1000);
    shop.receive("RAM-B", CHICAGO_STOCK, 313);

    let mut ctx = shop.admin();
    if let Some(warehouse) = warehouse {
        ctx = ctx.with_warehouse(WarehouseId::new(warehouse));
    }
    if let Some(location) = location {
        ctx = ctx.with_location(LocationId::new(location));
    }

    assert_eq!(shop.template_potential(&ctx), qty(expected));
}

#[test]
fn test_force_company_restricts_stock() {
    let mut shop = Shop::new();
    shop.receive("CPU", MAIN_STOCK, 1000);
    shop.receive("RAM-A", MAIN_STOCK, 1000);
    shop.receive("CPU", CHICAGO_STOCK, 1000);
    shop.receive("RAM-B", CHICAGO_STOCK, 313);

    let ctx = shop.admin().with_force_company(CompanyId::new("chicago"));
    assert_eq!(shop.template_potential(&ctx), qty(313));
}

#[test]
fn test_warehouse_scope_keeps_company_visibility() {
    let mut shop = Shop::new();
    shop.receive("CPU", MAIN_STOCK, 1000);
    shop.receive("RAM-A", MAIN_STOCK, 1000);
    shop.receive("CPU", CHICAGO_STOCK, 1000);
    shop.receive("RAM-B", CHICAGO_STOCK, 313);

    let chicago = shop.user("chicago");
    assert_eq!(shop.template_potential(&chicago), qty(313));

    // 指定主公司的倉庫也看不到主公司的庫存
    let main_wh = chicago.with_warehouse(WarehouseId::new("WH"));
    assert_eq!(shop.template_potential(&main_wh), Decimal::ZERO);
}

#[test]
fn test_potential_qty_no_bom_for_company() {
    let mut shop = Shop::new();
    shop.receive("CPU", CHICAGO_STOCK, 1000);
    shop.receive("RAM-A", CHICAGO_STOCK, 1000);

    assert_eq!(shop.template_potential(&shop.admin()), qty(1000));

    // 主公司使用者可看到子公司的庫存
    assert_eq!(shop.template_potential(&shop.user("main")), qty(1000));

    // BOM 屬於主公司：芝加哥使用者看不到
    let bom_id = {
        let pc_a = shop.catalog.product(&ProductId::new("PC-A")).unwrap();
        shop.boms.find_bom(&pc_a, &shop.admin()).unwrap().unwrap().id
    };
    if let Some(bom) = shop.boms.get_mut(bom_id) {
        bom.company_id = Some(CompanyId::new("main"));
    }
    assert_eq!(shop.template_potential(&shop.user("chicago")), Decimal::ZERO);

    if let Some(bom) = shop.boms.get_mut(bom_id) {
        bom.company_id = Some(CompanyId::new("chicago"));
    }
    assert_eq!(shop.template_potential(&shop.user("chicago")), qty(1000));
}

#[test]
fn test_multi_unit_recursive_bom() {
    let mut shop = Shop::new();
    // P1 = 1 打 P3 + 2 × P2；P2 為虛擬件 = 2 × P3
    shop.boms.add(
        Bom::new("P1", "unit")
            .with_line(BomLine::new("P3", Decimal::ONE, "dozen"))
            .with_line(BomLine::new("P2", qty(2), "unit")),
    );
    shop.boms.add(
        Bom::new("P2", "unit")
            .phantom()
            .with_line(BomLine::new("P3", qty(2), "unit")),
    );

    assert_eq!(shop.potential("P1", &shop.admin()), Decimal::ZERO);

    for (stock, expected) in [(1, 0), (15, 0), (16, 1), (25, 1), (32, 2)] {
        shop.receive("P3", MAIN_STOCK, stock);
        assert_eq!(
            shop.potential("P1", &shop.admin()),
            qty(expected),
            "P3 庫存 {}",
            stock
        );
    }
}

#[test]
fn test_bom_qty_and_efficiency() {
    let mut shop = Shop::new();
    // 每次產出 2 打 P1，需 5 個 P2；P2 為虛擬件 = 1 打 P3
    shop.boms.add(
        Bom::new("P1", "unit")
            .with_output(qty(2), "dozen")
            .with_line(BomLine::new("P2", qty(5), "unit")),
    );
    shop.boms.add(
        Bom::new("P2", "unit")
            .phantom()
            .with_line(BomLine::new("P3", Decimal::ONE, "dozen")),
    );

    assert_eq!(shop.potential("P1", &shop.admin()), Decimal::ZERO);

    shop.receive("P3", MAIN_STOCK, 60);
    assert_eq!(shop.potential("P1", &shop.admin()), qty(24));
}

#[test]
fn test_component_stock_choice() {
    let mut shop = Shop::new();
    shop.receive("IMAC", MAIN_STOCK, 3);
    shop.stock.add_move(
        StockMove::confirmed(
            ProductId::new("IMAC"),
            LocationId::new(MAIN_STOCK),
            LocationId::new(CUSTOMERS),
            qty(3),
            NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        )
        .with_state(MoveState::Assigned),
    );
    shop.simple_bom("DESK", "IMAC");

    let mut params = InMemoryConfigStore::new();
    let desk = ProductId::new("DESK");
    let admin = shop.admin();
    let potential = |shop: &Shop, params: &InMemoryConfigStore| {
        let config = AvailabilityConfig::from_store(params).unwrap();
        shop.calculator(config)
            .compute_potential(&desk, &admin)
            .unwrap()
    };

    // 預設依現有庫存
    assert_eq!(potential(&shop, &params), qty(3));

    params.set_param("stock_available_mrp_based_on", "immediately_usable_qty");
    assert_eq!(potential(&shop, &params), Decimal::ZERO);

    // IMAC 可由虛擬件 BOM 組成
    shop.receive("IMAC-PART", MAIN_STOCK, 5);
    shop.boms.add(
        Bom::new("IMAC", "unit")
            .phantom()
            .with_line(BomLine::new("IMAC-PART", Decimal::ONE, "unit")),
    );
    assert_eq!(potential(&shop, &params), qty(5));

    params.set_param("stock_available_mrp_based_on", "virtual_available");
    assert_eq!(potential(&shop, &params), qty(5));

    params.set_param("stock_available_mrp_based_on", "free_qty");
    assert!(matches!(
        AvailabilityConfig::from_store(&params),
        Err(AvailError::InvalidConfig { .. })
    ));
}

#[test]
fn test_virtual_basis_honours_to_date() {
    let mut shop = Shop::new();
    shop.simple_bom("DESK", "IMAC");
    shop.stock.add_location(Location::external("Vendors", LocationUsage::Supplier));
    shop.stock.add_move(StockMove::confirmed(
        ProductId::new("IMAC"),
        LocationId::new("Vendors"),
        LocationId::new(MAIN_STOCK),
        qty(4),
        NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
    ));

    let config = AvailabilityConfig::default().with_on_hand_basis(OnHandBasis::VirtualAvailable);
    let calculator = shop.calculator(config);
    let desk = ProductId::new("DESK");

    assert_eq!(calculator.compute_potential(&desk, &shop.admin()).unwrap(), qty(4));

    let before_delivery = shop
        .admin()
        .with_to_date(NaiveDate::from_ymd_opt(2025, 11, 10).unwrap());
    assert_eq!(
        calculator.compute_potential(&desk, &before_delivery).unwrap(),
        Decimal::ZERO
    );
}

#[test]
fn test_potential_qty_list() {
    let mut shop = Shop::new();
    shop.simple_bom("P1", "P2");
    shop.simple_bom("P2", "P3");
    shop.receive("P3", MAIN_STOCK, 3);

    let config = AvailabilityConfig::default().with_on_hand_basis(OnHandBasis::ImmediatelyUsable);
    let calculator = shop.calculator(config);
    let ids = [ProductId::new("P1"), ProductId::new("P2"), ProductId::new("P3")];

    let results = calculator.compute_many(&ids, &shop.admin()).unwrap();
    let potentials: Vec<Decimal> = ids.iter().map(|id| results[id].potential_qty).collect();
    assert_eq!(potentials, vec![qty(3), qty(3), Decimal::ZERO]);

    for id in &ids {
        assert_eq!(
            results[id],
            calculator.availability(id, &shop.admin()).unwrap()
        );
    }
}

#[test]
fn test_cyclic_bom_with_recursive_basis() {
    let mut shop = Shop::new();
    shop.simple_bom("P1", "P2");
    shop.simple_bom("P2", "P1");

    let config = AvailabilityConfig::default().with_on_hand_basis(OnHandBasis::ImmediatelyUsable);
    let err = shop
        .calculator(config)
        .compute_potential(&ProductId::new("P1"), &shop.admin())
        .unwrap_err();
    assert!(matches!(err, AvailError::CyclicBom(_)));
}

#[test]
fn test_incremental_matches_fresh_computation() {
    let mut shop = Shop::new();
    shop.simple_bom("P1", "P2");
    shop.simple_bom("P2", "P3");
    shop.receive("P3", MAIN_STOCK, 3);

    let config = AvailabilityConfig::default().with_on_hand_basis(OnHandBasis::ImmediatelyUsable);
    let ids = [ProductId::new("P1"), ProductId::new("P2")];
    let mut cache = IncrementalCalculator::new();

    let first = cache
        .compute_many(&shop.calculator(config), &ids, &shop.admin())
        .unwrap();
    assert_eq!(first[&ids[0]].potential_qty, qty(3));

    shop.receive("P3", MAIN_STOCK, 8);
    cache.notify_stock_changed(&ProductId::new("P3"));

    let calculator = shop.calculator(config);
    let cached = cache.compute_many(&calculator, &ids, &shop.admin()).unwrap();
    let fresh = calculator.compute_many(&ids, &shop.admin()).unwrap();
    assert_eq!(cached, fresh);
    assert_eq!(cached[&ids[0]].potential_qty, qty(8));
}
