//! # 電腦組裝潛在量範例
//!
//! 這個範例展示完整的可用量計算流程：
//! - 產品：兩種記憶體規格的電腦（同一模板的兩個變體）
//! - 元件：CPU、記憶體、以打採購的螺絲、虛擬件「配件包」
//! - 配置：從 JSON 參數切換元件在庫量依據

use anyhow::Context;
use std::sync::Arc;
use stock_avail::logging;
use stock_avail::prelude::*;

fn main() -> anyhow::Result<()> {
    logging::init();

    println!("🖥️  ===== 電腦組裝潛在量範例 =====");
    println!();

    // ========== 1. 產品主資料 ==========
    println!("📦 步驟 1: 建立產品主資料");
    let mut catalog = InMemoryCatalog::new();
    catalog.add_template("PC", "Computer", "unit");
    catalog.add_product(Product::new("PC-16G", "PC", "unit").with_name("Computer 16G"));
    catalog.add_product(Product::new("PC-32G", "PC", "unit").with_name("Computer 32G"));
    for part in ["CPU", "RAM-16G", "RAM-32G", "KIT-ACC", "CABLE"] {
        catalog.add_simple(part, "unit");
    }
    catalog.add_simple("SCREW", "dozen");
    let catalog = Arc::new(catalog);
    let uoms = Arc::new(UomRegistry::with_defaults());
    println!("   ✓ 模板 PC：PC-16G、PC-32G");
    println!();

    // ========== 2. BOM ==========
    println!("🔧 步驟 2: 建立 BOM");
    let mut boms = BomStore::new(catalog.clone(), uoms.clone());
    boms.add(
        Bom::new("PC", "unit")
            .with_line(BomLine::new("CPU", Decimal::ONE, "unit"))
            .with_line(BomLine::new("RAM-16G", Decimal::from(2), "unit").for_variants(&["PC-16G"]))
            .with_line(BomLine::new("RAM-32G", Decimal::from(2), "unit").for_variants(&["PC-32G"]))
            .with_line(BomLine::new("KIT-ACC", Decimal::ONE, "unit")),
    );
    boms.add(
        Bom::new("KIT-ACC", "unit")
            .phantom()
            .with_line(BomLine::new("SCREW", Decimal::from(8), "unit"))
            .with_line(BomLine::new("CABLE", Decimal::from(2), "unit")),
    );
    println!("   ✓ PC：1 CPU + 2 記憶體 + 1 配件包（虛擬件：8 螺絲 + 2 線材）");
    println!();

    // ========== 3. 庫存 ==========
    println!("🏭 步驟 3: 盤點庫存");
    let stock_location = LocationId::new("WH/Stock");
    let mut stock = StockLedger::new();
    stock.add_location(Location::internal("WH/Stock", "WH", "main"));
    for (product, qty) in [
        ("CPU", 40),
        ("RAM-16G", 30),
        ("RAM-32G", 50),
        ("SCREW", 20),
        ("CABLE", 60),
    ] {
        stock.set_quantity(&ProductId::new(product), &stock_location, Decimal::from(qty));
        println!("   ✓ {}: {}", product, qty);
    }
    println!();

    // ========== 4. 配置 ==========
    println!("⚙️  步驟 4: 讀取配置");
    let params = InMemoryConfigStore::from_json(r#"{"stock_available_mrp_based_on": "qty_available"}"#)
        .context("讀取參數失敗")?;
    let config = AvailabilityConfig::from_store(&params)?;
    println!("   ✓ 在庫量依據: {}", config.on_hand_basis);
    println!();

    // ========== 5. 計算 ==========
    println!("🧮 步驟 5: 計算可用量");
    let calculator = PotentialCalculator::new(&*catalog, &boms, &boms, &*uoms, &stock, config);
    let ctx = RequestContext::new(Principal::superuser(CompanyId::new("main")));

    let variants = [ProductId::new("PC-16G"), ProductId::new("PC-32G")];
    for (id, figures) in calculator.compute_many(&variants, &ctx)? {
        println!(
            "   {}: 現有 {}，潛在 {}，立即可用 {}",
            id, figures.qty_available, figures.potential_qty, figures.immediately_usable_qty
        );
    }

    let pc = calculator.template_availability(&TemplateId::new("PC"), &ctx)?;
    println!("   模板 PC：潛在 {}（取變體最大值）", pc.potential_qty);

    let components = calculator.component_ids(&ProductId::new("PC-32G"), &ctx)?;
    let names: Vec<&str> = components.iter().map(|c| c.as_str()).collect();
    println!("   PC-32G 元件: {}", names.join(", "));
    println!();

    println!("✅ 完成");
    Ok(())
}
