//! Throughput benchmarks for the operation validation pipeline.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use stockmaster_core::{ProductId, UserId, WarehouseId};
use stockmaster_infra::{
    CatalogService, InMemoryLedgerStore, InMemoryOperationStore, InMemoryProductStore,
    InMemoryStockStore, InMemoryWarehouseStore, InventoryService,
};

struct Fixture {
    inventory: InventoryService,
    product: ProductId,
    from: WarehouseId,
    to: WarehouseId,
    actor: UserId,
}

fn fixture() -> Fixture {
    let products = Arc::new(InMemoryProductStore::new());
    let warehouses = Arc::new(InMemoryWarehouseStore::new());
    let operations = Arc::new(InMemoryOperationStore::new());
    let stock = Arc::new(InMemoryStockStore::new());
    let ledger = Arc::new(InMemoryLedgerStore::new());

    let inventory = InventoryService::new(
        products.clone(),
        warehouses.clone(),
        operations,
        stock.clone(),
        ledger,
    );
    let catalog = CatalogService::new(products, warehouses, stock);

    let actor = UserId::new();
    let product = catalog
        .create_product(
            "Bench Product".to_string(),
            "SKU-BENCH".to_string(),
            "bench".to_string(),
            "pcs".to_string(),
            0,
        )
        .unwrap()
        .id;
    let from = catalog
        .create_warehouse(
            "From".to_string(),
            "WH-FROM".to_string(),
            "bench".to_string(),
            actor,
        )
        .unwrap()
        .id;
    let to = catalog
        .create_warehouse(
            "To".to_string(),
            "WH-TO".to_string(),
            "bench".to_string(),
            actor,
        )
        .unwrap()
        .id;

    // Seed enough stock that transfers do not spend the bench clamping.
    let seed = inventory
        .create_receipt(from, vec![(product, 1_000_000_000)], actor)
        .unwrap();
    inventory.validate_operation(seed.id, actor).unwrap();

    Fixture {
        inventory,
        product,
        from,
        to,
        actor,
    }
}

fn bench_validate_receipt(c: &mut Criterion) {
    let f = fixture();

    c.bench_function("validate_receipt_single_line", |b| {
        b.iter_batched(
            || {
                f.inventory
                    .create_receipt(f.to, vec![(f.product, 5)], f.actor)
                    .unwrap()
            },
            |op| f.inventory.validate_operation(op.id, f.actor).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

fn bench_validate_transfer(c: &mut Criterion) {
    let f = fixture();

    c.bench_function("validate_transfer_single_line", |b| {
        b.iter_batched(
            || {
                f.inventory
                    .create_transfer(f.from, f.to, vec![(f.product, 1)], f.actor)
                    .unwrap()
            },
            |op| f.inventory.validate_operation(op.id, f.actor).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

fn bench_validate_receipt_many_lines(c: &mut Criterion) {
    let f = fixture();
    let lines: Vec<(ProductId, i64)> = (0..50).map(|_| (f.product, 1)).collect();

    c.bench_function("validate_receipt_50_lines", |b| {
        b.iter_batched(
            || {
                f.inventory
                    .create_receipt(f.to, lines.clone(), f.actor)
                    .unwrap()
            },
            |op| f.inventory.validate_operation(op.id, f.actor).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_validate_receipt,
    bench_validate_transfer,
    bench_validate_receipt_many_lines
);
criterion_main!(benches);
