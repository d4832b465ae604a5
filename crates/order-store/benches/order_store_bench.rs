use criterion::{Criterion, criterion_group, criterion_main};
use order_store::{
    Context, InMemoryOrderStore, ListOptions, NewOrder, OrderService, OrderStatus, Version,
};

fn sample_order(customer: &str) -> NewOrder {
    NewOrder::new(customer, "USD")
        .line("SKU-001", 2, 1000)
        .line("SKU-002", 1, 500)
        .attribute("channel", "web")
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();
    let ctx = Context::background();

    c.bench_function("order_store/create", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.create(&ctx, sample_order("c1"), None).await.unwrap();
            });
        });
    });
}

fn bench_idempotent_replay(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();
    let ctx = Context::background();
    rt.block_on(async {
        store
            .create(&ctx, sample_order("c1"), Some("bench-key"))
            .await
            .unwrap();
    });

    c.bench_function("order_store/idempotent_replay", |b| {
        b.iter(|| {
            rt.block_on(async {
                let created = store
                    .create(&ctx, sample_order("c1"), Some("bench-key"))
                    .await
                    .unwrap();
                assert!(created.reused);
            });
        });
    });
}

fn bench_list_page(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();
    let ctx = Context::background();

    // 1000 orders spread across 10 customers
    rt.block_on(async {
        for i in 0..1000 {
            let customer = format!("customer-{}", i % 10);
            store.create(&ctx, sample_order(&customer), None).await.unwrap();
        }
    });

    c.bench_function("order_store/list_first_page_of_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.list(&ctx, ListOptions::new().page_size(20)).await.unwrap();
            });
        });
    });

    c.bench_function("order_store/list_filtered_by_customer", |b| {
        b.iter(|| {
            rt.block_on(async {
                store
                    .list(&ctx, ListOptions::new().customer_id("customer-3"))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_status_transition(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("order_store/create_confirm_ship", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryOrderStore::new();
                let ctx = Context::background();
                let id = store
                    .create(&ctx, sample_order("c1"), None)
                    .await
                    .unwrap()
                    .order
                    .id;
                store
                    .update_status(&ctx, &id, OrderStatus::Confirmed, Some(Version::first()))
                    .await
                    .unwrap();
                store
                    .update_status(&ctx, &id, OrderStatus::Shipped, Some(Version::new(2)))
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_create_order,
    bench_idempotent_replay,
    bench_list_page,
    bench_status_transition,
);
criterion_main!(benches);
