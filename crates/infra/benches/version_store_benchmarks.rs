use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use tenderflow_core::{ExpectedVersion, OrganizationId, TenderId};
use tenderflow_infra::version_store::{InMemoryVersionStore, VersionStore};
use tenderflow_tenders::{
    CreateTender, EditTender, ServiceType, Tender, TenderCommand, TenderContent, TenderPatch,
};

fn create_cmd() -> TenderCommand {
    TenderCommand::Create(CreateTender {
        content: TenderContent {
            name: "Bench tender".to_string(),
            description: "Benchmark".to_string(),
            service_type: ServiceType::Delivery,
        },
        occurred_at: Utc::now(),
    })
}

fn edit_cmd(i: u64) -> TenderCommand {
    TenderCommand::Edit(EditTender {
        patch: TenderPatch {
            description: Some(format!("edit {i}")),
            ..TenderPatch::default()
        },
        occurred_at: Utc::now(),
    })
}

fn seeded(store: &InMemoryVersionStore<Tender>, history: u64) -> TenderId {
    let id = TenderId::new();
    store
        .create(Tender::draft(id, OrganizationId::new()), &create_cmd())
        .unwrap();
    for i in 1..history {
        store.handle(id, ExpectedVersion::Any, &edit_cmd(i)).unwrap();
    }
    id
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_store_create");
    group.throughput(Throughput::Elements(1));

    group.bench_function("create_tender", |b| {
        let store = InMemoryVersionStore::<Tender>::new();
        let cmd = create_cmd();
        b.iter(|| {
            store
                .create(Tender::draft(TenderId::new(), OrganizationId::new()), black_box(&cmd))
                .unwrap();
        });
    });

    group.finish();
}

fn bench_edit_with_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_store_edit");

    // Each edit clones the entity, so cost grows with history length.
    for history in [1u64, 10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("edit_after_versions", history),
            history,
            |b, &history| {
                let store = InMemoryVersionStore::<Tender>::new();
                let id = seeded(&store, history);
                let cmd = edit_cmd(history);
                b.iter(|| {
                    black_box(store.handle(id, ExpectedVersion::Any, &cmd).unwrap());
                });
            },
        );
    }

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_store_list");

    for entities in [10usize, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*entities as u64));
        group.bench_with_input(BenchmarkId::new("list", entities), entities, |b, &n| {
            let store = InMemoryVersionStore::<Tender>::new();
            for _ in 0..n {
                seeded(&store, 3);
            }
            b.iter(|| black_box(store.list().unwrap().len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create, bench_edit_with_history, bench_list);
criterion_main!(benches);
