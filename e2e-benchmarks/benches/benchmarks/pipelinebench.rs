use criterion::{criterion_group, Criterion};

use annstore::storage_manager::StorageManager;
use common::storage_trait::EntityStore;
use sqlbridge::Conductor;

/// Conductor over a test store holding one department and `rows` users that
/// all point at it through a view-as foreign key.
fn seeded_conductor(rows: usize) -> Conductor<StorageManager> {
    let conductor = Conductor::new(StorageManager::new_test_store());
    conductor
        .translate(
            "bench",
            "CREATE TABLE departments (dept_id TEXT, department_name TEXT); \
             CREATE TABLE users (username TEXT, building TEXT, dept_id TEXT, \
             CONSTRAINT fk__view_as__department_name FOREIGN KEY (dept_id) \
             REFERENCES departments (dept_id)); \
             INSERT INTO departments (dept_id, department_name) VALUES ('ACCT', 'Accounting');",
        )
        .unwrap();
    for i in 0..rows {
        conductor
            .translate(
                "bench",
                &format!(
                    "INSERT INTO users (username, building, dept_id) \
                     VALUES ('user{}', 'West Wing', 'ACCT')",
                    i
                ),
            )
            .unwrap();
    }
    conductor
}

fn bench_insert_batch(c: &mut Criterion) {
    let conductor = Conductor::new(StorageManager::new_test_store());
    conductor
        .translate("bench", "CREATE TABLE users (username TEXT, age INTEGER)")
        .unwrap();
    let mut statements = String::new();
    for i in 0..50 {
        statements.push_str(&format!(
            "INSERT INTO users (username, age) VALUES ('user{}', {}); ",
            i, i
        ));
    }
    c.bench_function("insert_batch_50", |b| {
        b.iter(|| conductor.translate("bench", &statements).unwrap())
    });
}

fn bench_select_filtered(c: &mut Criterion) {
    let conductor = seeded_conductor(100);
    c.bench_function("select_filtered_100", |b| {
        b.iter(|| {
            conductor
                .translate(
                    "bench",
                    "SELECT username FROM users WHERE building = 'West Wing'",
                )
                .unwrap()
        })
    });
}

fn bench_select_with_fk_resolution(c: &mut Criterion) {
    let conductor = seeded_conductor(100);
    c.bench_function("select_fk_resolve_100", |b| {
        b.iter(|| {
            conductor
                .translate(
                    "bench",
                    "SELECT username, dept_id FROM users WHERE building = 'West Wing'",
                )
                .unwrap()
        })
    });
}

criterion_group! {
    name = pipelinebench;
    config = Criterion::default().sample_size(10);
    targets =
    bench_insert_batch,
    bench_select_filtered,
    bench_select_with_fk_resolution,
}
