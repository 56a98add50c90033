use car_rental_storefront::booking_estimate::{BookingEstimate, DateRange};
use car_rental_storefront::car_search::{CarSearchQuery, FilterField};
use car_rental_storefront::models::User;
use car_rental_storefront::session::SessionStore;
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::sync::Arc;
use std::thread;

pub fn estimate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("booking_estimate");
    let start = Utc.with_ymd_and_hms(2025, 6, 10, 9, 30, 0).unwrap();

    for days in [1i64, 7, 30, 365].iter() {
        let range = DateRange::new(start, start + Duration::days(*days) + Duration::hours(5));
        group.bench_with_input(BenchmarkId::from_parameter(days), &range, |b, range| {
            b.iter(|| BookingEstimate::compute(black_box(79.5), black_box(range)))
        });
    }

    group.finish();
}

pub fn search_query_benchmark(c: &mut Criterion) {
    let raw_values = ["", "   ", "Toyota", "  Tesla  ", "120", "Available", "3"];

    c.bench_function("car_search_query_build", |b| {
        let mut rng = thread_rng();
        b.iter(|| {
            let mut query = CarSearchQuery::new();
            for field in FilterField::ALL {
                if rng.gen_bool(0.5) {
                    let raw = raw_values.choose(&mut rng).unwrap();
                    query.set(field, raw);
                }
            }
            black_box(query.params().len())
        })
    });
}

pub fn session_read_benchmark(c: &mut Criterion) {
    let session = Arc::new(SessionStore::in_memory());
    session.login(
        User {
            user_id: 7,
            email: "bench@example.com".to_string(),
            username: "bench".to_string(),
            role: "customer".to_string(),
            status: "active".to_string(),
            created_at: None,
        },
        "bench-token".to_string(),
    );

    c.bench_function("session_concurrent_reads", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let session = Arc::clone(&session);
                    thread::spawn(move || {
                        for _ in 0..250 {
                            black_box(session.token());
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        })
    });
}

criterion_group!(
    benches,
    estimate_benchmark,
    search_query_benchmark,
    session_read_benchmark
);
criterion_main!(benches);
