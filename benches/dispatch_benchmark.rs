/*!
 * Dispatch Benchmarks
 *
 * Submission cost, end-to-end throughput across worker counts, and the
 * pure ordering cost of priority tasks in a heap
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use priority_executor::{PriorityScheduler, PriorityTask, ShutdownMode};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

const BATCH: u64 = 1_000;

fn bench_submit_paused(c: &mut Criterion) {
    let scheduler = PriorityScheduler::new(1).unwrap();
    scheduler.pause();

    c.bench_function("submit_paused", |b| {
        let mut priority = 0i64;
        b.iter(|| {
            priority = (priority + 7) % 100;
            let handle = scheduler
                .submit(|| Ok::<_, ()>(black_box(1u64)), priority)
                .unwrap();
            handle.cancel();
        });
    });

    scheduler.shutdown(ShutdownMode::Discard);
}

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.throughput(Throughput::Elements(BATCH));

    for workers in [1usize, 2, 4, 8] {
        let scheduler = PriorityScheduler::new(workers).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| {
                let handles: Vec<_> = (0..BATCH)
                    .map(|i| {
                        scheduler
                            .submit(move || Ok::<_, ()>(black_box(i * i)), (i % 16) as i64)
                            .unwrap()
                    })
                    .collect();
                for handle in handles {
                    handle.wait().ok();
                }
            });
        });

        scheduler.shutdown(ShutdownMode::Drain);
        scheduler.await_termination(None);
    }

    group.finish();
}

fn bench_heap_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap_ordering");
    group.throughput(Throughput::Elements(BATCH));

    for bands in [1i64, 16, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(bands), &bands, |b, &bands| {
            b.iter(|| {
                let mut heap = BinaryHeap::with_capacity(BATCH as usize);
                for seq in 0..BATCH as i64 {
                    heap.push(Reverse(PriorityTask::new((), (seq * 31) % bands, seq)));
                }
                while let Some(task) = heap.pop() {
                    black_box(task);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_submit_paused,
    bench_throughput,
    bench_heap_ordering
);
criterion_main!(benches);
