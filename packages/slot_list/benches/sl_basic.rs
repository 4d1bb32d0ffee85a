//! Basic benchmarks for the `slot_list` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::collections::VecDeque;
use std::hint::black_box;
use std::iter;
use std::sync::Mutex;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use slot_list::SlotList;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = u64;
const TEST_VALUE: TestItem = 1024;

const CAPACITY: usize = 64;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("sl_basic");

    let allocs_op = allocs.operation("push_pop_one");
    group.bench_function("push_pop_one", |b| {
        b.iter_custom(|iters| {
            let list = SlotList::<TestItem, CAPACITY>::new();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                list.push_back(black_box(TEST_VALUE)).unwrap();
                _ = black_box(list.pop_front());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_pop_one_mutex_vec_deque");
    group.bench_function("push_pop_one_mutex_vec_deque", |b| {
        b.iter_custom(|iters| {
            let deque = Mutex::new(VecDeque::<TestItem>::with_capacity(CAPACITY));

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                deque.lock().unwrap().push_back(black_box(TEST_VALUE));
                _ = black_box(deque.lock().unwrap().pop_front());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_back_full");
    group.bench_function("push_back_full", |b| {
        b.iter_custom(|iters| {
            let list = SlotList::<TestItem, CAPACITY>::new();

            while list.push_back(TEST_VALUE).is_ok() {}

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(list.push_back(black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("remove_if_half");
    group.bench_function("remove_if_half", |b| {
        b.iter_custom(|iters| {
            let lists = iter::repeat_with(|| {
                let list = SlotList::<TestItem, CAPACITY>::new();

                for value in 0..CAPACITY as TestItem {
                    list.push_back(value).unwrap();
                }

                list
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for list in &lists {
                _ = black_box(list.remove_if(|value| value % 2 == 0));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("clear_full");
    group.bench_function("clear_full", |b| {
        b.iter_custom(|iters| {
            let lists = iter::repeat_with(|| {
                let list = SlotList::<TestItem, CAPACITY>::new();

                for value in 0..CAPACITY as TestItem {
                    list.push_back(value).unwrap();
                }

                list
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for list in &lists {
                list.clear();
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("iterate_full");
    group.bench_function("iterate_full", |b| {
        b.iter_custom(|iters| {
            let list = SlotList::<TestItem, CAPACITY>::new();

            for value in 0..CAPACITY as TestItem {
                list.push_back(value).unwrap();
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let locked = list.lock();
                _ = black_box(locked.iter().sum::<TestItem>());
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
