use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use kitchen_queue::domain::{KitchenQueue, NewOrderRequest};
use kitchen_queue::application::Dispatcher;

// 构造一个包含三种等级订单的“母版”队列
fn master_queue(size: i64) -> KitchenQueue {
    let mut queue = KitchenQueue::with_capacity(size as usize * 2);
    for id in 0..size {
        let request = NewOrderRequest::new(id, "Burger", (id % 30) as u32, id % 7 == 0);
        if id % 10 == 0 {
            queue.insert_vip(request);
        } else {
            queue.insert_normal(request);
        }
    }
    queue
}

fn queue_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Kitchen Queue");
    let master = master_queue(1000);

    group.bench_function("insert normal into 1000 orders", |b| {
        b.iter_batched(
            || master.clone(),
            |mut queue| {
                queue.insert_normal(black_box(NewOrderRequest::new(5000, "Fries", 15, false)));
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("insert vip into 1000 orders", |b| {
        b.iter_batched(
            || master.clone(),
            |mut queue| {
                queue.insert_vip(black_box(NewOrderRequest::new(5000, "Fries", 15, false)));
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("cancel from middle of 1000 orders", |b| {
        b.iter_batched(
            || master.clone(),
            |mut queue| {
                let _ = queue.cancel_by_id(black_box(500));
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("complete front of 1000 orders", |b| {
        b.iter_batched(
            || master.clone(),
            |mut queue| {
                let _ = queue.complete_front();
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("dispatch ADD line into 1000 orders", |b| {
        b.iter_batched(
            || Dispatcher::with_queue(master.clone()),
            |mut dispatcher| dispatcher.handle_line(black_box("ADD,5000,Fries,15")),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, queue_benchmark);
criterion_main!(benches);
