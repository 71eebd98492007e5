use futures::{SinkExt, StreamExt};
use kitchen_queue::domain::NewOrderRequest;
use kitchen_queue::shared::protocol::{Command, OrderRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};

// --- 配置 ---
const NUM_CLIENTS: u64 = 8; // 模拟的并发客户端数量
const TEST_DURATION: Duration = Duration::from_secs(10); // 测试持续时间
const SERVER_ADDR: &str = "127.0.0.1:7878";

const ITEMS: [&str; 6] = ["Burger", "Fries", "Salad", "Shake", "Nuggets", "Wrap"];

#[derive(Default)]
struct Counters {
    responses: AtomicU64,
    errors: AtomicU64,
    // 订单已被其他客户端完成，属于正常竞争
    not_found: AtomicU64,
    latency_nanos: AtomicU64,
}

#[tokio::main]
async fn main() {
    println!("启动队列压力测试...");
    println!("模拟客户端数量: {}", NUM_CLIENTS);
    println!("测试持续时间: {:?}", TEST_DURATION);

    let counters = Arc::new(Counters::default());
    let deadline = Instant::now() + TEST_DURATION;

    let mut handles = Vec::new();
    for client_id in 0..NUM_CLIENTS {
        let counters = counters.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) = run_client(client_id, deadline, counters).await {
                eprintln!("[客户端 {}] 出错: {}", client_id, e);
            }
        }));
    }
    for handle in handles {
        let _ = handle.await;
    }

    let responses = counters.responses.load(Ordering::Relaxed);
    let errors = counters.errors.load(Ordering::Relaxed);
    let not_found = counters.not_found.load(Ordering::Relaxed);
    let latency = counters.latency_nanos.load(Ordering::Relaxed);
    let avg_latency_us = if responses > 0 {
        latency as f64 / responses as f64 / 1000.0
    } else {
        0.0
    };

    println!("\n--- 测试结果 ---");
    println!("总响应数: {}", responses);
    println!("错误响应数: {}", errors);
    println!("取消时订单已不在队列: {}", not_found);
    println!("吞吐量 (cmd/s): {:.2}", responses as f64 / TEST_DURATION.as_secs_f64());
    println!("平均往返延迟: {:.2} µs", avg_latency_us);
}

async fn run_client(
    client_id: u64,
    deadline: Instant,
    counters: Arc<Counters>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let stream = TcpStream::connect(SERVER_ADDR).await?;
    let mut framed = Framed::new(stream, LinesCodec::new());

    // 欢迎行
    framed.next().await.ok_or("connection closed before READY")??;

    let mut rng = StdRng::seed_from_u64(client_id);
    // 每个客户端使用独立的 id 段
    let mut next_id = (client_id as i64) << 32;
    let mut issued: Vec<i64> = Vec::new();

    while Instant::now() < deadline {
        let command = random_command(&mut rng, &mut next_id, &mut issued);
        let started = Instant::now();
        framed.send(command.to_line()).await?;

        let response = match framed.next().await {
            Some(line) => line?,
            None => break,
        };

        counters
            .latency_nanos
            .fetch_add(started.elapsed().as_nanos() as u64, Ordering::Relaxed);
        counters.responses.fetch_add(1, Ordering::Relaxed);
        if response == "ERROR:ORDER_NOT_FOUND" {
            counters.not_found.fetch_add(1, Ordering::Relaxed);
        } else if response.starts_with("ERROR:") {
            counters.errors.fetch_add(1, Ordering::Relaxed);
        } else {
            let queue: Vec<OrderRecord> = serde_json::from_str(&response)?;
            retain_queued(&mut issued, &queue);
        }
    }

    Ok(())
}

/// Forgets issued ids that are no longer queued. Any client's COMPLETE can
/// take one of ours off the front.
fn retain_queued(issued: &mut Vec<i64>, queue: &[OrderRecord]) {
    let queued: HashSet<i64> = queue.iter().map(|record| record.id).collect();
    issued.retain(|id| queued.contains(id));
}

fn random_command(rng: &mut StdRng, next_id: &mut i64, issued: &mut Vec<i64>) -> Command {
    let roll = rng.gen_range(0..100);
    if roll < 20 {
        return Command::Complete;
    }
    if roll < 35 && !issued.is_empty() {
        let id = issued.swap_remove(rng.gen_range(0..issued.len()));
        return Command::Cancel { id };
    }

    *next_id += 1;
    issued.push(*next_id);
    let request = NewOrderRequest::new(
        *next_id,
        ITEMS[rng.gen_range(0..ITEMS.len())],
        rng.gen_range(1..=30),
        rng.gen_bool(0.2),
    );
    if roll < 50 {
        Command::Vip(request)
    } else {
        Command::Add(request)
    }
}
