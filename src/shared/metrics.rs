//! Prometheus Metrics Module
//!
//! 厨房队列的核心指标
//!
//! ## 指标类型
//! - **Counter**: 入队订单数（按等级）、完成数、取消数、错误数（按错误码）
//! - **Gauge**: 当前队列深度（按等级）
//! - **Histogram**: 入队订单的预计制作时间
//!
//! ## 使用示例
//! ```rust,ignore
//! use kitchen_queue::shared::metrics::METRICS;
//!
//! METRICS.orders_total.with_label_values(&["vip"]).inc();
//! ```

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge_vec,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGaugeVec, TextEncoder,
};

lazy_static! {
    /// 全局Metrics实例
    pub static ref METRICS: Metrics = Metrics::new();
}

/// Kitchen queue metrics
pub struct Metrics {
    /// 入队订单总数 (按等级: vip/express/normal)
    pub orders_total: IntCounterVec,

    /// 完成的订单总数（队首出队）
    pub completions_total: IntCounter,

    /// 取消的订单总数
    pub cancellations_total: IntCounter,

    /// 错误总数 (按错误码)
    pub errors_total: IntCounterVec,

    /// 当前队列深度 (按等级)
    pub queue_depth: IntGaugeVec,

    /// 入队订单预计制作时间分布
    pub prep_time: Histogram,
}

impl Metrics {
    fn new() -> Self {
        Self {
            orders_total: register_int_counter_vec!(
                "kitchen_queue_orders_total",
                "Total number of orders queued",
                &["tier"]
            )
            .expect("orders_total registers once"),

            completions_total: register_int_counter!(
                "kitchen_queue_completions_total",
                "Total number of orders completed from the front"
            )
            .expect("completions_total registers once"),

            cancellations_total: register_int_counter!(
                "kitchen_queue_cancellations_total",
                "Total number of orders cancelled by id"
            )
            .expect("cancellations_total registers once"),

            errors_total: register_int_counter_vec!(
                "kitchen_queue_errors_total",
                "Total number of rejected commands",
                &["code"]
            )
            .expect("errors_total registers once"),

            queue_depth: register_int_gauge_vec!(
                "kitchen_queue_depth",
                "Current number of queued orders",
                &["tier"]
            )
            .expect("queue_depth registers once"),

            prep_time: register_histogram!(
                "kitchen_queue_prep_time",
                "Prep time of queued orders",
                vec![1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0]
            )
            .expect("prep_time registers once"),
        }
    }

    /// Records the per-tier depth as `(vip, express, normal)`.
    pub fn set_depth(&self, (vip, express, normal): (usize, usize, usize)) {
        self.queue_depth.with_label_values(&["vip"]).set(vip as i64);
        self.queue_depth.with_label_values(&["express"]).set(express as i64);
        self.queue_depth.with_label_values(&["normal"]).set(normal as i64);
    }

    /// 导出Prometheus格式的指标
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
