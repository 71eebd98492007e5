//! HTTP API Server
//!
//! 与行协议共享同一个队列服务的 HTTP 接口
//!
//! ## 端点
//! - `POST /add-order` - 新订单（`isVip` 为真时走 VIP 插入）
//! - `POST /cancel-order` - 按 id 取消订单
//! - `POST /complete-selected-order` - 按 id 完成任意订单
//! - `POST /complete-order` - 完成队首订单
//! - `GET /live-queue` - 当前队列
//! - `GET /metrics` - Prometheus格式的指标
//! - `GET /health` - 健康检查
//!
//! ## 使用示例
//! ```rust,ignore
//! let server = HttpServer::new(SocketAddr::from(([0, 0, 0, 0], 3000)), handle);
//! server.run(shutdown).await?;
//! ```

use crate::application::dispatcher::CommandError;
use crate::application::service::{QueueHandle, ServiceError};
use crate::domain::{NewOrderRequest, QueueError};
use crate::shared::metrics::METRICS;
use crate::shared::protocol::{Command, OrderRecord};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;

/// HTTP API server
pub struct HttpServer {
    addr: SocketAddr,
    handle: QueueHandle,
}

impl HttpServer {
    pub fn new(addr: SocketAddr, handle: QueueHandle) -> Self {
        Self { addr, handle }
    }

    /// 启动HTTP服务器，直到 `shutdown` 完成
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = router(self.handle);

        tracing::info!("HTTP API listening on {}", self.addr);
        tracing::info!("live queue: http://{}/live-queue", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

/// Builds the API routes around a queue handle.
pub fn router(handle: QueueHandle) -> Router {
    Router::new()
        .route("/add-order", post(add_order_handler))
        .route("/cancel-order", post(cancel_order_handler))
        .route("/complete-selected-order", post(complete_selected_handler))
        .route("/complete-order", post(complete_order_handler))
        .route("/live-queue", get(live_queue_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(handle)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOrderBody {
    pub id: i64,
    pub items: String,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default)]
    pub is_express: bool,
    pub prep_time: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderIdBody {
    pub id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddOrderResponse {
    success: bool,
    message: &'static str,
    queue: Vec<OrderRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RemovedResponse {
    success: bool,
    message: &'static str,
    order_id: i64,
}

/// Failure answered to an HTTP client.
#[derive(Debug)]
enum ApiError {
    MissingFields,
    Command(CommandError),
    Unavailable,
}

impl From<ServiceError> for ApiError {
    fn from(_: ServiceError) -> Self {
        ApiError::Unavailable
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingFields => (StatusCode::BAD_REQUEST, "Missing required fields"),
            ApiError::Command(CommandError::Queue(QueueError::EmptyQueue)) => {
                (StatusCode::BAD_REQUEST, "No orders in queue")
            }
            ApiError::Command(CommandError::Queue(QueueError::NotFound(_))) => {
                (StatusCode::NOT_FOUND, "Order not found")
            }
            ApiError::Command(CommandError::Protocol(_)) => (StatusCode::BAD_REQUEST, "Invalid request"),
            ApiError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "Queue service unavailable"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn add_order_handler(
    State(handle): State<QueueHandle>,
    body: Result<Json<AddOrderBody>, JsonRejection>,
) -> Result<Json<AddOrderResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!("rejected add-order body: {}", rejection);
        ApiError::MissingFields
    })?;
    if body.items.is_empty() {
        return Err(ApiError::MissingFields);
    }

    let request = NewOrderRequest::new(body.id, body.items, body.prep_time, body.is_express);
    let command = if body.is_vip {
        Command::Vip(request)
    } else {
        Command::Add(request)
    };

    let outcome = handle.execute(command).await?.map_err(ApiError::Command)?;
    Ok(Json(AddOrderResponse {
        success: true,
        message: "Order added successfully",
        queue: outcome.queue,
    }))
}

async fn cancel_order_handler(
    State(handle): State<QueueHandle>,
    body: Result<Json<OrderIdBody>, JsonRejection>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::MissingFields)?;
    handle
        .execute(Command::Cancel { id: body.id })
        .await?
        .map_err(ApiError::Command)?;
    Ok(removed_response("Order cancelled", body.id))
}

/// 完成指定订单：与取消一样从队列中移除，但计入完成数
async fn complete_selected_handler(
    State(handle): State<QueueHandle>,
    body: Result<Json<OrderIdBody>, JsonRejection>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::MissingFields)?;
    handle
        .complete_selected(body.id)
        .await?
        .map_err(ApiError::Command)?;
    Ok(removed_response("Order completed", body.id))
}

fn removed_response(message: &'static str, order_id: i64) -> Json<RemovedResponse> {
    Json(RemovedResponse {
        success: true,
        message,
        order_id,
    })
}

async fn complete_order_handler(
    State(handle): State<QueueHandle>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let outcome = handle
        .execute(Command::Complete)
        .await?
        .map_err(ApiError::Command)?;

    let order_id = outcome
        .removed
        .map(|order| order.id)
        .ok_or(ApiError::Command(CommandError::Queue(QueueError::EmptyQueue)))?;

    Ok(removed_response("Order completed", order_id))
}

async fn live_queue_handler(State(handle): State<QueueHandle>) -> Result<Response, ApiError> {
    let queue = handle.snapshot().await?;
    Ok(Json(json!({ "queue": queue })).into_response())
}

/// Prometheus metrics端点
async fn metrics_handler() -> Response {
    (StatusCode::OK, METRICS.export()).into_response()
}

/// 健康检查端点
async fn health_handler() -> Response {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::service::QueueService;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let (service, handle) = QueueService::new();
        tokio::spawn(service.run());
        router(handle)
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    #[tokio::test]
    async fn test_add_and_live_queue() {
        let app = app();

        let (status, body) = post_json(
            &app,
            "/add-order",
            json!({"id": 1, "items": "Burger", "prepTime": 10}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = post_json(
            &app,
            "/add-order",
            json!({"id": 2, "items": "Salad", "isVip": true, "isExpress": true, "prepTime": 30}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(&app, "/live-queue").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["queue"][0]["id"], 2);
        assert_eq!(body["queue"][0]["isVip"], true);
        assert_eq!(body["queue"][0]["isExpress"], true);
        assert_eq!(body["queue"][1]["id"], 1);
    }

    #[tokio::test]
    async fn test_add_missing_fields() {
        let app = app();

        let (status, body) = post_json(&app, "/add-order", json!({"id": 1, "items": "Burger"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");

        let (status, _) = post_json(&app, "/add-order", json!({"id": 1, "items": "", "prepTime": 3})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_complete_order() {
        let app = app();

        let (status, body) = post_json(&app, "/complete-order", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No orders in queue");

        post_json(&app, "/add-order", json!({"id": 5, "items": "Fries", "prepTime": 2})).await;
        let (status, body) = post_json(&app, "/complete-order", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["orderId"], 5);
    }

    #[tokio::test]
    async fn test_cancel_and_complete_selected() {
        let app = app();
        for id in 1..=3 {
            post_json(&app, "/add-order", json!({"id": id, "items": "Burger", "prepTime": id})).await;
        }

        let (status, body) = post_json(&app, "/complete-selected-order", json!({"id": 2})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Order completed");

        let (status, body) = post_json(&app, "/cancel-order", json!({"id": 3})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["orderId"], 3);

        let (status, body) = post_json(&app, "/cancel-order", json!({"id": 3})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Order not found");

        let (_, body) = get(&app, "/live-queue").await;
        assert_eq!(body["queue"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_health_and_metrics() {
        let app = app();

        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
