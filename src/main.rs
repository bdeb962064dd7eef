mod application;
mod domain;
mod interfaces;
mod presentation;
mod shared;
mod infrastructure;

use axum::{extract::FromRef, routing::{get, post}, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::infrastructure::database::{ConnectionPool, ConnectionPoolConfig, initialize_schema};
use crate::shared::di::{ServiceRegistry, ServiceLifetime};
use crate::shared::Config;

pub type DbPool = sqlx::Pool<sqlx::Sqlite>;

use crate::application::services::webhook_publisher::WebhookPublisher;
use crate::application::{
    CreateBulkDeleteJobUseCase, CreateIngestJobUseCase, JobCompletedHandler, ProgressEmitter,
    StreamProgressUseCase,
};
use crate::domain::repositories::{JobRepository, ProductRepository, WebhookRepository};
use crate::infrastructure::messaging::InMemoryEventBus;
use crate::infrastructure::persistence::sqlite::{
    SqliteJobRepository, SqliteProductRepository, SqliteWebhookRepository,
};
use crate::infrastructure::progress::RedisProgressStore;
use crate::infrastructure::queue::redis_queue::RedisQueue;
use crate::infrastructure::webhook::webhook_client::WebhookClient;
use crate::infrastructure::workers::bulk_delete_worker::BulkDeleteWorker;
use crate::infrastructure::workers::ingest_worker::IngestWorker;
use crate::infrastructure::workers::webhook_delivery_worker::WebhookDeliveryWorker;
use crate::interfaces::messaging::EventBus;
use crate::presentation::http::handlers::{
    health_handlers, product_handlers, progress_handlers, upload_handlers, webhook_handlers,
};
use crate::presentation::http::middleware::{auth, cors, logging};

/// Application state shared across handlers via axum's `FromRef` pattern.
#[derive(Clone)]
struct AppState {
    registry: Arc<ServiceRegistry>,
    pool: DbPool,
    config: Arc<Config>,
    job_repo: Arc<dyn JobRepository>,
    product_repo: Arc<dyn ProductRepository>,
    webhook_repo: Arc<dyn WebhookRepository>,
    create_ingest_job_use_case: Arc<CreateIngestJobUseCase>,
    create_bulk_delete_job_use_case: Arc<CreateBulkDeleteJobUseCase>,
    stream_progress_use_case: Arc<StreamProgressUseCase>,
    webhook_publisher: Arc<WebhookPublisher>,
}

impl AppState {
    async fn new(pool: DbPool, config: Arc<Config>) -> anyhow::Result<Self> {
        let mut registry = ServiceRegistry::new();
        registry.register(pool.clone(), ServiceLifetime::Singleton);

        let job_repo: Arc<dyn JobRepository> = Arc::new(SqliteJobRepository::new(pool.clone()));
        let product_repo: Arc<dyn ProductRepository> = Arc::new(SqliteProductRepository::new(pool.clone()));
        let webhook_repo: Arc<dyn WebhookRepository> = Arc::new(SqliteWebhookRepository::new(pool.clone()));

        let queue = Arc::new(RedisQueue::connect(&config.queue_redis_url).await?);
        let progress_store = Arc::new(RedisProgressStore::connect(&config.redis_url).await?);
        let webhook_client = Arc::new(WebhookClient::new()?);

        let progress_emitter = Arc::new(ProgressEmitter::new(job_repo.clone(), progress_store.clone()));
        let webhook_publisher = Arc::new(WebhookPublisher::new(webhook_repo.clone(), queue.clone()));

        let event_bus = Arc::new(InMemoryEventBus::new());

        let job_completed_handler = Arc::new(JobCompletedHandler::new(webhook_publisher.clone()));
        event_bus
            .subscribe::<crate::domain::events::JobCompletedEvent>(job_completed_handler.clone())
            .await?;
        event_bus
            .subscribe::<crate::domain::events::JobFailedEvent>(job_completed_handler)
            .await?;

        let create_ingest_job_use_case = Arc::new(CreateIngestJobUseCase::new(job_repo.clone(), queue.clone()));
        let create_bulk_delete_job_use_case = Arc::new(CreateBulkDeleteJobUseCase::new(job_repo.clone(), queue.clone()));
        let stream_progress_use_case = Arc::new(StreamProgressUseCase::new(job_repo.clone(), progress_store.clone()));

        let ingest_worker = Arc::new(IngestWorker::new(
            job_repo.clone(),
            product_repo.clone(),
            queue.clone(),
            progress_emitter.clone(),
            event_bus.clone(),
        ));
        spawn_worker_pool(config.worker_concurrency, "ingest", move || ingest_worker.clone().run());

        let bulk_delete_worker = Arc::new(BulkDeleteWorker::new(
            job_repo.clone(),
            product_repo.clone(),
            queue.clone(),
            progress_emitter.clone(),
            event_bus.clone(),
        ));
        spawn_worker_pool(config.worker_concurrency, "bulk-delete", move || bulk_delete_worker.clone().run());

        let webhook_delivery_worker = Arc::new(WebhookDeliveryWorker::new(
            webhook_repo.clone(),
            queue.clone(),
            webhook_client.clone(),
        ));
        spawn_worker_pool(config.worker_concurrency, "webhook-delivery", move || {
            webhook_delivery_worker.clone().run()
        });

        info!("worker pools started, concurrency={}", config.worker_concurrency);

        Ok(Self {
            registry: Arc::new(registry),
            pool,
            config,
            job_repo,
            product_repo,
            webhook_repo,
            create_ingest_job_use_case,
            create_bulk_delete_job_use_case,
            stream_progress_use_case,
            webhook_publisher,
        })
    }
}

/// Spawns `count` copies of a worker's `run()` loop, each on its own task.
fn spawn_worker_pool<F, Fut>(count: usize, label: &'static str, make_run: F)
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    for slot in 0..count {
        let run = make_run();
        tokio::spawn(async move {
            info!(worker = label, slot, "worker started");
            run.await;
        });
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn JobRepository> {
    fn from_ref(state: &AppState) -> Self {
        state.job_repo.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ProductRepository> {
    fn from_ref(state: &AppState) -> Self {
        state.product_repo.clone()
    }
}

impl FromRef<AppState> for Arc<dyn WebhookRepository> {
    fn from_ref(state: &AppState) -> Self {
        state.webhook_repo.clone()
    }
}

impl FromRef<AppState> for Arc<CreateIngestJobUseCase> {
    fn from_ref(state: &AppState) -> Self {
        state.create_ingest_job_use_case.clone()
    }
}

impl FromRef<AppState> for Arc<CreateBulkDeleteJobUseCase> {
    fn from_ref(state: &AppState) -> Self {
        state.create_bulk_delete_job_use_case.clone()
    }
}

impl FromRef<AppState> for Arc<StreamProgressUseCase> {
    fn from_ref(state: &AppState) -> Self {
        state.stream_progress_use_case.clone()
    }
}

impl FromRef<AppState> for Arc<WebhookPublisher> {
    fn from_ref(state: &AppState) -> Self {
        state.webhook_publisher.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Arc::new(Config::from_env());
    info!(environment = %config.environment, "starting catalogd");

    let pool_config = ConnectionPoolConfig::new(config.database_url.clone());
    let connection_pool = ConnectionPool::create(pool_config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create connection pool: {}", e))?;
    let pool = connection_pool.inner().clone();

    initialize_schema(&pool).await?;
    info!("database schema initialized");

    let state = AppState::new(pool, config.clone()).await?;
    let api_prefix = config.api_prefix.clone();

    let app = Router::new()
        .route("/health", get(health_handlers::health_check))
        .route(&format!("{api_prefix}/upload"), post(upload_handlers::upload_csv))
        .route(
            &format!("{api_prefix}/products/bulk-delete"),
            post(upload_handlers::bulk_delete_products),
        )
        .route(
            &format!("{api_prefix}/progress/:job_id"),
            get(progress_handlers::stream_progress),
        )
        .route(
            &format!("{api_prefix}/products"),
            get(product_handlers::list_products).post(product_handlers::create_product),
        )
        .route(
            &format!("{api_prefix}/products/:id"),
            get(product_handlers::get_product)
                .put(product_handlers::update_product)
                .delete(product_handlers::delete_product),
        )
        .route(
            &format!("{api_prefix}/products/sku/:sku"),
            get(product_handlers::get_product_by_sku),
        )
        .route(
            &format!("{api_prefix}/webhooks"),
            get(webhook_handlers::list_webhooks).post(webhook_handlers::create_webhook),
        )
        .route(
            &format!("{api_prefix}/webhooks/:id"),
            get(webhook_handlers::get_webhook).delete(webhook_handlers::delete_webhook),
        )
        .route(
            &format!("{api_prefix}/webhooks/:id/deliveries"),
            get(webhook_handlers::list_webhook_deliveries),
        )
        .layer(axum::middleware::from_fn(auth::auth_middleware))
        .layer(axum::middleware::from_fn(logging::logging_middleware))
        .layer(cors::cors_layer())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("server listening on {}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
