//! Order mediator: sequences persistence, notification and response.

use std::sync::Arc;
use std::time::Instant;

use common::OrderId;
use domain::{CreateOrderRequest, Order, OrderStatus};
use order_store::OrderRepository;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::clock::MonotonicClock;
use crate::config::MediatorConfig;
use crate::counter::ProcessedCounter;
use crate::error::MediatorError;
use crate::services::notification::{NotificationError, NotificationGateway};
use crate::sink::{Outcome, PendingResponse, ResponseSink};
use crate::stage::PipelineStage;

/// Drives one order creation request from validation to response.
///
/// Every request runs as an independent task. The only state shared between
/// pipelines is the store, the notification gateway and the processed
/// counter, all of which are safe for concurrent use.
pub struct OrderMediator<R, N>
where
    R: OrderRepository,
    N: NotificationGateway,
{
    repository: R,
    notifier: Arc<N>,
    counter: ProcessedCounter,
    clock: MonotonicClock,
    config: MediatorConfig,
}

impl<R, N> OrderMediator<R, N>
where
    R: OrderRepository + 'static,
    N: NotificationGateway + 'static,
{
    /// Creates a new order mediator.
    pub fn new(
        repository: R,
        notifier: N,
        counter: ProcessedCounter,
        config: MediatorConfig,
    ) -> Self {
        Self {
            repository,
            notifier: Arc::new(notifier),
            counter,
            clock: MonotonicClock::new(),
            config,
        }
    }

    /// Returns the store orders are persisted to.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the timeouts this mediator runs with.
    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    /// Returns the number of orders persisted so far.
    pub fn processed_count(&self) -> u64 {
        self.counter.get()
    }

    /// Starts a pipeline for `request` and returns the caller's side of the
    /// response.
    pub fn submit(self: &Arc<Self>, request: CreateOrderRequest) -> PendingResponse {
        let (sink, pending) = ResponseSink::channel();
        self.dispatch(request, sink);
        pending
    }

    /// Spawns the pipeline for `request` without waiting for it.
    ///
    /// The returned handle resolves once the pipeline has finished. If the
    /// pipeline task dies before completing `sink`, the sink is completed
    /// with an internal error.
    pub fn dispatch(
        self: &Arc<Self>,
        request: CreateOrderRequest,
        sink: ResponseSink,
    ) -> JoinHandle<()> {
        let mediator = Arc::clone(self);
        let guard = sink.clone();
        let order_id = request.order_id.clone();

        let pipeline = tokio::spawn(
            async move { mediator.process(request, sink).await }.instrument(tracing::Span::current()),
        );

        tokio::spawn(async move {
            if let Err(err) = pipeline.await {
                tracing::error!(%order_id, error = %err, "order pipeline aborted");
                if !guard.is_completed() {
                    metrics::counter!("orders_failed_total", "kind" => "internal").increment(1);
                    let _ = guard.fail(MediatorError::Internal(format!(
                        "order pipeline aborted: {err}"
                    )));
                }
            }
        })
    }

    /// Runs the pipeline for one request and completes `sink` exactly once.
    #[tracing::instrument(skip(self, request, sink), fields(order_id = %request.order_id))]
    pub async fn process(&self, request: CreateOrderRequest, sink: ResponseSink) {
        let started = Instant::now();
        let mut stage = PipelineStage::Received;

        // 1. Validate and build the record
        advance(&mut stage, PipelineStage::Validating);
        let order = match Order::new(request, OrderStatus::Processed, self.clock.now()) {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(error = %e, "order rejected");
                advance(&mut stage, PipelineStage::ValidationFailed);
                self.respond(&sink, &mut stage, Err(e.into()), started);
                return;
            }
        };
        let order_id = order.order_id().clone();

        // 2. Persist
        advance(&mut stage, PipelineStage::Persisting);
        let saved = match self.persist(order).await {
            Ok(saved) if saved.order_id() == &order_id => saved,
            Ok(saved) => {
                tracing::error!(stored = %saved.order_id(), "store returned a different order");
                advance(&mut stage, PipelineStage::PersistFailed);
                let err = MediatorError::Internal(format!(
                    "store returned order {} for {}",
                    saved.order_id(),
                    order_id
                ));
                self.respond(&sink, &mut stage, Err(err), started);
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "order persistence failed");
                advance(&mut stage, PipelineStage::PersistFailed);
                self.respond(&sink, &mut stage, Err(e), started);
                return;
            }
        };

        advance(&mut stage, PipelineStage::PersistSucceeded);
        let total = self.counter.increment();
        tracing::info!(total_processed = total, "order saved");

        // 3. Notify, detached from the response path
        advance(&mut stage, PipelineStage::Notifying);
        self.notify(&saved);

        // 4. Respond
        self.respond(&sink, &mut stage, Ok(saved.receipt()), started);
    }

    async fn persist(&self, order: Order) -> Result<Order, MediatorError> {
        let limit = self.config.persist_timeout;
        match tokio::time::timeout(limit, self.repository.save(order)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(MediatorError::Timeout { limit }),
        }
    }

    fn notify(&self, order: &Order) {
        let notifier = Arc::clone(&self.notifier);
        let contact = order.customer_contact().as_str().to_string();
        let message = notification_message(order.order_id());
        let limit = self.config.notify_timeout;
        let span = tracing::info_span!("notify", order_id = %order.order_id());

        tokio::spawn(
            async move {
                let send = notifier.send(&contact, &message);
                let result = match tokio::time::timeout(limit, send).await {
                    Ok(result) => result,
                    Err(_) => Err(NotificationError::Timeout(limit)),
                };
                match result {
                    Ok(()) => {
                        metrics::counter!("notifications_sent_total").increment(1);
                        tracing::debug!("notification sent");
                    }
                    Err(e) => {
                        metrics::counter!("notifications_failed_total").increment(1);
                        tracing::warn!(error = %e, "notification failed");
                    }
                }
            }
            .instrument(span),
        );
    }

    fn respond(
        &self,
        sink: &ResponseSink,
        stage: &mut PipelineStage,
        outcome: Outcome,
        started: Instant,
    ) {
        match &outcome {
            Ok(receipt) => {
                tracing::info!(status = %receipt.status, "order processing completed");
            }
            Err(e) => {
                metrics::counter!("orders_failed_total", "kind" => e.kind()).increment(1);
            }
        }
        metrics::histogram!("order_pipeline_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        if sink.complete(outcome).is_err() {
            tracing::error!("response was completed outside the pipeline");
        }
        advance(stage, PipelineStage::Responded);
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    debug_assert!(
        stage.can_advance_to(next),
        "illegal pipeline transition {stage} -> {next}"
    );
    tracing::debug!(from = %stage, to = %next, "pipeline stage");
    *stage = next;
}

/// Message sent to the customer once their order is persisted.
pub fn notification_message(order_id: &OrderId) -> String {
    format!("Your order {order_id} has been processed")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use domain::OrderStatus;
    use order_store::{InMemoryOrderRepository, StorageError};

    use super::*;
    use crate::services::notification::InMemoryNotificationGateway;

    type TestMediator = OrderMediator<InMemoryOrderRepository, InMemoryNotificationGateway>;

    fn setup(
        config: MediatorConfig,
    ) -> (
        Arc<TestMediator>,
        InMemoryOrderRepository,
        InMemoryNotificationGateway,
        ProcessedCounter,
    ) {
        let store = InMemoryOrderRepository::new();
        let gateway = InMemoryNotificationGateway::new();
        let counter = ProcessedCounter::new();
        let mediator = Arc::new(OrderMediator::new(
            store.clone(),
            gateway.clone(),
            counter.clone(),
            config,
        ));
        (mediator, store, gateway, counter)
    }

    fn sample_request() -> CreateOrderRequest {
        CreateOrderRequest::with_items("ABC-1", "C-1", "+15550001", ["sku1", "sku2"])
    }

    #[tokio::test]
    async fn test_happy_path() {
        let (mediator, store, gateway, counter) = setup(MediatorConfig::default());

        let receipt = mediator.submit(sample_request()).wait().await.unwrap();
        assert_eq!(receipt.order_id.as_str(), "ABC-1");
        assert_eq!(receipt.status, OrderStatus::Processed);

        let stored = store
            .find_by_id(&OrderId::from("ABC-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.items(), &["sku1".to_string(), "sku2".to_string()]);
        assert_eq!(stored.status(), OrderStatus::Processed);
        assert_eq!(counter.get(), 1);

        assert!(gateway.wait_for_sent(1, Duration::from_secs(5)).await);
        let messages = gateway.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].contact, "+15550001");
        assert_eq!(messages[0].message, "Your order ABC-1 has been processed");
    }

    #[tokio::test]
    async fn test_empty_order_id_is_rejected_before_persistence() {
        let (mediator, store, gateway, counter) = setup(MediatorConfig::default());
        let mut request = sample_request();
        request.order_id = String::new();

        let err = mediator.submit(request).wait().await.unwrap_err();
        assert!(matches!(err, MediatorError::Validation(_)));
        assert!(err.to_string().contains("order_id"));

        assert_eq!(store.save_attempts().await, 0);
        assert_eq!(gateway.attempts().await, 0);
        assert_eq!(counter.get(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_skips_notification() {
        let (mediator, store, gateway, counter) = setup(MediatorConfig::default());
        store.set_fail_on_save(true).await;

        let err = mediator.submit(sample_request()).wait().await.unwrap_err();
        assert!(matches!(err, MediatorError::Storage(StorageError::Unavailable(_))));

        assert_eq!(store.save_attempts().await, 1);
        assert_eq!(counter.get(), 0);
        assert!(!gateway.wait_for_attempts(1, Duration::from_millis(50)).await);
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_success() {
        let (mediator, _, gateway, counter) = setup(MediatorConfig::default());
        gateway.set_fail_on_send(true).await;

        let receipt = mediator.submit(sample_request()).wait().await.unwrap();
        assert_eq!(receipt.order_id.as_str(), "ABC-1");
        assert_eq!(counter.get(), 1);

        assert!(gateway.wait_for_attempts(1, Duration::from_secs(5)).await);
        assert_eq!(gateway.sent_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out() {
        let config = MediatorConfig::default().with_persist_timeout(Duration::from_millis(50));
        let (mediator, store, gateway, counter) = setup(config);
        store.set_save_delay(Some(Duration::from_secs(60))).await;

        let err = mediator.submit(sample_request()).wait().await.unwrap_err();
        assert!(matches!(
            err,
            MediatorError::Timeout { limit } if limit == Duration::from_millis(50)
        ));
        assert_eq!(counter.get(), 0);
        assert_eq!(gateway.attempts().await, 0);
    }

    #[tokio::test]
    async fn test_slow_notification_does_not_delay_response() {
        let config = MediatorConfig::default().with_notify_timeout(Duration::from_secs(30));
        let (mediator, _, gateway, _) = setup(config);
        gateway.set_send_delay(Some(Duration::from_secs(10))).await;

        let pending = mediator.submit(sample_request());
        let outcome = tokio::time::timeout(Duration::from_secs(2), pending.wait())
            .await
            .expect("response must not wait for the notification");
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_notification_timeout_is_contained() {
        let config = MediatorConfig::default().with_notify_timeout(Duration::from_millis(20));
        let (mediator, _, gateway, counter) = setup(config);
        gateway.set_send_delay(Some(Duration::from_secs(5))).await;

        assert!(mediator.submit(sample_request()).wait().await.is_ok());
        assert_eq!(counter.get(), 1);
        assert!(gateway.wait_for_attempts(1, Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn test_duplicate_order_ids_are_processed_independently() {
        let (mediator, store, _, counter) = setup(MediatorConfig::default());

        let first = mediator.submit(sample_request()).wait().await;
        let second = mediator.submit(sample_request()).wait().await;
        assert!(first.is_ok());
        assert!(second.is_ok());

        assert_eq!(counter.get(), 2);
        assert_eq!(store.save_attempts().await, 2);
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_process_completes_caller_supplied_sink() {
        let (mediator, _, _, _) = setup(MediatorConfig::default());
        let (sink, pending) = ResponseSink::channel();

        mediator.process(sample_request(), sink.clone()).await;
        assert!(sink.is_completed());
        assert!(pending.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_pre_completed_sink_keeps_first_outcome() {
        let (mediator, _, _, counter) = setup(MediatorConfig::default());
        let (sink, pending) = ResponseSink::channel();
        sink.fail(MediatorError::Internal("cancelled by caller".into()))
            .unwrap();

        mediator.process(sample_request(), sink).await;

        // The pipeline still ran, but the delivered outcome did not change
        assert_eq!(counter.get(), 1);
        let err = pending.wait().await.unwrap_err();
        assert!(err.to_string().contains("cancelled by caller"));
    }

    struct PanickingRepository;

    #[async_trait]
    impl OrderRepository for PanickingRepository {
        async fn save(&self, _order: Order) -> order_store::Result<Order> {
            panic!("store driver bug");
        }

        async fn find_by_id(&self, _order_id: &OrderId) -> order_store::Result<Option<Order>> {
            Ok(None)
        }

        async fn count_between(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> order_store::Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_panic_in_pipeline_yields_internal_error() {
        let gateway = InMemoryNotificationGateway::new();
        let mediator = Arc::new(OrderMediator::new(
            PanickingRepository,
            gateway.clone(),
            ProcessedCounter::new(),
            MediatorConfig::default(),
        ));

        let err = mediator.submit(sample_request()).wait().await.unwrap_err();
        assert!(matches!(err, MediatorError::Internal(_)));
        assert_eq!(gateway.attempts().await, 0);
    }

    struct SwappingRepository;

    #[async_trait]
    impl OrderRepository for SwappingRepository {
        async fn save(&self, order: Order) -> order_store::Result<Order> {
            let other = CreateOrderRequest::with_items("OTHER", "C-9", "+15550009", ["x"]);
            Order::new(other, order.status(), order.created_at())
                .map_err(|e| StorageError::Unavailable(e.to_string()))
        }

        async fn find_by_id(&self, _order_id: &OrderId) -> order_store::Result<Option<Order>> {
            Ok(None)
        }

        async fn count_between(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> order_store::Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_store_returning_another_order_is_internal_error() {
        let gateway = InMemoryNotificationGateway::new();
        let counter = ProcessedCounter::new();
        let mediator = Arc::new(OrderMediator::new(
            SwappingRepository,
            gateway.clone(),
            counter.clone(),
            MediatorConfig::default(),
        ));

        let err = mediator.submit(sample_request()).wait().await.unwrap_err();
        assert!(matches!(err, MediatorError::Internal(_)));
        assert_eq!(counter.get(), 0);
        assert_eq!(gateway.attempts().await, 0);
    }

    #[test]
    fn test_notification_message_template() {
        assert_eq!(
            notification_message(&OrderId::from("XYZ-9")),
            "Your order XYZ-9 has been processed"
        );
    }
}
