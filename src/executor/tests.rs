//! Tests for the bounded executor

#[cfg(test)]
mod tests {
    use crate::error::ExecutorError;
    use crate::executor::{BoundedExecutor, ConcurrencyLimiter, ExecutorConfig, PoolMode, QosHint};
    use crate::task::WorkItem;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::{Duration, Instant};
    use tokio::sync::oneshot;
    use tokio::time::{sleep, timeout};
    use tokio_util::task::TaskTracker;

    const DRAIN: Duration = Duration::from_secs(10);

    async fn shutdown_within(executor: &BoundedExecutor, limit: Duration) {
        timeout(limit, executor.shutdown())
            .await
            .expect("executor failed to drain in time");
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        let start = Instant::now();
        while !cond() {
            assert!(start.elapsed() < DRAIN, "condition not reached in time");
            sleep(Duration::from_millis(1)).await;
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.label, "gatepool");
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.pool_mode, PoolMode::Serial);
        assert_eq!(config.qos, QosHint::Default);
        assert_eq!(config.backlog_limit, None);
        assert_eq!(config.gate_label(), "gatepool.gatekeeper");
        assert_eq!(config.job_label(), "gatepool.job");
    }

    #[test]
    fn test_config_validation() {
        assert!(ExecutorConfig::new("ok", 1).validate().is_ok());

        let zero = ExecutorConfig::new("zero", 0).validate();
        assert!(matches!(
            zero,
            Err(ExecutorError::InvalidMaxConcurrency { value: 0 })
        ));

        let backlog = ExecutorConfig::new("backlog", 2)
            .with_backlog_limit(0)
            .validate();
        assert!(matches!(backlog, Err(ExecutorError::InvalidBacklogLimit)));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let empty: ExecutorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ExecutorConfig::default());

        let config = ExecutorConfig::parallel("transcoder", 8)
            .with_qos(QosHint::UserInitiated)
            .with_backlog_limit(64);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("parallel"));
        assert!(json.contains("user_initiated"));
        let back: ExecutorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[tokio::test]
    async fn test_limiter_slot_accounting() {
        let limiter = ConcurrencyLimiter::new(2);
        assert_eq!(limiter.max_slots(), 2);
        assert_eq!(limiter.available_slots(), 2);

        let p1 = limiter.acquire().await.unwrap();
        let p2 = limiter.acquire().await.unwrap();
        assert_eq!(limiter.available_slots(), 0);
        assert_eq!(limiter.slots_in_use(), 2);

        drop(p1);
        assert_eq!(limiter.available_slots(), 1);

        let _p3 = limiter.acquire().await.unwrap();
        assert_eq!(limiter.available_slots(), 0);

        drop(p2);
        drop(_p3);
        assert_eq!(limiter.slots_in_use(), 0);
    }

    #[tokio::test]
    async fn test_submit_runs_all_tasks() {
        let executor = BoundedExecutor::with_config(ExecutorConfig::parallel("all", 3)).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let counter = counter.clone();
            executor
                .submit(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        shutdown_within(&executor, DRAIN).await;

        assert_eq!(counter.load(Ordering::SeqCst), 100);
        let stats = executor.stats();
        assert_eq!(stats.submitted, 100);
        assert_eq!(stats.completed, 100);
        assert_eq!(stats.executing, 0);
        assert_eq!(executor.in_flight(), 0);
        assert_eq!(executor.available_slots(), 3);
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_bound() {
        let executor = BoundedExecutor::with_config(ExecutorConfig::parallel("bound", 2)).unwrap();
        let gauge = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let gauge = gauge.clone();
            let peak = peak.clone();
            executor
                .submit(async move {
                    let now = gauge.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(5)).await;
                    gauge.fetch_sub(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        shutdown_within(&executor, DRAIN).await;

        assert_eq!(peak.load(Ordering::SeqCst), 2);
        assert_eq!(executor.stats().peak_executing, 2);
    }

    #[tokio::test]
    async fn test_fifo_admission_order() {
        let executor = BoundedExecutor::with_config(ExecutorConfig::serial("fifo", 3)).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..50 {
            let log = log.clone();
            executor
                .submit(async move {
                    log.lock().push(i);
                })
                .unwrap();
        }

        shutdown_within(&executor, DRAIN).await;

        let order = log.lock().clone();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_cancelled_items_skipped_and_slot_released() {
        let executor = BoundedExecutor::with_config(ExecutorConfig::parallel("cancel", 1)).unwrap();

        let first_ran = Arc::new(AtomicBool::new(false));
        let flag = first_ran.clone();
        let first = WorkItem::new(async move {
            flag.store(true, Ordering::SeqCst);
        });
        first.cancel();
        assert!(first.is_cancelled());
        executor.submit_item(first).unwrap();

        let second_ran = Arc::new(AtomicBool::new(false));
        let flag = second_ran.clone();
        let second = WorkItem::new(async move {
            flag.store(true, Ordering::SeqCst);
        });
        second.cancellation_token().cancel();
        executor.submit_item(second).unwrap();

        // With one slot, this only runs if the skipped items released theirs.
        let third_ran = Arc::new(AtomicBool::new(false));
        let flag = third_ran.clone();
        executor
            .submit(async move {
                flag.store(true, Ordering::SeqCst);
            })
            .unwrap();

        shutdown_within(&executor, DRAIN).await;

        assert!(!first_ran.load(Ordering::SeqCst));
        assert!(!second_ran.load(Ordering::SeqCst));
        assert!(third_ran.load(Ordering::SeqCst));
        let stats = executor.stats();
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(executor.available_slots(), 1);
    }

    #[tokio::test]
    async fn test_execute_bypasses_saturated_limiter() {
        let executor = BoundedExecutor::with_config(ExecutorConfig::parallel("direct", 1)).unwrap();

        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        executor
            .submit(async move {
                let _ = started_tx.send(());
                let _ = release_rx.await;
            })
            .unwrap();
        started_rx.await.unwrap();
        assert_eq!(executor.available_slots(), 0);
        assert_eq!(executor.in_flight(), 1);

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        timeout(
            Duration::from_secs(5),
            executor.execute(async move {
                flag.store(true, Ordering::SeqCst);
            }),
        )
        .await
        .expect("direct execution should not wait for a slot")
        .unwrap();

        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(executor.stats().direct_runs, 1);

        let _ = release_tx.send(());
        shutdown_within(&executor, DRAIN).await;
    }

    #[tokio::test]
    async fn test_execute_item_pre_cancelled() {
        let executor = BoundedExecutor::new("direct-cancel", 1).unwrap();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let item = WorkItem::new(async move {
            flag.store(true, Ordering::SeqCst);
        });
        item.cancel();
        executor.execute_item(item).await.unwrap();

        assert!(!ran.load(Ordering::SeqCst));
        let stats = executor.stats();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.direct_runs, 1);
        shutdown_within(&executor, DRAIN).await;
    }

    #[tokio::test]
    async fn test_backlog_limit_rejects_overflow() {
        let config = ExecutorConfig::parallel("bounded-backlog", 1).with_backlog_limit(2);
        let executor = BoundedExecutor::with_config(config).unwrap();

        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        executor
            .submit(async move {
                let _ = started_tx.send(());
                let _ = release_rx.await;
            })
            .unwrap();
        started_rx.await.unwrap();

        // Next submission leaves the backlog and parks in the gate's acquire.
        executor.submit(async {}).unwrap();
        wait_until(|| executor.stats().backlog == 0).await;

        executor.submit(async {}).unwrap();
        executor.submit(async {}).unwrap();
        assert_eq!(executor.stats().backlog, 2);

        let overflow = executor.submit(async {}).unwrap_err();
        assert_eq!(overflow, ExecutorError::BacklogFull { limit: 2 });

        let _ = release_tx.send(());
        shutdown_within(&executor, DRAIN).await;
        assert_eq!(executor.stats().completed, 4);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_fails() {
        let executor = BoundedExecutor::new("closed", 1).unwrap();
        shutdown_within(&executor, DRAIN).await;
        assert!(executor.is_shut_down());

        let submit = executor.submit(async {}).unwrap_err();
        assert_eq!(submit, ExecutorError::ShutDown);

        let execute = executor.execute(async {}).await.unwrap_err();
        assert_eq!(execute, ExecutorError::ShutDown);
    }

    #[tokio::test]
    async fn test_shutdown_drains_backlog() {
        let executor = BoundedExecutor::new("drain", 1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let counter = counter.clone();
            executor
                .submit(async move {
                    sleep(Duration::from_millis(1)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        shutdown_within(&executor, DRAIN).await;

        assert_eq!(counter.load(Ordering::SeqCst), 10);
        let stats = executor.stats();
        assert_eq!(stats.completed, 10);
        assert_eq!(stats.backlog, 0);
        assert_eq!(executor.in_flight(), 0);
        assert_eq!(executor.available_slots(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_idempotent() {
        let executor = BoundedExecutor::new("twice", 2).unwrap();
        executor.submit(async {}).unwrap();

        shutdown_within(&executor, DRAIN).await;
        shutdown_within(&executor, Duration::from_secs(1)).await;

        assert_eq!(executor.stats().completed, 1);
    }

    #[tokio::test]
    async fn test_panic_does_not_leak_slot_parallel() {
        let executor = BoundedExecutor::with_config(ExecutorConfig::parallel("panic", 1)).unwrap();

        executor.submit(async { panic!("task failure") }).unwrap();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        executor
            .submit(async move {
                flag.store(true, Ordering::SeqCst);
            })
            .unwrap();

        shutdown_within(&executor, DRAIN).await;

        assert!(ran.load(Ordering::SeqCst));
        let stats = executor.stats();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.executing, 0);
        assert_eq!(executor.available_slots(), 1);
    }

    #[tokio::test]
    async fn test_panic_does_not_kill_serial_lane() {
        let executor = BoundedExecutor::new("serial-panic", 1).unwrap();

        executor.submit(async { panic!("task failure") }).unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let counter = counter.clone();
            executor
                .submit(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        shutdown_within(&executor, DRAIN).await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(executor.stats().completed, 2);
    }

    #[tokio::test]
    async fn test_tracked_batch_completion() {
        let executor = BoundedExecutor::with_config(ExecutorConfig::parallel("batch", 2)).unwrap();
        let tracker = TaskTracker::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let counter = counter.clone();
            executor
                .submit_tracked(
                    async move {
                        sleep(Duration::from_millis(1)).await;
                        counter.fetch_add(1, Ordering::SeqCst);
                    },
                    &tracker,
                )
                .unwrap();
        }

        tracker.close();
        timeout(DRAIN, tracker.wait())
            .await
            .expect("tracked batch did not finish");

        assert_eq!(counter.load(Ordering::SeqCst), 5);
        shutdown_within(&executor, DRAIN).await;
    }

    #[tokio::test]
    async fn test_builder() {
        let executor = BoundedExecutor::builder()
            .with_label("built")
            .with_max_concurrency(5)
            .with_pool_mode(PoolMode::Parallel)
            .with_qos(QosHint::UserInitiated)
            .with_backlog_limit(8)
            .build()
            .unwrap();

        assert_eq!(executor.label(), "built");
        assert_eq!(executor.max_concurrency(), 5);
        assert_eq!(executor.config().pool_mode, PoolMode::Parallel);
        assert_eq!(executor.config().qos, QosHint::UserInitiated);
        assert_eq!(executor.config().backlog_limit, Some(8));
        shutdown_within(&executor, DRAIN).await;
    }

    #[test]
    fn test_construction_outside_runtime_fails() {
        let result = BoundedExecutor::new("nowhere", 2);
        assert!(matches!(result, Err(ExecutorError::NoRuntime)));
    }

    #[test]
    fn test_error_display() {
        let full = ExecutorError::BacklogFull { limit: 7 };
        assert!(full.to_string().contains("7"));

        let invalid = ExecutorError::InvalidMaxConcurrency { value: 0 };
        assert!(invalid.to_string().contains("must be > 0"));

        let closed = ExecutorError::ShutDown;
        assert!(closed.to_string().contains("shut down"));
    }
}
