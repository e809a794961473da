//! Flush decision tests for the batch controller.
//!
//! Run with: `cargo test -p esbatch --test batch_tests`

mod common;

use std::sync::Arc;
use std::time::Duration;

use esbatch::{BatchController, ClientConfig, ClientError, EsClient, IndexEngine};

use common::{ScriptedEngine, controller};

// ============================================================================
// Threshold decisions
// ============================================================================

#[tokio::test]
async fn test_execute_batch_flushes_iff_count_reaches_threshold() {
    for threshold in 0..6 {
        for pending in 0..6 {
            let controller = BatchController::new(ScriptedEngine::new());
            let engine = controller.engine();
            engine.push(pending);

            let sent = controller.execute_batch(threshold).await.unwrap();

            if pending >= threshold {
                assert_eq!(sent, pending, "pending={pending} threshold={threshold}");
                assert_eq!(engine.pending_count(), 0);
                assert_eq!(engine.flushes(), 1);
            } else {
                assert_eq!(sent, 0, "pending={pending} threshold={threshold}");
                assert_eq!(engine.pending_count(), pending);
                assert_eq!(engine.flushes(), 0);
            }
        }
    }
}

#[tokio::test]
async fn test_execute_last_batch_skips_empty_batch() {
    let controller = BatchController::new(ScriptedEngine::new());
    let engine = controller.engine();

    assert_eq!(controller.execute_last_batch().await.unwrap(), 0);
    assert_eq!(engine.flushes(), 0);

    engine.push(3);
    assert_eq!(controller.execute_last_batch().await.unwrap(), 3);
    assert_eq!(controller.execute_last_batch().await.unwrap(), 0);
    assert_eq!(engine.flushes(), 1);
}

#[tokio::test]
async fn test_zero_threshold_reaches_engine_on_empty_batch() {
    let controller = BatchController::new(ScriptedEngine::new());
    let engine = controller.engine();

    assert_eq!(controller.execute_batch(0).await.unwrap(), 0);
    assert_eq!(engine.flushes(), 1);
}

#[tokio::test]
async fn test_pending_sequence_scenario() {
    let controller = BatchController::new(ScriptedEngine::new());
    let engine = controller.engine();

    let mut results = Vec::new();
    for target in [0usize, 3, 3, 5] {
        engine.push(target - engine.pending_count());
        results.push(controller.execute_batch(5).await.unwrap());
    }

    assert_eq!(results, vec![0, 0, 0, 5]);
    assert_eq!(engine.pending_count(), 0);
}

// ============================================================================
// Failure propagation
// ============================================================================

#[tokio::test]
async fn test_failed_flush_surfaces_transport_error_and_keeps_items() {
    let controller = BatchController::new(ScriptedEngine::new());
    let engine = controller.engine();
    engine.push(4);
    engine.fail_next_flushes(1);

    let err = controller.execute_batch(4).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
    assert_eq!(engine.pending_count(), 4);

    // No automatic retry happened; the caller retries explicitly.
    assert_eq!(engine.flushes(), 1);
    assert_eq!(controller.execute_batch(4).await.unwrap(), 4);
    assert_eq!(engine.flushes(), 2);
}

// ============================================================================
// Mutual exclusion
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_flushes_never_double_send() {
    let controller = controller();
    let engine = controller.engine();
    engine.set_flush_delay(Duration::from_millis(20));
    engine.push(10);

    let mut handles = Vec::new();
    for i in 0..8 {
        let controller = controller.clone();
        handles.push(tokio::spawn(async move {
            match i % 3 {
                0 => controller.execute_batch(10).await,
                1 => controller.execute_last_batch().await,
                _ => controller.execute_last_batch_at(10).await,
            }
        }));
    }

    let mut nonzero = 0;
    let mut total = 0;
    for handle in handles {
        let sent = handle.await.unwrap().unwrap();
        if sent > 0 {
            nonzero += 1;
        }
        total += sent;
    }

    assert_eq!(nonzero, 1);
    assert_eq!(total, 10);
    assert_eq!(engine.sent().len(), 10);
    assert_eq!(engine.flushes(), 1);
    assert_eq!(engine.max_concurrent_flushes(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_and_flushers_lose_nothing() {
    let controller = controller();
    controller.engine().set_flush_delay(Duration::from_millis(2));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let controller = controller.clone();
        handles.push(tokio::spawn(async move {
            let mut sent = 0;
            for _ in 0..25 {
                controller.engine().push(1);
                sent += controller.execute_batch(7).await.unwrap();
            }
            sent
        }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap();
    }
    total += controller.execute_last_batch().await.unwrap();
    let engine = controller.engine();

    assert_eq!(total, 100);
    assert_eq!(engine.sent().len(), 100);
    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_clients_sharing_a_controller_never_overlap_flushes() {
    let batches = controller();
    batches.engine().set_flush_delay(Duration::from_millis(50));
    batches.engine().push(5);

    let a = EsClient::with_shared_batches(ClientConfig::default(), batches.clone());
    let b = EsClient::with_shared_batches(ClientConfig::default(), Arc::clone(&batches));

    let (left, right) = tokio::join!(a.execute_batch(1), b.execute_batch(1));
    let (left, right) = (left.unwrap(), right.unwrap());

    assert_eq!(left + right, 5);
    assert!(left == 0 || right == 0, "left={left} right={right}");
    assert_eq!(batches.engine().max_concurrent_flushes(), 1);
    assert_eq!(batches.engine().sent().len(), 5);
}
