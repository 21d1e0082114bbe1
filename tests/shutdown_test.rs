/*!
 * Shutdown Tests
 * Drain and discard semantics, escalation, termination and drop fallback
 */

use pretty_assertions::assert_eq;
use priority_executor::{
    PriorityScheduler, SchedulerError, ShutdownMode, TaskError, TaskHandle, TaskStatus,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn paused(workers: usize) -> PriorityScheduler {
    let scheduler = PriorityScheduler::new(workers).unwrap();
    scheduler.pause();
    scheduler
}

fn counting(
    scheduler: &PriorityScheduler,
    counter: &Arc<AtomicUsize>,
    n: usize,
) -> Vec<TaskHandle<(), ()>> {
    (0..n)
        .map(|i| {
            let counter = Arc::clone(counter);
            scheduler
                .submit(
                    move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    },
                    i as i64,
                )
                .unwrap()
        })
        .collect()
}

#[test]
fn test_drain_runs_queued_work_even_when_paused() {
    let scheduler = paused(2);
    let ran = Arc::new(AtomicUsize::new(0));
    let handles = counting(&scheduler, &ran, 10);

    assert_eq!(scheduler.shutdown(ShutdownMode::Drain), 0);
    assert!(scheduler.await_termination(Some(WAIT)));

    assert_eq!(ran.load(Ordering::SeqCst), 10);
    for handle in handles {
        assert_eq!(handle.status(), TaskStatus::Completed);
        assert_eq!(handle.wait(), Ok(()));
    }
    assert_eq!(scheduler.live_workers(), 0);
}

#[test]
fn test_no_submissions_after_shutdown() {
    let scheduler = PriorityScheduler::new(1).unwrap();
    scheduler.shutdown(ShutdownMode::Drain);

    assert_eq!(
        scheduler.submit(|| Ok::<_, ()>(()), 0).unwrap_err(),
        SchedulerError::Shutdown
    );
    assert_eq!(
        scheduler.try_submit(|| Ok::<_, ()>(()), 0).unwrap_err(),
        SchedulerError::Shutdown
    );
    assert!(!SchedulerError::Shutdown.is_retryable());
}

#[test]
fn test_discard_cancels_queued_tasks() {
    let scheduler = paused(1);
    let ran = Arc::new(AtomicUsize::new(0));
    let handles = counting(&scheduler, &ran, 5);

    assert_eq!(scheduler.shutdown(ShutdownMode::Discard), 5);
    assert!(scheduler.await_termination(Some(WAIT)));

    assert_eq!(ran.load(Ordering::SeqCst), 0);
    for handle in handles {
        assert_eq!(handle.status(), TaskStatus::Cancelled);
        assert_eq!(handle.wait(), Err(TaskError::Cancelled));
    }

    let stats = scheduler.stats();
    assert_eq!(stats.cancelled, 5);
    assert_eq!(stats.finished(), 5);
    assert_eq!(stats.queued, 0);
    assert!(stats.shutdown);
}

#[test]
fn test_drain_rejects_new_work_but_completes_queued() {
    let scheduler = paused(1);
    let ran = Arc::new(AtomicUsize::new(0));
    let handles = counting(&scheduler, &ran, 4);

    assert_eq!(scheduler.shutdown(ShutdownMode::Drain), 0);
    assert_eq!(
        scheduler.submit(|| Ok::<_, ()>(()), 100).unwrap_err(),
        SchedulerError::Shutdown
    );

    for handle in handles {
        assert_eq!(handle.wait(), Ok(()));
    }
    assert_eq!(ran.load(Ordering::SeqCst), 4);

    let stats = scheduler.stats();
    assert_eq!(stats.completed, 4);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.finished(), 4);
    assert!(scheduler.await_termination(Some(WAIT)));
}

#[test]
fn test_drain_escalates_to_discard() {
    let scheduler = paused(1);
    let ran = Arc::new(AtomicUsize::new(0));
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (started_tx, started_rx) = mpsc::channel::<()>();

    let gate = scheduler
        .submit(
            move || {
                started_tx.send(()).ok();
                release_rx.recv().ok();
                Ok::<_, ()>(())
            },
            i64::MAX,
        )
        .unwrap();
    let rest = counting(&scheduler, &ran, 3);

    // Drain unpauses dispatch; the gate task occupies the only worker.
    assert_eq!(scheduler.shutdown(ShutdownMode::Drain), 0);
    started_rx.recv_timeout(WAIT).unwrap();

    assert_eq!(scheduler.shutdown(ShutdownMode::Discard), 3);
    // Asking for Drain again never downgrades.
    assert_eq!(scheduler.shutdown(ShutdownMode::Drain), 0);

    release_tx.send(()).unwrap();
    assert_eq!(gate.wait(), Ok(()));
    for handle in rest {
        assert_eq!(handle.wait(), Err(TaskError::Cancelled));
    }
    assert!(scheduler.await_termination(Some(WAIT)));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn test_running_task_finishes_during_discard() {
    let scheduler = PriorityScheduler::new(1).unwrap();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (started_tx, started_rx) = mpsc::channel::<()>();

    let running = scheduler
        .submit(
            move || {
                started_tx.send(()).ok();
                release_rx.recv().ok();
                Ok::<_, ()>("finished")
            },
            0,
        )
        .unwrap();
    started_rx.recv_timeout(WAIT).unwrap();

    assert_eq!(scheduler.shutdown(ShutdownMode::Discard), 0);
    assert!(!scheduler.await_termination(Some(Duration::from_millis(20))));

    release_tx.send(()).unwrap();
    assert_eq!(running.wait(), Ok("finished"));
    assert!(scheduler.await_termination(Some(WAIT)));
}

#[test]
fn test_await_termination_times_out_without_shutdown() {
    let scheduler = PriorityScheduler::new(1).unwrap();
    assert!(!scheduler.await_termination(Some(Duration::from_millis(20))));
    assert_eq!(scheduler.live_workers(), 1);
    scheduler.shutdown(ShutdownMode::Drain);
    assert!(scheduler.await_termination(Some(WAIT)));
}

#[test]
fn test_drop_without_shutdown_cancels_queued_work() {
    let scheduler = paused(1);
    let ran = Arc::new(AtomicUsize::new(0));
    let handles = counting(&scheduler, &ran, 4);

    drop(scheduler);

    for handle in handles {
        assert_eq!(handle.wait(), Err(TaskError::Cancelled));
    }
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancel_after_scheduler_dropped() {
    let scheduler = paused(1);
    let handle = scheduler.submit(|| Ok::<_, ()>(()), 0).unwrap();
    scheduler.shutdown(ShutdownMode::Discard);
    drop(scheduler);

    assert!(!handle.cancel());
    assert_eq!(handle.wait(), Err(TaskError::Cancelled));
}
