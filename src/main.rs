/*!
 * Priority Executor - Demo Driver
 *
 * Starts a scheduler configured from `PRIORITY_EXECUTOR_*` environment
 * variables, submits a burst of mixed-priority work while dispatch is paused,
 * then drains it and prints the final statistics as JSON.
 */

use priority_executor::{init_tracing, PriorityScheduler, SchedulerConfig, ShutdownMode};
use std::error::Error;
use std::thread;
use std::time::Duration;
use tracing::info;

const TASKS: i64 = 32;

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = SchedulerConfig::from_env()?;
    info!(config = ?config, "Priority executor starting");

    let scheduler = PriorityScheduler::with_config(config)?;
    scheduler.pause();

    let mut handles = Vec::with_capacity(TASKS as usize);
    for n in 0..TASKS {
        // Three bands: every third task is urgent, every fifth is background.
        let priority = match (n % 3, n % 5) {
            (0, _) => 10,
            (_, 0) => -5,
            _ => 0,
        };
        let handle = scheduler.submit(
            move || {
                thread::sleep(Duration::from_millis(5));
                if n == 7 {
                    Err(format!("task {} refused", n))
                } else {
                    Ok(n * n)
                }
            },
            priority,
        )?;
        handles.push(handle);
    }

    info!(queued = scheduler.queued(), "Burst queued, resuming dispatch");
    scheduler.resume();

    for handle in handles {
        let (priority, sequence) = (handle.priority(), handle.sequence());
        match handle.wait() {
            Ok(value) => info!(priority, sequence, value, "Task completed"),
            Err(e) => info!(priority, sequence, error = %e, "Task did not complete"),
        }
    }

    scheduler.shutdown(ShutdownMode::Drain);
    scheduler.await_termination(Some(Duration::from_secs(10)));

    println!("{}", serde_json::to_string_pretty(&scheduler.stats())?);
    Ok(())
}
