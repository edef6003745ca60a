//! # Example: logged
//!
//! Attaches the built-in [`LogWriter`] to a shared [`Bus`] and runs two tasks:
//! one to completion, one cancelled from the host.
//!
//! ## Flow
//! ```text
//! Task::start ──► Bus.publish(Started)
//! parent token cancelled ─► task stops early
//! finish      ──► Bus.publish(Completed | Cancelled)
//!                    └─► SubscriberSet worker ──► LogWriter.on_event()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example logged --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskpump::{
    Bus, CancellationToken, Config, Context, LogWriter, Subscribe, SubscriberSet, Task,
    TokioExecutor, WorkFn,
};

fn ticker(ticks: u32, ctx: &Context<u32>) -> Result<u32, std::io::Error> {
    for i in 0..ticks {
        if ctx.is_cancelled() {
            return Ok(i);
        }
        ctx.publish_progress(i);
        std::thread::sleep(Duration::from_millis(10));
    }
    Ok(ticks)
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> anyhow::Result<()> {
    let bus = Bus::from_config(&Config::default());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let subscribers = SubscriberSet::attach(&bus, subs);

    let exec = Arc::new(TokioExecutor::new(tokio::runtime::Handle::current()));
    let shutdown = CancellationToken::new();

    let mut quick = Task::builder(WorkFn::new("quick", ticker))
        .with_bus(bus.clone())
        .with_executor(exec.clone())
        .build();
    let mut long = Task::builder(WorkFn::new("long", ticker))
        .with_bus(bus.clone())
        .with_executor(exec)
        .with_parent(&shutdown)
        .build();

    quick.start(10)?;
    long.start(10_000)?;

    println!("quick -> {}", quick.join().await?);

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();
    println!("long  -> {}", long.join().await?);

    // Let the subscriber drain before tearing down.
    tokio::time::sleep(Duration::from_millis(50)).await;
    subscribers.shutdown().await;
    Ok(())
}
