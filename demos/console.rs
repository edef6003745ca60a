//! # Example: console
//!
//! Drives a task from a plain render loop, like a console or game main loop would.
//!
//! Shows how to:
//! - Implement [`Work`] and [`Callbacks`] for a progress bar.
//! - Poll [`Task::pump`] on every frame (overwrite progress: only the latest value is shown).
//! - Cancel after a number of frames, and surface a body failure.
//!
//! ## Run
//! ```bash
//! cargo run --example console                   # runs to completion
//! cargo run --example console -- --cancel 20    # cancels after 20 frames
//! cargo run --example console -- --fail 30      # body fails at 30%
//! ```

use std::io::Write;
use std::thread;
use std::time::Duration;

use taskpump::{Callbacks, Context, Task, TaskError, Work};

/// Sleeps through `a + b` steps, publishing the step as a percentage.
struct SlowCount {
    fail_at: Option<u32>,
}

impl Work for SlowCount {
    type Params = (u32, u32);
    type Progress = u32;
    type Output = String;
    type Error = String;

    fn name(&self) -> &str {
        "slow-count"
    }

    fn run(&self, (a, b): (u32, u32), ctx: &Context<u32>) -> Result<String, String> {
        let n = a + b;
        for i in 0..=n {
            thread::sleep(Duration::from_millis(20));
            ctx.publish_progress(i * 100 / n.max(1));

            if Some(i) == self.fail_at {
                return Err(format!("gave up at step {i}"));
            }
            if ctx.is_cancelled() {
                return Ok("empty, unfinished object".into());
            }
        }
        Ok("finished result object".into())
    }
}

/// Progress bar on stdout.
struct Bar;

impl Callbacks<u32, String> for Bar {
    fn pre_start(&mut self) {
        print!("Time-consuming calculation:\nProgress: 0%");
        let _ = std::io::stdout().flush();
    }

    fn on_progress(&mut self, pct: &u32) {
        print!("\rProgress: {pct}%");
        let _ = std::io::stdout().flush();
    }

    fn on_finished(&mut self, _result: &String) {
        print!("\rProgress is finished.");
    }

    fn on_cancelled(&mut self, _result: &String) {
        print!("\rProgress is cancelled.");
    }
}

fn flag(name: &str) -> Option<u32> {
    let mut args = std::env::args().skip_while(|a| a != name);
    args.next()?;
    args.next()?.parse().ok()
}

fn main() -> anyhow::Result<()> {
    let cancel_after = flag("--cancel");
    let work = SlowCount {
        fail_at: flag("--fail"),
    };

    let mut task = Task::builder(work).with_callbacks(Bar).build();
    task.start((50, 50))?;

    let mut frame = 0u32;
    let finished = loop {
        match task.pump() {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(e) => break Err(e),
        }
        thread::sleep(Duration::from_millis(30));
        frame += 1;
        if cancel_after.is_some_and(|n| frame > n) {
            task.cancel();
        }
    };

    match finished {
        Ok(()) => {
            println!("\nThe result: {}", task.await_result()?);
        }
        Err(TaskError::Failed(msg)) => {
            println!("\nTask failed: {msg}");
        }
        Err(other) => return Err(anyhow::anyhow!("{}", other.as_message())),
    }
    Ok(())
}
