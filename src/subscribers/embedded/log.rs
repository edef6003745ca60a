//! # LogWriter: simple event printer
//!
//! Prints each [`Event`] to stdout on one line.
//!
//! ```text
//! #12 [started] matrix
//! #13 [cancel-requested] matrix
//! #14 [failed] matrix reason="singular input"
//! #15 [cancelled] matrix elapsed=412ms
//! #16 [subscriber-lagged] metrics skipped=3
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Stdout event printer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let head = format!("#{} [{}] {}", e.seq, e.kind.as_label(), e.source);
        match &e.kind {
            EventKind::SubscriberLagged { skipped } => println!("{head} skipped={skipped}"),
            _ => match (e.reason(), e.elapsed()) {
                (Some(reason), _) => println!("{head} reason={reason:?}"),
                (None, Some(elapsed)) => println!("{head} elapsed={}ms", elapsed.as_millis()),
                (None, None) => println!("{head}"),
            },
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
