//! # Example: matrix
//!
//! Multiplies two matrices on a background thread and reports every finished
//! row through an ordered progress queue.
//!
//! Shows how to:
//! - Select the ordered strategy with [`TaskBuilder::queued`](taskpump::TaskBuilder::queued).
//! - Collapse bursts with [`Work::should_merge`] (cells of one row merge into one update).
//! - Cancel from the controlling side once enough rows are in.
//!
//! ## Run
//! ```bash
//! cargo run --example matrix
//! cargo run --example matrix -- 40     # cancel after 40 rows
//! ```

use std::thread;
use std::time::Duration;

use taskpump::{Callbacks, Context, Task, Work};

type Matrix = Vec<Vec<f64>>;

/// Deterministic filler; values only need to be non-trivial.
fn matrix_filled(rows: usize, cols: usize, seed: usize) -> Matrix {
    (0..rows)
        .map(|i| {
            (0..cols)
                .map(|j| ((i * 31 + j * 17 + seed) % 97) as f64 / 97.0)
                .collect()
        })
        .collect()
}

fn product_element(m1: &Matrix, m2: &Matrix, i: usize, j: usize) -> f64 {
    (0..m2.len()).map(|k| m1[i][k] * m2[k][j]).sum()
}

/// Progress update: one cell finished.
#[derive(Debug, Clone, Copy)]
struct Cell {
    row: usize,
    col: usize,
}

struct Product;

impl Work for Product {
    type Params = (Matrix, Matrix);
    type Progress = Cell;
    type Output = Matrix;
    type Error = String;

    fn name(&self) -> &str {
        "matrix-product"
    }

    fn run(&self, (m1, m2): (Matrix, Matrix), ctx: &Context<Cell>) -> Result<Matrix, String> {
        let inner = m1.first().map_or(0, Vec::len);
        if inner != m2.len() {
            return Err(format!("shape mismatch: {} vs {}", inner, m2.len()));
        }
        let cols = m2.first().map_or(0, Vec::len);

        let mut out = vec![vec![0.0; cols]; m1.len()];
        for (i, row) in out.iter_mut().enumerate() {
            if ctx.is_cancelled() {
                break;
            }
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = product_element(&m1, &m2, i, j);
                ctx.publish_progress(Cell { row: i, col: j });
            }
            thread::sleep(Duration::from_millis(5));
        }
        Ok(out)
    }

    fn should_merge(&self, last: &Cell, next: &Cell) -> bool {
        last.row == next.row
    }
}

#[derive(Default)]
struct RowCounter {
    rows_done: usize,
    cols: usize,
}

impl Callbacks<Cell, Matrix> for RowCounter {
    fn on_progress(&mut self, cell: &Cell) {
        if cell.col + 1 == self.cols {
            self.rows_done = cell.row + 1;
            println!("row {:>3} done", cell.row);
        }
    }

    fn on_finished(&mut self, result: &Matrix) {
        println!("finished: {}x{}", result.len(), self.cols);
    }

    fn on_cancelled(&mut self, _result: &Matrix) {
        println!("cancelled after {} rows", self.rows_done);
    }
}

fn main() -> anyhow::Result<()> {
    let cancel_after: Option<usize> = std::env::args().nth(1).and_then(|a| a.parse().ok());
    let (n, m) = (120, 80);

    let mut task = Task::builder(Product)
        .queued()
        .with_callbacks(RowCounter {
            cols: m,
            ..RowCounter::default()
        })
        .build();
    task.start((matrix_filled(n, m, 1), matrix_filled(m, m, 2)))?;

    while !task.pump()? {
        if cancel_after.is_some_and(|rows| task.callbacks().rows_done >= rows) {
            task.cancel();
        }
        thread::sleep(Duration::from_millis(16));
    }

    let result = task.await_result()?;
    let trace: f64 = (0..result.len().min(m)).map(|i| result[i][i]).sum();
    println!("trace of the square part: {trace:.3}");
    Ok(())
}
