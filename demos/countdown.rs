//! A handful of countdown workers sharing one cooperative scheduler.
//!
//! Run with: `cargo run --example countdown`

use cooperative_threads::{Host, Manager, StepResult, ThreadBuilder};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let host = Host::new();
    let manager = Manager::new(&host);

    let mut workers = Vec::new();
    for (name, start) in [("probe-a", 3u32), ("probe-b", 5), ("probe-c", 4)] {
        let mut remaining = start;
        let worker = ThreadBuilder::new()
            .name(name)
            .priority(50)
            .on_finish(|finished| {
                println!("[{}] finished", finished.name().unwrap_or_default());
            })
            .create(&manager, move || {
                if remaining == 0 {
                    return StepResult::Done;
                }
                println!("[{name}] {remaining}");
                remaining -= 1;
                StepResult::Continue
            });
        worker.run();
        workers.push(worker);
    }

    host.run_until_idle();

    for worker in &workers {
        println!(
            "[{}] state={} time={}ms",
            worker.name().unwrap_or_default(),
            worker.state(),
            worker.time()
        );
    }
}
