//! # Cycle Demo
//!
//! One component, driven until idle:
//!
//! Cycle 0 asks a question, queues three jobs and offers a handshake.
//! Later cycles find the installers in their slots and answer, and a fresh
//! reader captured in cycle 0 reports the final score.

use timewarp::prelude::*;

fn main() {
    let host = CycleHost::with_config(HostConfig::strict());
    let counter = host.counter();
    println!(
        "drain limit:      {} cycles",
        host.config().max_cycles_per_drain
    );

    let score = host.fresh_cell(0u32);
    let confirm = SingleSlotRendezvous::<&'static str, bool>::new(&host);
    let jobs = QueuedRendezvous::<u32, u32>::new(&host);
    let handshake = MutualRendezvous::<&'static str, String>::new();

    // Cycle 0: everything is requested, nothing can be answered yet.
    let (mut answer, mut results, mut greeting, reader) = host.run_cycle(|frame| {
        println!("[cycle {}] requesting", frame.cycle());
        let answer = confirm.message("ship it?");
        let results: Vec<_> = (1..=3).map(|n| jobs.message(n)).collect();
        let greeting = handshake.message("hello");
        (answer, results, greeting, score.capture().fresh_reader())
    });

    // Later cycles: answer whatever is waiting, one job per cycle.
    let drained = host.run_until_idle(|frame| {
        if let Some(installer) = confirm.slot() {
            if installer.respond(|question| !question.is_empty()).is_ok() {
                println!("[cycle {}] confirmed", frame.cycle());
            }
        }
        if let Some(installer) = jobs.slot() {
            if installer.respond(|n| n * n).is_ok() {
                score.update(|s| s + 1);
                println!("[cycle {}] job answered", frame.cycle());
            }
        }
        if frame.cycle().get() == 2 {
            let _ = handshake.respond(|word| format!("{word}, cycle two here"));
        }
    });

    match drained {
        Ok(cycles) => println!("idle after {cycles} more cycles"),
        Err(err) => {
            eprintln!("demo did not settle: {err}");
            std::process::exit(1);
        }
    }

    println!();
    println!("cycles completed: {}", counter.current());
    println!("confirm:          {:?}", answer.try_take());
    println!(
        "jobs (LIFO):      {:?}",
        results.iter_mut().map(Pending::try_take).collect::<Vec<_>>()
    );
    println!("handshake:        {:?}", greeting.try_take());
    println!("score (fresh):    {}", reader.get());
}
