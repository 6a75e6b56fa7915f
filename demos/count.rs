//! Prints the squares of 0..32.

use conduit::logger::{self, LogLevel};
use conduit::pipeline::stages::{Counter, Map, Printer};
use conduit::pipeline::Pipeline;
use std::io;

fn main() {
    logger::init(LogLevel::Warn);

    let built = Pipeline::builder("count")
        .source(Counter::new(0, 32))
        .transform(Map::new(|x: u64| Ok(Some(x * x))).named("square"))
        .sink(Printer::new(io::stdout()))
        .capacity(10)
        .build();

    let mut pipeline = match built {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pipeline.run() {
        eprintln!("{}:", e);
        for failure in pipeline.errors() {
            eprintln!("  {}", failure);
        }
        std::process::exit(1);
    }
}
