//! Echoes stdin to stdout, one line per chunk read.

use conduit::logger::{self, LogLevel};
use conduit::pipeline::stages::{ByteReader, TextPrinter};
use conduit::pipeline::Pipeline;
use std::io;

fn main() {
    logger::init(LogLevel::Warn);

    let built = Pipeline::builder("echo")
        .source(ByteReader::new(io::stdin()))
        .sink(TextPrinter::new(io::stdout()))
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
