//! Prints the primes below 1000 using a stateful filter.

use conduit::logger::{self, LogLevel};
use conduit::pipeline::stages::{Counter, Filter, Printer, Sieve};
use conduit::pipeline::Pipeline;
use std::io;

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Sieve of Eratosthenes, remembering every prime it let through
#[derive(Default)]
struct Eratosthenes {
    primes: Vec<u64>,
}

impl Sieve<u64> for Eratosthenes {
    fn sieve(&mut self, n: &u64) -> bool {
        let n = *n;
        if n < 2 {
            return false;
        }
        for &p in &self.primes {
            if p * p > n {
                break;
            }
            if gcd(n, p) != 1 {
                return false;
            }
        }
        self.primes.push(n);
        true
    }
}

fn main() {
    logger::init(LogLevel::Warn);

    let built = Pipeline::builder("primes")
        .source(Counter::new(2, 1000))
        .transform(Filter::new(Eratosthenes::default()))
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
