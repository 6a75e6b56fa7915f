//! Ready-made pipeline stages
//!
//! Sources:
//! 1. Counter - Emit a range of integers
//! 2. Generic - Drain any [`Generator`]
//! 3. ByteReader - Read raw byte chunks from any `Read`
//! 4. CsvReader - Read CSV records from any `Read`
//!
//! Transforms:
//! 1. Identity - Forward items unchanged
//! 2. Map - Apply a function, optionally dropping items
//! 3. Filter - Keep the items a [`Sieve`] accepts
//! 4. Utf8Normalizer - Re-chunk bytes on UTF-8 character boundaries
//!
//! Sinks:
//! 1. Printer - Write items as lines
//! 2. TextPrinter - Write byte chunks as text lines
//! 3. Collector - Keep items in memory
//! 4. CsvWriter - Write items as CSV records

pub mod collect;
pub mod csv;
pub mod filter;
pub mod generic;
pub mod identity;
pub mod map;
pub mod printer;
pub mod reader;
pub mod utf8;

// Re-export stages
pub use collect::Collector;
pub use self::csv::{CsvReader, CsvWriter};
pub use filter::{Filter, Sieve};
pub use generic::{Counter, Generator, Generic};
pub use identity::Identity;
pub use map::Map;
pub use printer::{Printer, TextPrinter};
pub use reader::ByteReader;
pub use utf8::{Utf8Normalizer, REPLACEMENT};
