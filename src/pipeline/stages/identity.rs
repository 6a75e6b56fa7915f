use crate::error::ConduitResult;
use crate::pipeline::{FeedReader, FeedWriter, Transform};

/// Transform that forwards every item unchanged
///
/// Mostly useful for demonstrations and for testing chains of various lengths.
#[derive(Debug, Default, Clone)]
pub struct Identity;

impl Identity {
    pub fn new() -> Self {
        Self
    }
}

impl<T: Send> Transform<T> for Identity {
    fn conduct(&mut self, input: &FeedReader<T>, output: &FeedWriter<T>) -> ConduitResult<()> {
        for item in input {
            output.emit(item)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::feed;

    #[test]
    fn test_identity_forwards_in_order() {
        let (in_writer, in_reader) = feed::bounded(16).unwrap();
        let (out_writer, out_reader) = feed::bounded(16).unwrap();
        for word in ["a", "b", "c"] {
            in_writer.emit(word.to_string()).unwrap();
        }
        drop(in_writer);

        Identity::new().conduct(&in_reader, &out_writer).unwrap();
        drop(out_writer);

        let items: Vec<String> = out_reader.iter().collect();
        assert_eq!(items, vec!["a", "b", "c"]);
    }
}
