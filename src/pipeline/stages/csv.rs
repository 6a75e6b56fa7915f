use crate::error::ConduitResult;
use crate::pipeline::{FeedReader, FeedWriter, Sink, Source};
use csv::{ReaderBuilder, WriterBuilder};
use std::io::{Read, Write};

/// Source emitting one CSV record per item, as its list of fields
///
/// Every line is a record; a header line is not treated specially. All
/// records must have the same number of fields, otherwise the source stops
/// with [`ConduitError::Csv`](crate::error::ConduitError::Csv).
pub struct CsvReader<R> {
    reader: csv::Reader<R>,
}

impl<R: Read + Send> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        Self::from_builder(ReaderBuilder::new().has_headers(false), reader)
    }

    /// Use a preconfigured builder, e.g. for another delimiter
    pub fn from_builder(builder: &ReaderBuilder, reader: R) -> Self {
        Self {
            reader: builder.from_reader(reader),
        }
    }
}

impl<R: Read + Send> Source<Vec<String>> for CsvReader<R> {
    fn produce(&mut self, output: &FeedWriter<Vec<String>>) -> ConduitResult<()> {
        for record in self.reader.records() {
            let record = record?;
            output.emit(record.iter().map(str::to_string).collect())?;
        }
        tracing::debug!("CSV input exhausted after {} record(s)", output.emitted());
        Ok(())
    }

    fn name(&self) -> &str {
        "csv-reader"
    }
}

/// Sink writing every item as one CSV record
pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write + Send> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::from_builder(&WriterBuilder::new(), writer)
    }

    pub fn from_builder(builder: &WriterBuilder, writer: W) -> Self {
        Self {
            writer: builder.from_writer(writer),
        }
    }
}

impl<W: Write + Send> Sink<Vec<String>> for CsvWriter<W> {
    fn consume(&mut self, input: &FeedReader<Vec<String>>) -> ConduitResult<()> {
        for record in input {
            self.writer.write_record(&record)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "csv-writer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConduitError;
    use crate::pipeline::stages::{Collector, Identity};
    use crate::pipeline::{feed, Pipeline, StageRole};
    use std::fs::{self, File};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn record(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_reader_emits_records() {
        let (writer, reader) = feed::bounded(8).unwrap();
        let mut source = CsvReader::new(Cursor::new("name,qty\napple,3\n\"pear, green\",5\n"));
        source.produce(&writer).unwrap();
        drop(writer);

        let records: Vec<Vec<String>> = reader.iter().collect();
        assert_eq!(
            records,
            vec![
                record(&["name", "qty"]),
                record(&["apple", "3"]),
                record(&["pear, green", "5"]),
            ]
        );
    }

    #[test]
    fn test_reader_with_custom_delimiter() {
        let (writer, reader) = feed::bounded(8).unwrap();
        let mut builder = ReaderBuilder::new();
        builder.has_headers(false).delimiter(b';');
        let mut source = CsvReader::from_builder(&builder, Cursor::new("a;b\n"));
        source.produce(&writer).unwrap();
        drop(writer);

        assert_eq!(reader.iter().collect::<Vec<_>>(), vec![record(&["a", "b"])]);
    }

    #[test]
    fn test_writer_quotes_when_needed() {
        let (writer, reader) = feed::bounded(8).unwrap();
        writer.emit(record(&["plain", "with,comma"])).unwrap();
        writer.emit(record(&["say \"hi\"", ""])).unwrap();
        drop(writer);

        let mut buf = Vec::new();
        CsvWriter::new(&mut buf).consume(&reader).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "plain,\"with,comma\"\n\"say \"\"hi\"\"\",\n"
        );
    }

    #[test]
    fn test_round_trip_through_pipeline() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("input.csv");
        let output_path = temp_dir.path().join("output.csv");
        let content = "city,country\n\"Köln, Altstadt\",DE\n東京,JP\n\"say \"\"hi\"\"\",\n";
        fs::write(&input_path, content).unwrap();

        let mut pipeline = Pipeline::builder("csv-copy")
            .source(CsvReader::new(File::open(&input_path).unwrap()))
            .transform(Identity::new())
            .sink(CsvWriter::new(File::create(&output_path).unwrap()))
            .capacity(2)
            .build()
            .unwrap();

        let report = pipeline.run().unwrap();
        assert_eq!(report.items_delivered(), 4);
        assert_eq!(fs::read_to_string(&output_path).unwrap(), content);
    }

    #[test]
    fn test_malformed_record_is_stage_error() {
        let collector = Collector::new();
        let mut pipeline = Pipeline::builder("csv-broken")
            .source(CsvReader::new(Cursor::new("a,b\nc,d\nlonely\ne,f\n")))
            .sink(collector.clone())
            .build()
            .unwrap();

        let result = pipeline.run();
        assert!(matches!(result, Err(ConduitError::ErrorsOccurred(1))));

        let errors = pipeline.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].role, StageRole::Source);
        assert!(matches!(errors[0].error, ConduitError::Csv(_)));

        // Records before the bad line are still delivered
        assert_eq!(
            collector.items().unwrap(),
            vec![record(&["a", "b"]), record(&["c", "d"])]
        );
    }
}
