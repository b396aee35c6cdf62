use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use gzp::deflate::Gzip;
use gzp::par::compress::{ParCompress, ParCompressBuilder};
use gzp::ZWriter;
use trace_error::prelude::*;

use crate::error::WriterError;

/// Output filename extension triggering on-the-fly gzip compression.
pub const GZIP_EXT: &str = "gz";

/// Row writer for result and totals files.
///
/// Writes to the standard output when no path is given; a `.gz` path routes
/// rows through a parallel gzip encoder, since result files grow with the
/// test set.
pub struct OutputWriter {
    sink: Sink,
}

enum Sink {
    Stdout(BufWriter<io::Stdout>),
    Plain(BufWriter<File>),
    Gzip(Box<ParCompress<Gzip>>),
}

impl OutputWriter {
    pub fn create(path: Option<&Path>) -> Result<OutputWriter> {
        let Some(path) = path else {
            return Ok(OutputWriter{sink: Sink::Stdout(BufWriter::new(io::stdout()))})
        };
        let file = File::create(path)
            .map_err(|source| WriterError::Create{path: path.to_path_buf(), source})
            .with_trace(|| format!("While creating output file '{}'", path.display()))?;
        let sink = match path.extension().is_some_and(|ext| ext == GZIP_EXT) {
            true  => Sink::Gzip(Box::new(ParCompressBuilder::new().from_writer(file))),
            false => Sink::Plain(BufWriter::new(file)),
        };
        Ok(OutputWriter{sink})
    }

    /// Write one row plus the line terminator.
    pub fn write_row(&mut self, row: &[u8]) -> Result<()> {
        let sink: &mut dyn Write = match &mut self.sink {
            Sink::Stdout(writer)  => writer,
            Sink::Plain(writer)   => writer,
            Sink::Gzip(encoder)   => encoder.as_mut(),
        };
        sink.write_all(row)
            .and_then(|()| sink.write_all(b"\n"))
            .map_err(WriterError::Write)
            .trace("While writing output row")
    }

    /// Flush buffered rows and, for gzip sinks, write the stream trailer.
    pub fn finish(self) -> Result<()> {
        match self.sink {
            Sink::Stdout(mut writer) => writer.flush().map_err(WriterError::Write).trace("While flushing stdout"),
            Sink::Plain(mut writer)  => writer.flush().map_err(WriterError::Write).trace("While flushing output file"),
            Sink::Gzip(mut encoder)  => encoder.finish().map_err(WriterError::Compress).trace("While closing gzip stream"),
        }
    }
}

/// Refuse to clobber an existing file unless the user passed `--overwrite`.
pub fn ensure_writable(overwrite: bool, path: &Path) -> Result<()> {
    if !overwrite && path.exists() {
        return Err(WriterError::OverwriteDisallowed{path: path.to_path_buf()})
            .trace("While checking output file permissions")
    }
    Ok(())
}
