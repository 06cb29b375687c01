use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::bench::driver::BenchmarkRow;
use crate::error::Result;

/// Column names of the result file.
pub const HEADER: &str = "probability,sparsity,search_latency,memory";

/// Writes benchmark rows as comma-separated lines, flushing after every row so that rows
/// already measured survive a later abort.
pub struct ResultWriter<W: Write> {
    out: W,
}

impl ResultWriter<BufWriter<File>> {
    /// Opens `path` for appending, creating it if needed.
    ///
    /// The header is written only when the file is empty, so repeated invocations accumulate
    /// rows under a single header line.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ResultWriter<BufWriter<File>>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let is_empty = file.metadata()?.len() == 0;

        let mut writer = ResultWriter { out: BufWriter::new(file) };
        if is_empty {
            writer.write_header()?;
        }
        Ok(writer)
    }
}

impl<W: Write> ResultWriter<W> {
    /// Wraps `out` and writes the header line to it.
    pub fn new(out: W) -> Result<ResultWriter<W>> {
        let mut writer = ResultWriter { out };
        writer.write_header()?;
        Ok(writer)
    }

    fn write_header(&mut self) -> Result<()> {
        writeln!(self.out, "{}", HEADER)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn append(&mut self, row: &BenchmarkRow) -> Result<()> {
        writeln!(
            self.out,
            "{},{},{},{}",
            row.density, row.sparsity, row.search_latency, row.memory_bytes
        )?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
