use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use memchr::memchr_iter;
use memmap2::{MmapMut, MmapOptions};

use crate::common::io::{read_file, same_file};
use crate::error::Error;
use crate::rule;
use crate::transform;

/// Summary of one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Bytes in the transformed region.
    pub transformed_len: usize,
    /// Marker bytes counted in the region.
    pub marker_count: u64,
    /// Bytes in the persisted file, footer included.
    pub final_len: u64,
}

/// The summary line appended after the transformed region.
pub fn footer_line(count: u64) -> String {
    format!("Total asteriscos: {count}\n")
}

/// Count marker bytes in a completed region.
pub fn count_markers(region: &[u8]) -> u64 {
    memchr_iter(rule::MARKER, region).count() as u64
}

/// The output file while its transformed region is being produced.
///
/// The file is sized exactly to the region and mapped read-write; `finish`
/// grows it a second and final time to make room for the footer. Those are
/// the only two times the file changes size. A zero-length region is never
/// mapped (some platforms reject empty mappings), so `region` is simply
/// empty for an empty input.
pub struct OutputFile {
    file: File,
    map: Option<MmapMut>,
    region_len: usize,
    path: PathBuf,
}

impl OutputFile {
    /// Create the file, or truncate an existing one, and size it to the
    /// transformed region.
    pub fn create(path: &Path, region_len: usize) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::io("create output", path, e))?;
        file.set_len(region_len as u64)
            .map_err(|e| Error::io("size output", path, e))?;

        let map = if region_len > 0 {
            // SAFETY: we created and sized the file ourselves; the mapping
            // stays private to this struct and is flushed before the file
            // grows past it.
            let map = unsafe { MmapOptions::new().map_mut(&file) }
                .map_err(|e| Error::io("map output", path, e))?;
            Some(map)
        } else {
            None
        };

        Ok(OutputFile {
            file,
            map,
            region_len,
            path: path.to_path_buf(),
        })
    }

    /// The transformed region.
    pub fn region(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    /// Mutable view of the transformed region.
    pub fn region_mut(&mut self) -> &mut [u8] {
        self.map.as_deref_mut().unwrap_or(&mut [])
    }

    /// Flush the region, grow the file to its final size, append the footer
    /// past the region, and sync. Consumes the handle; the mapping is gone
    /// before the file changes size. Returns the final file length.
    pub fn finish(self, footer: &[u8]) -> Result<u64, Error> {
        let OutputFile {
            mut file,
            map,
            region_len,
            path,
        } = self;

        if let Some(map) = map {
            map.flush().map_err(|e| Error::io("flush output", &path, e))?;
        }

        let final_len = region_len as u64 + footer.len() as u64;
        file.set_len(final_len)
            .map_err(|e| Error::io("grow output", &path, e))?;
        file.seek(SeekFrom::Start(region_len as u64))
            .map_err(|e| Error::io("seek output", &path, e))?;
        file.write_all(footer)
            .map_err(|e| Error::io("append footer", &path, e))?;
        file.sync_all()
            .map_err(|e| Error::io("sync output", &path, e))?;

        Ok(final_len)
    }
}

/// Full run: read `input_path`, transform it with the two workers straight
/// into the sized output file, count the markers, and append the footer.
///
/// The footer goes in only after both workers are confirmed finished; a
/// failed run never leaves a file that looks complete.
pub fn run(input_path: &Path, output_path: &Path) -> Result<RunReport, Error> {
    // Checked before the output is opened: the truncating create below
    // would destroy an input aliased to it.
    if same_file(input_path, output_path) {
        return Err(Error::SameFile(output_path.to_path_buf()));
    }

    let input = read_file(input_path).map_err(|e| Error::io("read input", input_path, e))?;

    let region_len = rule::output_len(&input);
    let mut out = OutputFile::create(output_path, region_len)?;
    transform::transform_into(&input, out.region_mut())?;

    let marker_count = count_markers(out.region());
    let footer = footer_line(marker_count);
    let final_len = out.finish(footer.as_bytes())?;

    Ok(RunReport {
        transformed_len: region_len,
        marker_count,
        final_len,
    })
}
