//! LASzip-compressed point data.
//!
//! [`LazPointSource`] owns one decompression session: the decompressor, its
//! read cursor over the file bytes and the one-record output buffer. The
//! session is opened in [`LazPointSource::new`] and released when the source
//! is dropped, on success and on every error path alike.

use std::io::Cursor;

use laz::{LasZipDecompressor, LazVlr};
use tracing::debug;

use crate::error::{LasError, Result};
use crate::header::LasHeader;
use crate::source::{check_record_length, PointSource};
use crate::vlr::{find_laszip, Vlr};

pub struct LazPointSource<'a> {
    decompressor: LasZipDecompressor<'a, Cursor<&'a [u8]>>,
    buffer: Vec<u8>,
    index: u64,
    count: u64,
}

impl<'a> LazPointSource<'a> {
    /// Open a decompression session over `data` (the whole file).
    ///
    /// Fails with [`LasError::LazVlrNotFound`] when the file carries no
    /// LASzip descriptor.
    pub fn new(data: &'a [u8], header: &LasHeader, vlrs: &[Vlr]) -> Result<Self> {
        let vlr = find_laszip(vlrs).ok_or(LasError::LazVlrNotFound)?;
        let laz_vlr = LazVlr::from_buffer(&vlr.data)?;

        let record_length = laz_vlr.items_size() as usize;
        check_record_length(record_length)?;
        if record_length != header.point_data_record_length as usize {
            return Err(LasError::LasZip(format!(
                "compressed items are {} bytes, header declares {}",
                record_length, header.point_data_record_length
            )));
        }

        let start = header.offset_to_point_data as u64;
        if start >= data.len() as u64 {
            return Err(LasError::Decode(format!(
                "point data offset {} is beyond end of file ({} bytes)",
                start,
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);
        cursor.set_position(start);
        let decompressor = LasZipDecompressor::new(cursor, laz_vlr)?;

        debug!(
            record_length,
            point_count = header.number_of_point_records,
            "Opened LAZ decompression session"
        );

        Ok(Self {
            decompressor,
            buffer: vec![0u8; record_length],
            index: 0,
            count: header.number_of_point_records,
        })
    }

    /// Records decompressed so far.
    pub fn decoded(&self) -> u64 {
        self.index
    }
}

impl PointSource for LazPointSource<'_> {
    fn record_length(&self) -> usize {
        self.buffer.len()
    }

    fn remaining(&self) -> u64 {
        self.count - self.index
    }

    fn next_record(&mut self) -> Result<&[u8]> {
        if self.index >= self.count {
            return Err(LasError::Decode(format!(
                "read past the last of {} records",
                self.count
            )));
        }
        self.decompressor
            .decompress_one(&mut self.buffer)
            .map_err(|e| LasError::Decode(format!("point record {}: {}", self.index, e)))?;
        self.index += 1;
        Ok(&self.buffer)
    }
}

impl Drop for LazPointSource<'_> {
    fn drop(&mut self) {
        debug!(
            decoded = self.index,
            point_count = self.count,
            "Released LAZ decompression session"
        );
    }
}
