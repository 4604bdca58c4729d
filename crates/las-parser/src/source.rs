//! Record-at-a-time access to point data.

use crate::error::{LasError, Result};
use crate::header::LasHeader;

/// Every point format starts with X/Y/Z (3 × i32), intensity (u16) and
/// a classification byte at offset 15.
pub const MIN_RECORD_LENGTH: usize = 16;

/// Yields one fixed-length point record at a time.
pub trait PointSource {
    /// Bytes per record.
    fn record_length(&self) -> usize;

    /// Records not yet read.
    fn remaining(&self) -> u64;

    /// The next record. Valid until the next call.
    fn next_record(&mut self) -> Result<&[u8]>;
}

pub(crate) fn check_record_length(length: usize) -> Result<()> {
    if length < MIN_RECORD_LENGTH {
        return Err(LasError::InvalidHeader(format!(
            "point record length {} is shorter than {} bytes",
            length, MIN_RECORD_LENGTH
        )));
    }
    Ok(())
}

/// Uncompressed records read in place from the file buffer.
#[derive(Debug)]
pub struct RawPointSource<'a> {
    data: &'a [u8],
    record_length: usize,
    cursor: usize,
    index: u64,
    count: u64,
}

impl<'a> RawPointSource<'a> {
    /// `data` is the whole file; records start at the header's point offset.
    pub fn new(data: &'a [u8], header: &LasHeader) -> Result<Self> {
        let record_length = header.point_data_record_length as usize;
        check_record_length(record_length)?;

        let start = header.offset_to_point_data as usize;
        if start > data.len() {
            return Err(LasError::Decode(format!(
                "point data offset {} is beyond end of file ({} bytes)",
                start,
                data.len()
            )));
        }

        let count = header.number_of_point_records;
        let needed = count
            .checked_mul(record_length as u64)
            .and_then(|n| n.checked_add(start as u64));
        match needed {
            Some(end) if end <= data.len() as u64 => {}
            _ => {
                return Err(LasError::Decode(format!(
                    "{} records of {} bytes from offset {} exceed file size {}",
                    count,
                    record_length,
                    start,
                    data.len()
                )))
            }
        }

        Ok(Self {
            data,
            record_length,
            cursor: start,
            index: 0,
            count,
        })
    }
}

impl PointSource for RawPointSource<'_> {
    fn record_length(&self) -> usize {
        self.record_length
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
        let end = self.cursor + self.record_length;
        if end > self.data.len() {
            return Err(LasError::Decode(format!(
                "point record {} truncated: needs bytes {}..{}, file has {}",
                self.index,
                self.cursor,
                end,
                self.data.len()
            )));
        }
        let record = &self.data[self.cursor..end];
        self.cursor = end;
        self.index += 1;
        Ok(record)
    }
}
