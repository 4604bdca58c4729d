//! Variable-length records.
//!
//! Each record is a 54-byte header (reserved u16, 16-byte user id, record id
//! u16, payload length u16, 32-byte description) followed by its payload.
//! Records start right after the public header block.

use bytes::Bytes;
use tracing::debug;

use crate::error::{LasError, Result};
use crate::header::{latin1_string, LasHeader};

pub const VLR_HEADER_SIZE: usize = 54;

pub const LASZIP_USER_ID: &str = "laszip encoded";
pub const LASZIP_RECORD_ID: u16 = 22204;

pub const PROJECTION_USER_ID: &str = "LASF_Projection";
pub const OGC_WKT_RECORD_ID: u16 = 2112;

#[derive(Debug, Clone, PartialEq)]
pub struct Vlr {
    pub reserved: u16,
    pub user_id: String,
    pub record_id: u16,
    pub description: String,
    pub data: Bytes,
}

impl Vlr {
    /// The LASzip compression descriptor.
    pub fn is_laszip(&self) -> bool {
        self.user_id == LASZIP_USER_ID && self.record_id == LASZIP_RECORD_ID
    }

    /// OGC coordinate system WKT.
    pub fn is_ogc_wkt(&self) -> bool {
        self.user_id == PROJECTION_USER_ID && self.record_id == OGC_WKT_RECORD_ID
    }

    /// Payload as text, NULs removed.
    pub fn data_as_string(&self) -> String {
        latin1_string(&self.data)
    }
}

/// Read the `number_of_variable_length_records` records that follow the
/// header. Payloads share the file buffer.
pub fn read_vlrs(data: &Bytes, header: &LasHeader) -> Result<Vec<Vlr>> {
    let count = header.number_of_variable_length_records as usize;
    let mut vlrs = Vec::with_capacity(count.min(64));
    let mut offset = header.header_size as usize;

    for index in 0..count {
        let body = offset + VLR_HEADER_SIZE;
        if body > data.len() {
            return Err(LasError::Decode(format!(
                "VLR {} header at byte {} runs past end of file",
                index, offset
            )));
        }
        let raw = &data[offset..body];
        let length = u16::from_le_bytes([raw[20], raw[21]]) as usize;
        if body + length > data.len() {
            return Err(LasError::Decode(format!(
                "VLR {} payload of {} bytes runs past end of file",
                index, length
            )));
        }

        let vlr = Vlr {
            reserved: u16::from_le_bytes([raw[0], raw[1]]),
            user_id: latin1_string(&raw[2..18]),
            record_id: u16::from_le_bytes([raw[18], raw[19]]),
            description: latin1_string(&raw[22..54]),
            data: data.slice(body..body + length),
        };
        debug!(
            user_id = %vlr.user_id,
            record_id = vlr.record_id,
            length,
            "Found VLR"
        );
        vlrs.push(vlr);
        offset = body + length;
    }

    Ok(vlrs)
}

/// The LASzip descriptor, if present.
pub fn find_laszip(vlrs: &[Vlr]) -> Option<&Vlr> {
    vlrs.iter().find(|v| v.is_laszip())
}

/// Embedded OGC WKT coordinate system, if present.
pub fn ogc_wkt(vlrs: &[Vlr]) -> Option<String> {
    vlrs.iter()
        .find(|v| v.is_ogc_wkt())
        .map(|v| v.data_as_string())
        .filter(|s| !s.trim().is_empty())
}
