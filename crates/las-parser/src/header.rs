//! Public header block parsing.
//!
//! Layout (little-endian, offsets in bytes):
//!
//! | offset | size | field                         |
//! |--------|------|-------------------------------|
//! | 0      | 4    | signature "LASF"              |
//! | 4      | 2    | file source id                |
//! | 6      | 2    | global encoding               |
//! | 8      | 16   | project id (GUID)             |
//! | 24     | 2    | version major / minor         |
//! | 26     | 32   | system identifier             |
//! | 58     | 32   | generating software           |
//! | 90     | 4    | creation day of year / year   |
//! | 94     | 2    | header size                   |
//! | 96     | 4    | offset to point data          |
//! | 100    | 4    | number of VLRs                |
//! | 104    | 1    | point data record format      |
//! | 105    | 2    | point data record length      |
//! | 107    | 4    | legacy number of points       |
//! | 111    | 20   | legacy points by return (5)   |
//! | 131    | 72   | scale (3), offset (3)         |
//! | 179    | 48   | max/min X, Y, Z               |
//! | 227    | 8    | start of waveform data (1.3+) |
//! | 235    | 12   | first EVLR start / count (1.4)|
//! | 247    | 8    | number of points (1.4)        |
//! | 255    | 120  | points by return (1.4, 15)    |

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{LasError, Result};

/// Size of the LAS 1.0 - 1.2 header; every valid file is at least this long.
pub const MIN_HEADER_SIZE: usize = 227;
/// Size of the LAS 1.4 header.
pub const HEADER_SIZE_1_4: usize = 375;
/// Highest point data record format defined by LAS 1.4.
pub const MAX_POINT_FORMAT: u8 = 10;

const SIGNATURE: &[u8; 4] = b"LASF";
const COMPRESSION_BITS: u8 = 0xC0;

/// Decoded public header block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LasHeader {
    pub file_signature: String,
    pub file_source_id: u16,
    pub global_encoding: u16,
    /// GUID as 32 lowercase hex characters
    pub project_id: String,
    pub version_major: u8,
    pub version_minor: u8,
    pub system_identifier: String,
    pub generating_software: String,
    pub creation_day_of_year: u16,
    pub creation_year: u16,
    pub header_size: u16,
    pub offset_to_point_data: u32,
    pub number_of_variable_length_records: u32,
    /// Point format id with the compression bits masked off
    pub point_data_record_format: u8,
    /// Set when bit 6 or 7 of the format byte flags LASzip compression
    pub is_compressed: bool,
    pub point_data_record_length: u16,
    /// Authoritative point count (the 64-bit field for LAS 1.4)
    pub number_of_point_records: u64,
    /// The 32-bit count as stored, kept for reference
    pub legacy_number_of_point_records: u32,
    pub number_of_points_by_return: [u32; 5],
    pub x_scale_factor: f64,
    pub y_scale_factor: f64,
    pub z_scale_factor: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub z_offset: f64,
    pub max_x: f64,
    pub min_x: f64,
    pub max_y: f64,
    pub min_y: f64,
    pub max_z: f64,
    pub min_z: f64,
    pub start_of_waveform_data: Option<u64>,
    pub start_of_first_evlr: Option<u64>,
    pub number_of_evlrs: Option<u32>,
    pub number_of_points_by_return_1_4: Option<[u64; 15]>,
}

impl LasHeader {
    /// "M.m"
    pub fn version_string(&self) -> String {
        format!("{}.{}", self.version_major, self.version_minor)
    }

    /// File creation date, when the header carries a valid one.
    pub fn creation_date(&self) -> Option<NaiveDate> {
        if self.creation_year == 0 {
            return None;
        }
        NaiveDate::from_yo_opt(self.creation_year as i32, self.creation_day_of_year as u32)
    }

    /// Creation date as "YYYY-DDD", or "Unknown" when the year is 0.
    pub fn creation_date_string(&self) -> String {
        if self.creation_year > 0 {
            format!("{}-{:03}", self.creation_year, self.creation_day_of_year)
        } else {
            "Unknown".to_string()
        }
    }

    /// Global encoding bit 4: the CRS is described with OGC WKT.
    pub fn has_wkt_crs(&self) -> bool {
        self.global_encoding & 0x10 != 0
    }

    pub fn scale(&self) -> [f64; 3] {
        [self.x_scale_factor, self.y_scale_factor, self.z_scale_factor]
    }

    pub fn offset(&self) -> [f64; 3] {
        [self.x_offset, self.y_offset, self.z_offset]
    }

    /// Header bounds as (min, max) corners.
    pub fn bounds(&self) -> ([f64; 3], [f64; 3]) {
        (
            [self.min_x, self.min_y, self.min_z],
            [self.max_x, self.max_y, self.max_z],
        )
    }
}

fn le_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn le_u32(data: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn le_u64(data: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

fn le_f64(data: &[u8], offset: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    f64::from_le_bytes(buf)
}

/// Latin-1 decode with every NUL removed.
pub(crate) fn latin1_string(bytes: &[u8]) -> String {
    bytes.iter().filter(|&&b| b != 0).map(|&b| b as char).collect()
}

fn hex_guid(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Parse the public header block from the start of a file.
///
/// No semantic checks are made here; see [`validate_header`].
pub fn parse_header(data: &[u8]) -> Result<LasHeader> {
    if data.len() < SIGNATURE.len() || &data[0..4] != SIGNATURE {
        return Err(LasError::Format("Invalid LAS file signature".to_string()));
    }
    if data.len() < MIN_HEADER_SIZE {
        return Err(LasError::InvalidHeader(format!(
            "file is {} bytes, shorter than the {}-byte header",
            data.len(),
            MIN_HEADER_SIZE
        )));
    }

    let version_major = data[24];
    let version_minor = data[25];
    let header_size = le_u16(data, 94);
    let format_byte = data[104];
    let legacy_count = le_u32(data, 107);

    let mut number_of_points_by_return = [0u32; 5];
    for (i, slot) in number_of_points_by_return.iter_mut().enumerate() {
        *slot = le_u32(data, 111 + i * 4);
    }

    let mut header = LasHeader {
        file_signature: latin1_string(&data[0..4]),
        file_source_id: le_u16(data, 4),
        global_encoding: le_u16(data, 6),
        project_id: hex_guid(&data[8..24]),
        version_major,
        version_minor,
        system_identifier: latin1_string(&data[26..58]),
        generating_software: latin1_string(&data[58..90]),
        creation_day_of_year: le_u16(data, 90),
        creation_year: le_u16(data, 92),
        header_size,
        offset_to_point_data: le_u32(data, 96),
        number_of_variable_length_records: le_u32(data, 100),
        point_data_record_format: format_byte & !COMPRESSION_BITS,
        is_compressed: format_byte & COMPRESSION_BITS != 0,
        point_data_record_length: le_u16(data, 105),
        number_of_point_records: legacy_count as u64,
        legacy_number_of_point_records: legacy_count,
        number_of_points_by_return,
        x_scale_factor: le_f64(data, 131),
        y_scale_factor: le_f64(data, 139),
        z_scale_factor: le_f64(data, 147),
        x_offset: le_f64(data, 155),
        y_offset: le_f64(data, 163),
        z_offset: le_f64(data, 171),
        max_x: le_f64(data, 179),
        min_x: le_f64(data, 187),
        max_y: le_f64(data, 195),
        min_y: le_f64(data, 203),
        max_z: le_f64(data, 211),
        min_z: le_f64(data, 219),
        start_of_waveform_data: None,
        start_of_first_evlr: None,
        number_of_evlrs: None,
        number_of_points_by_return_1_4: None,
    };

    let declared = header_size as usize;

    if version_major == 1 && version_minor >= 3 && declared >= 235 && data.len() >= 235 {
        header.start_of_waveform_data = Some(le_u64(data, 227));
    }

    if version_major == 1 && version_minor == 4 && declared >= HEADER_SIZE_1_4 && data.len() >= 255 {
        header.start_of_first_evlr = Some(le_u64(data, 235));
        header.number_of_evlrs = Some(le_u32(data, 243));
        // The 64-bit count supersedes the legacy field
        header.number_of_point_records = le_u64(data, 247);

        if data.len() >= HEADER_SIZE_1_4 {
            let mut by_return = [0u64; 15];
            for (i, slot) in by_return.iter_mut().enumerate() {
                *slot = le_u64(data, 255 + i * 8);
            }
            header.number_of_points_by_return_1_4 = Some(by_return);
        }
    }

    debug!(
        version = %header.version_string(),
        point_format = header.point_data_record_format,
        compressed = header.is_compressed,
        point_count = header.number_of_point_records,
        "Parsed LAS header"
    );

    Ok(header)
}

/// Check the header invariants, in order: version, point format, point
/// count, header size.
pub fn validate_header(header: &LasHeader) -> Result<()> {
    if header.version_major != 1 {
        return Err(LasError::UnsupportedVersion {
            major: header.version_major,
            minor: header.version_minor,
        });
    }
    if header.point_data_record_format > MAX_POINT_FORMAT {
        return Err(LasError::UnsupportedFormat(header.point_data_record_format));
    }
    if header.number_of_point_records == 0 {
        return Err(LasError::EmptyFile);
    }
    if (header.header_size as usize) < MIN_HEADER_SIZE {
        return Err(LasError::InvalidHeader(format!(
            "header size {} is smaller than {}",
            header.header_size, MIN_HEADER_SIZE
        )));
    }
    Ok(())
}

/// [`parse_header`] followed by [`validate_header`].
pub fn parse_and_validate(data: &[u8]) -> Result<LasHeader> {
    let header = parse_header(data)?;
    validate_header(&header)?;
    Ok(header)
}
