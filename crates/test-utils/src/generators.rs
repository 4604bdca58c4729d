//! Synthetic LAS/LAZ file generators.
//!
//! [`LasBuilder`] writes a complete, byte-accurate LAS file (header, VLRs,
//! point records) from a handful of parameters, and can run the same point
//! records through the LASzip compressor to get the LAZ twin. Every header
//! field can be overridden so tests can produce deliberately broken files.

use std::io::{self, Cursor, Seek, SeekFrom};

use laz::{LasZipCompressor, LazItemRecordBuilder, LazVlr};

/// Standard point record length for formats 0..=10.
pub const POINT_RECORD_LENGTHS: [u16; 11] = [20, 28, 26, 34, 57, 63, 30, 36, 38, 59, 67];

const LASZIP_USER_ID: &str = "laszip encoded";
const LASZIP_RECORD_ID: u16 = 22204;

/// One point in raw (unscaled) integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub intensity: u16,
    pub classification: u8,
}

impl SyntheticPoint {
    pub fn new(x: i32, y: i32, z: i32, intensity: u16, classification: u8) -> Self {
        Self {
            x,
            y,
            z,
            intensity,
            classification,
        }
    }
}

#[derive(Debug, Clone)]
struct RawVlr {
    user_id: String,
    record_id: u16,
    description: String,
    payload: Vec<u8>,
}

/// Build a LAS (or LAZ) file with the specified parameters.
#[derive(Debug, Clone)]
pub struct LasBuilder {
    signature: [u8; 4],
    file_source_id: u16,
    global_encoding: u16,
    project_id: [u8; 16],
    version_major: u8,
    version_minor: u8,
    system_identifier: String,
    generating_software: String,
    creation_day_of_year: u16,
    creation_year: u16,
    header_size: Option<u16>,
    point_format: u8,
    record_length: Option<u16>,
    scale: [f64; 3],
    offset: [f64; 3],
    bounds: Option<([f64; 3], [f64; 3])>,
    legacy_point_count: Option<u32>,
    point_count_1_4: Option<u64>,
    vlrs: Vec<RawVlr>,
    points: Vec<SyntheticPoint>,
}

impl Default for LasBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LasBuilder {
    /// LAS 1.2, point format 0, scale 0.01, offset 0, no points.
    pub fn new() -> Self {
        Self {
            signature: *b"LASF",
            file_source_id: 0,
            global_encoding: 0,
            project_id: [0; 16],
            version_major: 1,
            version_minor: 2,
            system_identifier: "SYNTHETIC".to_string(),
            generating_software: "test-utils LasBuilder".to_string(),
            creation_day_of_year: 0,
            creation_year: 0,
            header_size: None,
            point_format: 0,
            record_length: None,
            scale: [0.01, 0.01, 0.01],
            offset: [0.0, 0.0, 0.0],
            bounds: None,
            legacy_point_count: None,
            point_count_1_4: None,
            vlrs: Vec::new(),
            points: Vec::new(),
        }
    }

    /// A small grid of points around Paris in Lambert-93, with millimetre
    /// scale and offsets in the survey area, like an IGN LIDAR HD tile.
    pub fn lambert93_survey(count: usize) -> Self {
        let side = (count as f64).sqrt().ceil().max(1.0) as usize;
        let points = (0..count)
            .map(|i| {
                let col = (i % side) as i32;
                let row = (i / side) as i32;
                SyntheticPoint::new(
                    col * 2_500,
                    row * 2_500,
                    35_000 + ((col * 7 + row * 3) % 11) * 100,
                    (i % 4096) as u16,
                    [2u8, 3, 5, 6, 9][i % 5],
                )
            })
            .collect();

        Self::new()
            .with_scale([0.001, 0.001, 0.001])
            .with_offset([651_000.0, 6_861_000.0, 0.0])
            .with_creation_date(182, 2023)
            .with_points(points)
    }

    pub fn with_signature(mut self, signature: [u8; 4]) -> Self {
        self.signature = signature;
        self
    }

    pub fn with_version(mut self, major: u8, minor: u8) -> Self {
        self.version_major = major;
        self.version_minor = minor;
        self
    }

    /// Point format id; the record length follows unless set explicitly.
    pub fn with_point_format(mut self, format: u8) -> Self {
        self.point_format = format;
        self
    }

    pub fn with_record_length(mut self, length: u16) -> Self {
        self.record_length = Some(length);
        self
    }

    pub fn with_header_size(mut self, size: u16) -> Self {
        self.header_size = Some(size);
        self
    }

    pub fn with_file_source_id(mut self, id: u16) -> Self {
        self.file_source_id = id;
        self
    }

    pub fn with_global_encoding(mut self, encoding: u16) -> Self {
        self.global_encoding = encoding;
        self
    }

    pub fn with_project_id(mut self, guid: [u8; 16]) -> Self {
        self.project_id = guid;
        self
    }

    pub fn with_system_identifier(mut self, id: &str) -> Self {
        self.system_identifier = id.to_string();
        self
    }

    pub fn with_generating_software(mut self, software: &str) -> Self {
        self.generating_software = software.to_string();
        self
    }

    pub fn with_creation_date(mut self, day_of_year: u16, year: u16) -> Self {
        self.creation_day_of_year = day_of_year;
        self.creation_year = year;
        self
    }

    pub fn with_scale(mut self, scale: [f64; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_offset(mut self, offset: [f64; 3]) -> Self {
        self.offset = offset;
        self
    }

    /// Header bounds as (min, max). Computed from the points when unset.
    pub fn with_bounds(mut self, min: [f64; 3], max: [f64; 3]) -> Self {
        self.bounds = Some((min, max));
        self
    }

    /// Override the 32-bit point count written to the header.
    pub fn with_legacy_point_count(mut self, count: u32) -> Self {
        self.legacy_point_count = Some(count);
        self
    }

    /// Override the 64-bit point count (LAS 1.4 headers only).
    pub fn with_point_count_1_4(mut self, count: u64) -> Self {
        self.point_count_1_4 = Some(count);
        self
    }

    pub fn with_vlr(mut self, user_id: &str, record_id: u16, payload: &[u8]) -> Self {
        self.vlrs.push(RawVlr {
            user_id: user_id.to_string(),
            record_id,
            description: String::new(),
            payload: payload.to_vec(),
        });
        self
    }

    /// Embed an OGC WKT coordinate system VLR and set the WKT encoding bit.
    pub fn with_wkt(mut self, wkt: &str) -> Self {
        let mut payload = wkt.as_bytes().to_vec();
        payload.push(0);
        self.global_encoding |= 0x10;
        self.with_vlr("LASF_Projection", 2112, &payload)
    }

    pub fn with_point(mut self, point: SyntheticPoint) -> Self {
        self.points.push(point);
        self
    }

    pub fn with_points(mut self, points: Vec<SyntheticPoint>) -> Self {
        self.points = points;
        self
    }

    pub fn points(&self) -> &[SyntheticPoint] {
        &self.points
    }

    pub fn record_length(&self) -> u16 {
        self.record_length.unwrap_or_else(|| {
            POINT_RECORD_LENGTHS
                .get(self.point_format as usize)
                .copied()
                .unwrap_or(20)
        })
    }

    fn is_1_4(&self) -> bool {
        self.version_major == 1 && self.version_minor == 4
    }

    fn header_block_len(&self) -> usize {
        let natural = if self.is_1_4() { 375 } else { 227 };
        natural.max(self.header_size.map(|s| s as usize).unwrap_or(natural))
    }

    /// Point in file coordinates (scale and offset applied).
    pub fn scaled(&self, point: &SyntheticPoint) -> [f64; 3] {
        [
            point.x as f64 * self.scale[0] + self.offset[0],
            point.y as f64 * self.scale[1] + self.offset[1],
            point.z as f64 * self.scale[2] + self.offset[2],
        ]
    }

    fn computed_bounds(&self) -> ([f64; 3], [f64; 3]) {
        if let Some(bounds) = self.bounds {
            return bounds;
        }
        if self.points.is_empty() {
            return ([0.0; 3], [0.0; 3]);
        }
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for p in &self.points {
            let s = self.scaled(p);
            for axis in 0..3 {
                min[axis] = min[axis].min(s[axis]);
                max[axis] = max[axis].max(s[axis]);
            }
        }
        (min, max)
    }

    fn encode_record(&self, point: &SyntheticPoint) -> Vec<u8> {
        let len = (self.record_length() as usize).max(16);
        let mut rec = vec![0u8; len];
        rec[0..4].copy_from_slice(&point.x.to_le_bytes());
        rec[4..8].copy_from_slice(&point.y.to_le_bytes());
        rec[8..12].copy_from_slice(&point.z.to_le_bytes());
        rec[12..14].copy_from_slice(&point.intensity.to_le_bytes());
        if self.point_format >= 6 {
            // return 1 of 1, flags byte, then classification
            rec[14] = 0x11;
            if len > 16 {
                rec[16] = point.classification;
            }
        } else {
            rec[14] = 0x09;
            rec[15] = point.classification;
        }
        rec
    }

    fn encode_vlr(vlr: &RawVlr) -> Vec<u8> {
        let mut out = vec![0u8; 54];
        write_str(&mut out[2..18], &vlr.user_id);
        out[18..20].copy_from_slice(&vlr.record_id.to_le_bytes());
        out[20..22].copy_from_slice(&(vlr.payload.len() as u16).to_le_bytes());
        write_str(&mut out[22..54], &vlr.description);
        out.extend_from_slice(&vlr.payload);
        out
    }

    /// Header block plus VLRs. With a LASzip payload the descriptor VLR is
    /// appended last and the compression bit is set.
    fn encode_prefix(&self, laszip_payload: Option<&[u8]>) -> Vec<u8> {
        let mut vlrs: Vec<Vec<u8>> = self.vlrs.iter().map(Self::encode_vlr).collect();
        if let Some(payload) = laszip_payload {
            vlrs.push(Self::encode_vlr(&RawVlr {
                user_id: LASZIP_USER_ID.to_string(),
                record_id: LASZIP_RECORD_ID,
                description: "laz-rs".to_string(),
                payload: payload.to_vec(),
            }));
        }

        let block_len = self.header_block_len();
        let vlr_len: usize = vlrs.iter().map(|v| v.len()).sum();
        let offset_to_points = (block_len + vlr_len) as u32;
        let point_count = self.points.len() as u64;
        let legacy_count = self
            .legacy_point_count
            .unwrap_or_else(|| point_count.min(u32::MAX as u64) as u32);
        let (min, max) = self.computed_bounds();

        let mut h = vec![0u8; block_len];
        h[0..4].copy_from_slice(&self.signature);
        h[4..6].copy_from_slice(&self.file_source_id.to_le_bytes());
        h[6..8].copy_from_slice(&self.global_encoding.to_le_bytes());
        h[8..24].copy_from_slice(&self.project_id);
        h[24] = self.version_major;
        h[25] = self.version_minor;
        write_str(&mut h[26..58], &self.system_identifier);
        write_str(&mut h[58..90], &self.generating_software);
        h[90..92].copy_from_slice(&self.creation_day_of_year.to_le_bytes());
        h[92..94].copy_from_slice(&self.creation_year.to_le_bytes());
        let header_size = self.header_size.unwrap_or(block_len as u16);
        h[94..96].copy_from_slice(&header_size.to_le_bytes());
        h[96..100].copy_from_slice(&offset_to_points.to_le_bytes());
        h[100..104].copy_from_slice(&(vlrs.len() as u32).to_le_bytes());
        h[104] = if laszip_payload.is_some() {
            self.point_format | 0x80
        } else {
            self.point_format
        };
        h[105..107].copy_from_slice(&self.record_length().to_le_bytes());
        h[107..111].copy_from_slice(&legacy_count.to_le_bytes());
        h[111..115].copy_from_slice(&legacy_count.to_le_bytes());

        let mut at = 131;
        for v in self.scale.iter().chain(self.offset.iter()) {
            h[at..at + 8].copy_from_slice(&v.to_le_bytes());
            at += 8;
        }
        for axis in 0..3 {
            h[at..at + 8].copy_from_slice(&max[axis].to_le_bytes());
            h[at + 8..at + 16].copy_from_slice(&min[axis].to_le_bytes());
            at += 16;
        }

        if self.is_1_4() {
            let count = self.point_count_1_4.unwrap_or(point_count);
            h[247..255].copy_from_slice(&count.to_le_bytes());
            h[255..263].copy_from_slice(&count.to_le_bytes());
        }

        for v in vlrs {
            h.extend_from_slice(&v);
        }
        h
    }

    /// Uncompressed LAS bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut out = self.encode_prefix(None);
        for p in &self.points {
            out.extend_from_slice(&self.encode_record(p));
        }
        out
    }

    /// LASzip-compressed LAZ bytes holding the same records as [`build`].
    ///
    /// [`build`]: LasBuilder::build
    pub fn build_laz(&self) -> io::Result<Vec<u8>> {
        let standard = POINT_RECORD_LENGTHS
            .get(self.point_format as usize)
            .copied()
            .ok_or_else(|| invalid_input(format!("no LAZ layout for format {}", self.point_format)))?;
        let extra_bytes = self.record_length().saturating_sub(standard);

        let items = LazItemRecordBuilder::default_for_point_format_id(self.point_format, extra_bytes)
            .map_err(|e| invalid_input(e.to_string()))?;
        let vlr = LazVlr::from_laz_items(items);
        let mut payload = Vec::new();
        vlr.write_to(&mut payload)?;

        // The chunk table offset is absolute, so compress after the prefix
        let mut cursor = Cursor::new(self.encode_prefix(Some(&payload)));
        cursor.seek(SeekFrom::End(0))?;

        let mut compressor =
            LasZipCompressor::new(cursor, vlr).map_err(|e| invalid_input(e.to_string()))?;
        for p in &self.points {
            compressor.compress_one(&self.encode_record(p))?;
        }
        compressor.done()?;
        Ok(compressor.into_inner().into_inner())
    }

    /// The LAZ bytes with the LASzip VLR removed (compression bit kept).
    pub fn build_laz_without_vlr(&self) -> io::Result<Vec<u8>> {
        let mut data = self.build_laz()?;
        let count = u32::from_le_bytes([data[100], data[101], data[102], data[103]]);
        data[100..104].copy_from_slice(&(count - 1).to_le_bytes());
        Ok(data)
    }
}

fn write_str(dst: &mut [u8], s: &str) {
    for (d, b) in dst.iter_mut().zip(s.bytes()) {
        *d = b;
    }
}

fn invalid_input(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}
