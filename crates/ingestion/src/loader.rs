//! Async entry points for loading LAS and LAZ files.

use std::path::Path;
use std::time::Instant;

use bytes::Bytes;
use las_parser::{
    parse_and_validate, read_vlrs, LasError, LasHeader, LazPointSource, RawPointSource, Vlr,
};
use projection::CrsTransformer;
use tracing::{debug, info, warn};

use crate::config::{LoaderConfig, DEFAULT_SOURCE_CRS, DEFAULT_TARGET_CRS};
use crate::decoder::decode_points;
use crate::error::{FileKind, IngestionError, Result};
use crate::pointcloud::PointCloud;

/// Offset of the point format byte, whose top bits flag LASzip compression.
const POINT_FORMAT_OFFSET: usize = 104;
const COMPRESSION_BITS: u8 = 0xC0;

/// Load a LASzip-compressed file.
///
/// CRS names default to Lambert-93 in and Web Mercator out. Any failure is
/// reported as a single [`IngestionError::LoadFailed`].
pub async fn load_compressed(
    data: Bytes,
    source_crs: Option<&str>,
    target_crs: Option<&str>,
) -> Result<PointCloud> {
    load(data, FileKind::Laz, source_crs, target_crs).await
}

/// Load an uncompressed LAS file. See [`load_compressed`].
pub async fn load_raw(
    data: Bytes,
    source_crs: Option<&str>,
    target_crs: Option<&str>,
) -> Result<PointCloud> {
    load(data, FileKind::Las, source_crs, target_crs).await
}

async fn load(
    data: Bytes,
    kind: FileKind,
    source_crs: Option<&str>,
    target_crs: Option<&str>,
) -> Result<PointCloud> {
    let source_crs = source_crs.unwrap_or(DEFAULT_SOURCE_CRS);
    let target_crs = target_crs.unwrap_or(DEFAULT_TARGET_CRS);
    let start = Instant::now();

    info!(
        kind = %kind,
        bytes = data.len(),
        source_crs = %source_crs,
        target_crs = %target_crs,
        "Loading point cloud"
    );

    let cloud = decode_file(&data, kind, source_crs, target_crs).map_err(|e| {
        warn!(kind = %kind, error = %e, "Point cloud load failed");
        e.into_load_failed(kind)
    })?;

    info!(
        kind = %kind,
        point_count = cloud.point_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded point cloud"
    );

    Ok(cloud)
}

fn decode_file(
    data: &Bytes,
    kind: FileKind,
    source_crs: &str,
    target_crs: &str,
) -> Result<PointCloud> {
    let header = parse_and_validate(data)?;
    let vlrs = load_vlrs(data, &header, kind)?;
    let transformer = CrsTransformer::new(source_crs, target_crs)?;

    let points = match kind {
        FileKind::Las => {
            if header.is_compressed {
                return Err(LasError::Decode(
                    "point data is LASzip-compressed, load it as LAZ".to_string(),
                )
                .into());
            }
            let mut source = RawPointSource::new(data, &header)?;
            decode_points(&header, &mut source, &transformer)?
        }
        FileKind::Laz => {
            // The session is released when `source` leaves this block
            let mut source = LazPointSource::new(data, &header, &vlrs)?;
            decode_points(&header, &mut source, &transformer)?
        }
    };

    Ok(PointCloud::new(header, vlrs, points, source_crs, target_crs))
}

/// LAZ needs its VLRs to find the compression descriptor; for raw files they
/// only feed metadata, so a damaged VLR block is logged and skipped.
fn load_vlrs(data: &Bytes, header: &LasHeader, kind: FileKind) -> Result<Vec<Vlr>> {
    match (read_vlrs(data, header), kind) {
        (Ok(vlrs), _) => {
            debug!(count = vlrs.len(), "Read variable length records");
            Ok(vlrs)
        }
        (Err(e), FileKind::Las) => {
            warn!(error = %e, "Ignoring unreadable variable length records");
            Ok(Vec::new())
        }
        (Err(e), FileKind::Laz) => Err(e.into()),
    }
}

/// File kind from a `.las` / `.laz` extension, case-insensitive.
pub fn kind_from_extension(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "las" => Some(FileKind::Las),
        "laz" => Some(FileKind::Laz),
        _ => None,
    }
}

/// File kind from the compression bits of the header's point format byte.
pub fn kind_from_header(data: &[u8]) -> FileKind {
    match data.get(POINT_FORMAT_OFFSET) {
        Some(format) if format & COMPRESSION_BITS != 0 => FileKind::Laz,
        _ => FileKind::Las,
    }
}

/// Loads files with a fixed [`LoaderConfig`].
#[derive(Debug, Clone, Default)]
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    /// A loader with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader with `config`, rejected if it does not validate.
    pub fn with_config(config: LoaderConfig) -> Result<Self> {
        config.validate().map_err(IngestionError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a file from the filesystem.
    ///
    /// The extension picks the loader; without a known one the header's
    /// compression bits decide.
    pub async fn load_file(&self, path: impl AsRef<Path>) -> Result<PointCloud> {
        let path = path.as_ref();
        let by_extension = kind_from_extension(path);

        let data = match tokio::fs::read(path).await {
            Ok(data) => Bytes::from(data),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read point cloud file");
                return Err(IngestionError::from(e)
                    .into_load_failed(by_extension.unwrap_or(FileKind::Las)));
            }
        };

        let kind = by_extension.unwrap_or_else(|| {
            let detected = kind_from_header(&data);
            debug!(path = %path.display(), kind = %detected, "No LAS/LAZ extension, detected from header");
            detected
        });

        self.load_bytes(data, kind).await
    }

    /// Load in-memory file bytes of the given kind.
    pub async fn load_bytes(&self, data: Bytes, kind: FileKind) -> Result<PointCloud> {
        load(
            data,
            kind,
            Some(&self.config.source_crs),
            Some(&self.config.target_crs),
        )
        .await
    }
}
