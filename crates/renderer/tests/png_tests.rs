//! Tests for rendered map PNGs.
//!
//! Decodes the encoder output chunk by chunk to check:
//! - Chunk layout and CRCs
//! - The title text chunk
//! - Pixel colours after inflating the image data

use std::io::Read;

use renderer::png::{create_png, create_png_auto};
use renderer::{render_map, MapRenderer, RenderOptions};
use seaice_common::{Cell, DisplayMode, Raster};
use test_utils::fixtures::{cross_mask, raster_from_rows};

// ============================================================================
// Helper functions
// ============================================================================

struct Chunk {
    kind: [u8; 4],
    data: Vec<u8>,
}

/// Split a PNG into chunks, checking the signature and every CRC.
fn read_chunks(png: &[u8]) -> Vec<Chunk> {
    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);

    let mut chunks = Vec::new();
    let mut pos = 8;
    while pos < png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
        let data = png[pos + 8..pos + 8 + len].to_vec();
        let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
        assert_eq!(crc, crc32fast::hash(&png[pos + 4..pos + 8 + len]), "bad CRC");
        chunks.push(Chunk { kind, data });
        pos += 12 + len;
    }
    chunks
}

fn find<'a>(chunks: &'a [Chunk], kind: &[u8; 4]) -> Option<&'a Chunk> {
    chunks.iter().find(|c| &c.kind == kind)
}

/// Width, height and color type from IHDR.
fn header(chunks: &[Chunk]) -> (u32, u32, u8) {
    let ihdr = &find(chunks, b"IHDR").expect("IHDR").data;
    (
        u32::from_be_bytes(ihdr[0..4].try_into().unwrap()),
        u32::from_be_bytes(ihdr[4..8].try_into().unwrap()),
        ihdr[9],
    )
}

/// Inflated scanlines with the filter bytes removed.
fn scanlines(chunks: &[Chunk], stride: usize) -> Vec<Vec<u8>> {
    let idat: Vec<u8> = chunks
        .iter()
        .filter(|c| &c.kind == b"IDAT")
        .flat_map(|c| c.data.clone())
        .collect();
    let mut raw = Vec::new();
    flate2::read::ZlibDecoder::new(&idat[..])
        .read_to_end(&mut raw)
        .unwrap();
    raw.chunks_exact(stride + 1)
        .map(|line| {
            assert_eq!(line[0], 0, "filter type");
            line[1..].to_vec()
        })
        .collect()
}

fn title(chunks: &[Chunk]) -> Option<String> {
    let text = find(chunks, b"tEXt")?;
    let sep = text.data.iter().position(|&b| b == 0)?;
    assert_eq!(&text.data[..sep], b"Title");
    Some(String::from_utf8_lossy(&text.data[sep + 1..]).into_owned())
}

fn cross_raster() -> Raster {
    let mut raster = Raster::from_mask(&cross_mask());
    raster.set(0, 1, Cell::Value(2.0));
    raster.set(1, 1, Cell::Value(2.0));
    raster.set(1, 0, Cell::Value(0.5));
    raster
}

// ============================================================================
// Rendered maps
// ============================================================================

#[test]
fn test_rgba_map_pixels() {
    let options = RenderOptions {
        indexed: false,
        ..RenderOptions::uncropped()
    };
    let png = render_map(
        &cross_raster(),
        DisplayMode::Thickness,
        5.0,
        "CryoSat-SMOS sea ice thickness 15 Jan 2024",
        &options,
    )
    .unwrap();

    let chunks = read_chunks(&png);
    assert_eq!(header(&chunks), (3, 3, 6));
    assert_eq!(
        title(&chunks).as_deref(),
        Some("CryoSat-SMOS sea ice thickness 15 Jan 2024")
    );
    assert_eq!(&chunks.last().unwrap().kind, b"IEND");

    let renderer = MapRenderer::new(DisplayMode::Thickness, 5.0).unwrap();
    let rows = scanlines(&chunks, 3 * 4);
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0..4], &renderer.cell_color(Cell::Land));
    assert_eq!(&rows[0][4..8], &renderer.cell_color(Cell::Value(2.0)));
    assert_eq!(&rows[1][0..4], &renderer.cell_color(Cell::Value(0.5)));
    // Unfilled ocean cell
    assert_eq!(&rows[2][4..8], &[255, 255, 255, 255]);
}

#[test]
fn test_indexed_map_palette() {
    let png = render_map(
        &cross_raster(),
        DisplayMode::Thickness,
        5.0,
        "title",
        &RenderOptions::uncropped(),
    )
    .unwrap();

    let chunks = read_chunks(&png);
    assert_eq!(header(&chunks), (3, 3, 3));

    // land, 2.0, 0.5 and hidden
    let plte = &find(&chunks, b"PLTE").expect("PLTE").data;
    assert_eq!(plte.len(), 4 * 3);
    assert!(find(&chunks, b"tRNS").is_none());

    let rows = scanlines(&chunks, 3);
    let land = rows[0][0];
    assert_eq!(rows[0][2], land);
    assert_eq!(rows[2][0], land);
    assert_eq!(rows[2][2], land);
    let i = rows[2][1] as usize * 3;
    assert_eq!(&plte[i..i + 3], &[255, 255, 255]);
}

#[test]
fn test_anomaly_map_is_smaller_indexed() {
    // Irregular anomaly field on a 33x33 raster
    let rows: Vec<Vec<Cell>> = (0..33usize)
        .map(|x| {
            (0..33usize)
                .map(|y| match (x * x * 31 + y * 17 + x * y * 7) % 50 {
                    0 => Cell::Land,
                    1 => Cell::Hidden,
                    k => Cell::Value((k as f64 - 25.0) / 25.0),
                })
                .collect()
        })
        .collect();
    let raster = raster_from_rows(&rows);
    let options = RenderOptions {
        scale: 3,
        ..RenderOptions::uncropped()
    };

    let indexed = render_map(&raster, DisplayMode::Anomaly, 1.0, "a", &options).unwrap();
    let rgba = render_map(
        &raster,
        DisplayMode::Anomaly,
        1.0,
        "a",
        &RenderOptions {
            indexed: false,
            ..options.clone()
        },
    )
    .unwrap();

    assert_eq!(header(&read_chunks(&indexed)), (99, 99, 3));
    assert_eq!(header(&read_chunks(&rgba)), (99, 99, 6));
    assert!(indexed.len() < rgba.len());
}

#[test]
fn test_default_crop_rejects_small_raster() {
    let err = render_map(
        &cross_raster(),
        DisplayMode::Thickness,
        5.0,
        "t",
        &RenderOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, renderer::RenderError::InvalidCrop { .. }));
}

// ============================================================================
// Encoder
// ============================================================================

#[test]
fn test_auto_falls_back_to_rgba() {
    let mut pixels = Vec::with_capacity(300 * 4);
    for i in 0..300u32 {
        pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
    }

    let png = create_png_auto(&pixels, 300, 1, &[]).unwrap();
    let chunks = read_chunks(&png);
    assert_eq!(header(&chunks), (300, 1, 6));
    assert!(title(&chunks).is_none());
    assert_eq!(scanlines(&chunks, 300 * 4)[0], pixels);
}

#[test]
fn test_transparent_palette_writes_trns() {
    let pixels = [255, 0, 0, 255, 0, 0, 0, 0];
    let png = create_png_auto(&pixels, 2, 1, &[]).unwrap();
    let chunks = read_chunks(&png);
    assert_eq!(find(&chunks, b"tRNS").unwrap().data, vec![255, 0]);
}

#[test]
fn test_multiple_text_chunks_in_order() {
    let png = create_png(
        &[0, 0, 0, 255],
        1,
        1,
        &[("Title", "first"), ("Software", "seaice-map")],
    )
    .unwrap();
    let texts: Vec<_> = read_chunks(&png)
        .into_iter()
        .filter(|c| &c.kind == b"tEXt")
        .map(|c| c.data)
        .collect();
    assert_eq!(texts, vec![b"Title\0first".to_vec(), b"Software\0seaice-map".to_vec()]);
}
