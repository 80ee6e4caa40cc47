use crate::visualization::UNDETERMINED_GLYPH;
use anyhow::{anyhow, Context, Result};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use wfc_core::{Cell, CellGrid, TileId, TileLabel, TileSet};

/// Writes the grid as text: space-separated tile labels along X, one line
/// per row starting at `y = 0`. Undetermined cells are written as `?`, so a
/// grid halted by a contradiction can still be saved.
pub fn write_grid<W: Write>(grid: &CellGrid, tileset: &TileSet, writer: &mut W) -> Result<()> {
    for y in 0..grid.height {
        let line = (0..grid.width)
            .map(|x| {
                grid.get(x, y)
                    .and_then(Cell::value)
                    .and_then(|tile| tileset.label(tile))
                    .map_or(UNDETERMINED_GLYPH, TileLabel::as_str)
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line)
            .with_context(|| format!("Failed to write line for row {}", y))?;
    }
    Ok(())
}

/// Saves the grid to `output_path` in the format of [`write_grid`].
pub fn save_grid_to_file(grid: &CellGrid, tileset: &TileSet, output_path: &Path) -> Result<()> {
    log::info!("Attempting to save grid to {:?}...", output_path);

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {:?}", output_path))?;
    let mut writer = io::BufWriter::new(file);

    write_grid(grid, tileset, &mut writer)?;

    writer
        .flush()
        .context("Failed to flush writer for output file")?;
    log::info!("Successfully saved grid to {:?}", output_path);

    Ok(())
}

/// Composes the grid into a PNG image, `resolution` pixels per tile side.
///
/// Each collapsed cell is drawn with `<assets_dir>/<label>.png`, scaled to
/// `resolution` if its size differs. Row `y = 0` is the top row, as in the
/// text output. Undetermined cells stay transparent.
pub fn save_grid_image(
    grid: &CellGrid,
    tileset: &TileSet,
    assets_dir: &Path,
    resolution: u32,
    output_path: &Path,
) -> Result<()> {
    log::info!("Attempting to save grid image to {:?}...", output_path);

    let pixels = |cells: usize| {
        u32::try_from(cells)
            .ok()
            .and_then(|cells| cells.checked_mul(resolution))
            .ok_or_else(|| anyhow!("Grid of {} cells per side is too large for an image", cells))
    };
    let mut canvas = RgbaImage::new(pixels(grid.width)?, pixels(grid.height)?);
    let mut tiles: HashMap<TileId, RgbaImage> = HashMap::new();

    for y in 0..grid.height {
        for x in 0..grid.width {
            let Some(tile) = grid.get(x, y).and_then(Cell::value) else {
                continue;
            };
            if !tiles.contains_key(&tile) {
                let label = tileset
                    .label(tile)
                    .ok_or_else(|| anyhow!("Tile id {} is not in the tile set", tile.0))?;
                tiles.insert(tile, load_tile_image(assets_dir, label, resolution)?);
            }
            if let Some(image) = tiles.get(&tile) {
                imageops::overlay(
                    &mut canvas,
                    image,
                    i64::from(pixels(x)?),
                    i64::from(pixels(y)?),
                );
            }
        }
    }

    canvas
        .save_with_format(output_path, ImageFormat::Png)
        .with_context(|| format!("Failed to write image file: {:?}", output_path))?;
    log::info!("Successfully saved grid image to {:?}", output_path);
    Ok(())
}

fn load_tile_image(assets_dir: &Path, label: &TileLabel, resolution: u32) -> Result<RgbaImage> {
    let path = assets_dir.join(format!("{}.png", label));
    let image = image::open(&path)
        .with_context(|| format!("Failed to load tile image for '{}': {:?}", label, path))?
        .to_rgba8();
    if image.dimensions() == (resolution, resolution) {
        Ok(image)
    } else {
        log::debug!(
            "Scaling tile image {:?} from {:?} to {}px",
            path,
            image.dimensions(),
            resolution
        );
        Ok(imageops::resize(&image, resolution, resolution, FilterType::Nearest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use wfc_core::Position;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_write_grid_labels_and_placeholders() {
        let tileset = TileSet::new(["grass", "water"]).unwrap();
        let water = TileLabel::from("water");
        let grid = CellGrid::from_fn(3, 2, |x, y| {
            let bits = if x == y {
                tileset.to_bitset([&water])
            } else {
                tileset.full_set()
            };
            Cell::new(Position::from((x, y)), bits)
        });

        let mut out = Vec::new();
        write_grid(&grid, &tileset, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "water ? ?\n? water ?\n");
    }

    #[test]
    fn test_save_grid_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.txt");
        let tileset = TileSet::new(["A", "B"]).unwrap();
        let a = TileLabel::from("A");
        let grid = CellGrid::from_fn(2, 2, |x, y| {
            Cell::new(Position::from((x, y)), tileset.to_bitset([&a]))
        });

        save_grid_to_file(&grid, &tileset, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A A\nA A\n");
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("grid.txt");
        let tileset = TileSet::new(["A"]).unwrap();
        let grid = CellGrid::from_fn(1, 1, |x, y| {
            Cell::new(Position::from((x, y)), tileset.full_set())
        });
        assert!(save_grid_to_file(&grid, &tileset, &path).is_err());
    }

    // 2x2 grid: (0, 0) is A, (1, 1) undetermined, the rest B.
    fn image_grid() -> (CellGrid, TileSet) {
        let tileset = TileSet::new(["A", "B"]).unwrap();
        let (a, b) = (TileLabel::from("A"), TileLabel::from("B"));
        let grid = CellGrid::from_fn(2, 2, |x, y| {
            let bits = match (x, y) {
                (0, 0) => tileset.to_bitset([&a]),
                (1, 1) => tileset.full_set(),
                _ => tileset.to_bitset([&b]),
            };
            Cell::new(Position::from((x, y)), bits)
        });
        (grid, tileset)
    }

    #[test]
    fn test_save_grid_image_places_scaled_tiles() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(4, 4, RED)
            .save(dir.path().join("A.png"))
            .unwrap();
        RgbaImage::from_pixel(2, 2, BLUE)
            .save(dir.path().join("B.png"))
            .unwrap();
        let path = dir.path().join("grid.png");
        let (grid, tileset) = image_grid();

        save_grid_image(&grid, &tileset, dir.path(), 4, &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (8, 8));
        assert_eq!(*image.get_pixel(0, 0), RED);
        assert_eq!(*image.get_pixel(3, 3), RED);
        // Cell (1, 0) is to the right on the top row, (0, 1) below the first.
        assert_eq!(*image.get_pixel(5, 1), BLUE);
        assert_eq!(*image.get_pixel(1, 5), BLUE);
        assert_eq!(image.get_pixel(6, 6)[3], 0);
    }

    #[test]
    fn test_save_grid_image_missing_asset_fails() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(4, 4, RED)
            .save(dir.path().join("A.png"))
            .unwrap();
        let path = dir.path().join("grid.png");
        let (grid, tileset) = image_grid();

        let err = save_grid_image(&grid, &tileset, dir.path(), 4, &path).unwrap_err();
        assert!(format!("{:#}", err).contains("'B'"));
        assert!(!path.exists());
    }
}
