//! Tile Packing & Atlas-Space Conversion
//!
//! Pure math for the fixed atlas layout: a square atlas is divided into a
//! `split × split` grid and tiles are assigned by index, row-major from the
//! bottom-left cell. The split factor is chosen from the tile count alone,
//! trading some atlas area for O(1) placement.
//!
//! Also hosts the clip-space → atlas-tile-UV matrix remap the shading stage
//! samples with. The remap is pure linear algebra and bit-reproducible;
//! shadow sampling correctness depends on exact tile-boundary alignment.

use glam::{Mat4, Vec2, Vec4};

use super::target::{DepthConvention, TileViewport};

/// Grid split factor for `tile_count` tiles on one atlas.
///
/// Callers keep `tile_count ≤ split²` by construction: the slot capacities
/// cap an atlas at 16 tiles, which fit the 4×4 grid.
#[inline]
#[must_use]
pub fn split_factor(tile_count: u32) -> u32 {
    if tile_count <= 1 {
        1
    } else if tile_count <= 4 {
        2
    } else {
        4
    }
}

/// Grid cell of a tile, in tile units.
#[inline]
#[must_use]
pub fn tile_offset(tile_index: u32, split: u32) -> Vec2 {
    Vec2::new((tile_index % split) as f32, (tile_index / split) as f32)
}

/// Pixel-space viewport of a tile.
#[inline]
#[must_use]
pub fn tile_viewport(tile_index: u32, split: u32, tile_size: u32) -> TileViewport {
    TileViewport {
        x: (tile_index % split) * tile_size,
        y: (tile_index / split) * tile_size,
        size: tile_size,
    }
}

/// Per-tile data vector for a non-directional shadow tile:
/// `{u_min, v_min, span, normal-bias}` with a half-texel `border` inset so
/// filtering never reads across a tile edge.
#[inline]
#[must_use]
pub fn other_tile_data(offset: Vec2, scale: f32, border: f32, bias: f32) -> Vec4 {
    Vec4::new(
        offset.x * scale + border,
        offset.y * scale + border,
        scale - border - border,
        bias,
    )
}

/// Remaps a world→clip shadow matrix into the UV space of one atlas tile.
///
/// With a reversed depth convention the z row is negated first. The x/y rows
/// are remapped from clip `[-1, 1]` to `[0, 1]` and scaled into the tile's
/// sub-rectangle; the z row is remapped to `[0, 1]` without any tile offset,
/// since depth is not atlas-packed per tile.
#[must_use]
pub fn to_atlas_matrix(m: Mat4, offset: Vec2, scale: f32, depth: DepthConvention) -> Mat4 {
    let r0 = m.row(0);
    let r1 = m.row(1);
    let mut r2 = m.row(2);
    let r3 = m.row(3);

    if depth.is_reversed() {
        r2 = -r2;
    }

    let r0 = (0.5 * (r0 + r3) + offset.x * r3) * scale;
    let r1 = (0.5 * (r1 + r3) + offset.y * r3) * scale;
    let r2 = 0.5 * (r2 + r3);

    Mat4::from_cols(r0, r1, r2, r3).transpose()
}

/// Negates the y row of a view matrix to match the cubemap handedness
/// convention of point-light faces.
#[must_use]
pub(crate) fn negate_y_row(m: Mat4) -> Mat4 {
    let r0 = m.row(0);
    let r1 = -m.row(1);
    let r2 = m.row(2);
    let r3 = m.row(3);
    Mat4::from_cols(r0, r1, r2, r3).transpose()
}
