//! Tile value type.

use serde::{Deserialize, Serialize};

/// Material of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum TileKind {
    /// Air / sky
    #[default]
    Empty,
    /// Surface grass
    Grass,
    /// Topsoil
    Dirt,
    /// Shallow stone band
    Stone,
    /// Bedrock
    Rock,
    /// Sentinel for space that has not been materialized
    Null,
}

/// Bit flags returned by [`Tile::properties`].
pub struct TileProperties;

impl TileProperties {
    /// Tile should be drawn
    pub const VISIBLE: u8 = 1 << 0;
    /// Light passes through
    pub const TRANSPARENT: u8 = 1 << 1;
    /// Blocks movement
    pub const SOLID: u8 = 1 << 2;
}

/// One grid cell. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Material
    pub kind: TileKind,
    /// Texture variant, e.g. depth within the material band
    pub variant: u8,
}

impl Tile {
    /// Default empty tile.
    pub const EMPTY: Self = Self::new(TileKind::Empty, 0);

    /// Returned by read-only lookups into unmapped space.
    pub const NULL: Self = Self::new(TileKind::Null, 0);

    /// Creates a tile.
    #[must_use]
    pub const fn new(kind: TileKind, variant: u8) -> Self {
        Self { kind, variant }
    }

    /// Creates a tile of `kind` with variant 0.
    #[must_use]
    pub const fn of(kind: TileKind) -> Self {
        Self::new(kind, 0)
    }

    /// Whether the tile is drawn at all.
    #[must_use]
    pub const fn visible(&self) -> bool {
        !matches!(self.kind, TileKind::Empty | TileKind::Null)
    }

    /// Whether light passes through the tile.
    #[must_use]
    pub const fn transparent(&self) -> bool {
        matches!(self.kind, TileKind::Empty | TileKind::Null)
    }

    /// Whether the tile blocks movement.
    #[must_use]
    pub const fn solid(&self) -> bool {
        matches!(
            self.kind,
            TileKind::Grass | TileKind::Dirt | TileKind::Stone | TileKind::Rock
        )
    }

    /// Packs the derived flags into a byte (see [`TileProperties`]).
    #[must_use]
    pub const fn properties(&self) -> u8 {
        let mut props = 0;
        if self.visible() {
            props |= TileProperties::VISIBLE;
        }
        if self.transparent() {
            props |= TileProperties::TRANSPARENT;
        }
        if self.solid() {
            props |= TileProperties::SOLID;
        }
        props
    }
}

impl From<TileKind> for Tile {
    fn from(kind: TileKind) -> Self {
        Self::of(kind)
    }
}
