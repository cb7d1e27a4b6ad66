use thiserror::Error;

/// Rejected tunable in one of the config structs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite")]
    NotFinite { field: &'static str },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} must lie in [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{field} ({value}) must not exceed {limit} ({max})")]
    Exceeds {
        field: &'static str,
        value: f32,
        limit: &'static str,
        max: f32,
    },
}

/// Failure building or editing a tile grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid must be at least 1x1 (got {width}x{height})")]
    EmptyGrid { width: u32, height: u32 },
    #[error("grid of {width}x{height} cells exceeds the {max} cell limit")]
    TooLarge { width: u32, height: u32, max: usize },
    #[error("tile size must be finite and positive (got {0})")]
    BadTileSize(f32),
    #[error("cell ({x}, {y}) is outside a {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
