use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("cursor out of range: col {col}, row {row}")]
    Cursor { col: u8, row: u8 },
}

pub type Result<T> = std::result::Result<T, HwError>;
