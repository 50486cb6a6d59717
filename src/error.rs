use thiserror::Error;

pub type Result<T> = std::result::Result<T, FencError>;

#[derive(Debug, Error)]
pub enum FencError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("bad head")]
    BadMagic,

    #[error("truncated chunk: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("bad ciphertext: {0}")]
    BadCiphertext(&'static str),

    #[error("bad padding (wrong key or corrupted data)")]
    BadPadding,

    #[error("keys don't match")]
    KeyMismatch,

    #[error("usage: {program} <enc|dec> <file or directory path>")]
    Usage { program: String },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("unsafe archive entry path: {0}")]
    UnsafePath(String),

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("chunk size must be in 1..={max}, got {size}")]
    InvalidChunkSize { size: usize, max: usize },
}

impl FencError {
    /// 解包时读取 gzip/tar 数据失败，一律视为归档格式错误
    pub(crate) fn archive(err: std::io::Error) -> Self {
        Self::Archive(err.to_string())
    }

    /// 将 tar/gzip 层返回的 I/O 错误归类。
    ///
    /// 数据格式类错误归为 `Archive`，其余（权限、磁盘满等）保持 `Io`。
    pub(crate) fn from_archive_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::InvalidData
            | std::io::ErrorKind::InvalidInput
            | std::io::ErrorKind::UnexpectedEof => Self::Archive(err.to_string()),
            _ => Self::Io(err),
        }
    }
}
