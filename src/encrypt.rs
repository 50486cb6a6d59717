//! fenc 加密流程实现
//!
//! 将一个文件或目录加密为 `.fenc` 文件。
//!
//! 加密流程（严格顺序）：
//! 1. 派生密钥（legacy MD5，或 Argon2id）并构造 StreamEncryptor，参数非法时不产生任何文件
//! 2. 打包：输入 → `<stem>.gz`（tar + gzip，中间文件）
//! 3. 写入前导头（仅 Argon2id），再将中间文件分块加密写入 `<stem>.fenc`
//! 4. 删除中间文件（无论成功失败）；出错时同时删除部分写出的输出文件

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::archive;
use crate::crypto::kdf::{self, Argon2Params};
use crate::error::{FencError, Result};
use crate::format::header::KdfHeader;
use crate::format::stream::{DEFAULT_CHUNK_SIZE, StreamEncryptor};
use crate::fs::guard::RemoveGuard;

/// 加密输出文件扩展名
pub const ENCRYPTED_EXT: &str = "fenc";

/// 密钥派生方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KdfChoice {
    /// `MD5("fenc" ‖ P)`，输出与旧版本逐字节兼容
    #[default]
    Legacy,
    /// Argon2id + 随机 salt，参数写入前导头
    Argon2id(Argon2Params),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptOptions {
    /// 每个 chunk 的明文大小
    pub chunk_size: usize,
    pub kdf: KdfChoice,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            kdf: KdfChoice::Legacy,
        }
    }
}

impl EncryptOptions {
    pub fn with_strong_kdf(mut self) -> Self {
        self.kdf = KdfChoice::Argon2id(Argon2Params::default());
        self
    }
}

/// 加密输入路径，返回生成的 `.fenc` 文件路径
pub fn encrypt_path(input: &Path, passphrase: &str, options: &EncryptOptions) -> Result<PathBuf> {
    let (gz_path, out_path) = output_paths(input)?;

    // ---------- 派生密钥 ----------
    let (key, kdf_header) = match options.kdf {
        KdfChoice::Legacy => (kdf::derive_legacy_key(passphrase.as_bytes()), None),
        KdfChoice::Argon2id(params) => {
            let header = KdfHeader::new(params, kdf::generate_salt());
            (header.derive_key(passphrase.as_bytes())?, Some(header))
        }
    };
    let encryptor = StreamEncryptor::new(&key, options.chunk_size)?;

    // ---------- 打包到中间文件 ----------
    let gz = RemoveGuard::file(gz_path);
    {
        let mut writer = BufWriter::new(File::create(gz.path())?);
        let files = archive::pack(input, &mut writer)?;
        writer.flush()?;
        tracing::debug!(files, path = %gz.path().display(), "archive written");
    }

    // ---------- 写出加密文件 ----------
    let output = RemoveGuard::file(out_path);
    let mut writer = BufWriter::new(File::create(output.path())?);

    if let Some(header) = &kdf_header {
        header.write(&mut writer)?;
    }

    let input_file = File::open(gz.path())?;
    let total = input_file.metadata()?.len();

    let chunks = encryptor
        .with_total_hint(total)
        .encrypt(BufReader::new(input_file), &mut writer)?;

    writer.flush()?;
    writer.get_ref().sync_all()?;
    tracing::debug!(chunks, "stream encrypted");

    Ok(output.keep())
}

/// 计算中间文件与输出文件路径：`<dir>/<stem>.gz` 与 `<dir>/<stem>.fenc`
fn output_paths(input: &Path) -> Result<(PathBuf, PathBuf)> {
    let file_name = input.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("{} 没有文件名", input.display()))
    })?;
    let stem = input.file_stem().unwrap_or(file_name);
    let dir = input.parent().unwrap_or(Path::new(""));

    let out_path = dir.join(with_suffix(stem, &format!(".{ENCRYPTED_EXT}")));
    if out_path == input {
        return Err(FencError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("output {} would overwrite the input", out_path.display()),
        )));
    }

    let mut gz_path = dir.join(with_suffix(stem, ".gz"));
    if gz_path == input {
        gz_path = dir.join(with_suffix(file_name, ".gz"));
    }

    Ok((gz_path, out_path))
}

fn with_suffix(name: &std::ffi::OsStr, suffix: &str) -> OsString {
    let mut s = name.to_os_string();
    s.push(suffix);
    s
}
