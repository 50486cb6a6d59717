//! fenc 解密流程实现
//!
//! 解密流程（严格顺序）：
//! 1. 读取可选 KDF 前导头并派生密钥
//! 2. 使用 StreamDecryptor 将 chunk 流解密到 `<stem>fenc.gz`（中间文件）
//! 3. 解包到 `<dir>/fenc_dec/`
//! 4. 删除中间文件（无论成功失败）
//!
//! 注意：
//! - 任一 chunk 校验失败（magic / 长度 / 填充 / 截断）必须立即报错
//! - 输出目录若由本次运行创建，出错时整体删除；已存在的目录不会被删除

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::archive;
use crate::error::Result;
use crate::format::header;
use crate::format::stream::StreamDecryptor;
use crate::fs::guard::RemoveGuard;

/// 解密输出目录名
pub const OUTPUT_DIR: &str = "fenc_dec";

/// 解密 `.fenc` 文件，返回还原目录的路径
pub fn decrypt_path(input: &Path, passphrase: &str) -> Result<PathBuf> {
    let (gz_path, dst) = output_paths(input)?;

    let input_file = File::open(input)?;
    let total = input_file.metadata()?.len();
    let mut reader = BufReader::new(input_file);

    // ---------- 解密到中间文件 ----------
    let gz = RemoveGuard::file(gz_path);
    {
        let key = header::resolve_key(&mut reader, passphrase.as_bytes())?;

        let mut writer = BufWriter::new(File::create(gz.path())?);
        let chunks = StreamDecryptor::new(&key)
            .with_total_hint(total)
            .decrypt(&mut reader, &mut writer)?;
        writer.flush()?;
        tracing::debug!(chunks, path = %gz.path().display(), "stream decrypted");
    }

    // ---------- 解包 ----------
    let dst = if dst.exists() {
        RemoveGuard::disarmed(dst)
    } else {
        RemoveGuard::dir(dst)
    };

    let files = archive::unpack(BufReader::new(File::open(gz.path())?), dst.path())?;
    tracing::debug!(files, "archive extracted");

    Ok(dst.keep())
}

/// 计算中间文件与输出目录：`<dir>/<stem>fenc.gz` 与 `<dir>/fenc_dec`
fn output_paths(input: &Path) -> Result<(PathBuf, PathBuf)> {
    let stem = input.file_stem().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("{} 没有文件名", input.display()))
    })?;
    let dir = input.parent().unwrap_or(Path::new(""));

    let mut gz_name = stem.to_os_string();
    gz_name.push("fenc.gz");

    Ok((dir.join(gz_name), dir.join(OUTPUT_DIR)))
}
