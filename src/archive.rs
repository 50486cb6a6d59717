//! fenc 打包/解包实现（tar + gzip）
//!
//! 设计要点：
//! - 递归遍历输入（文件或目录），只打包普通文件，保持相对路径结构。
//! - 以 `.DS_` 或 `._` 开头的条目（及其子树）被跳过。
//! - 解包时严格校验条目路径，防止路径穿越写出到目标目录之外。

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use walkdir::{DirEntry, WalkDir};

use crate::error::{FencError, Result};

/// 打包时跳过的文件名前缀
pub const EXCLUDED_PREFIXES: &[&str] = &[".DS_", "._"];

/// 判断文件名是否命中排除规则
pub fn is_excluded(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    EXCLUDED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// 将 `root` 打包为 gzip 压缩的 tar 流写入 `writer`，返回打包的文件数。
///
/// 条目名：
/// - 输入为文件：`<文件名>`
/// - 输入为目录：`<目录名>/<相对路径>`
pub fn pack<W: Write>(root: &Path, writer: W) -> Result<u64> {
    let root_name = root
        .file_name()
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("{} 没有文件名", root.display()))
        })?
        .to_os_string();

    let mut builder = tar::Builder::new(GzEncoder::new(writer, Compression::default()));
    let mut count = 0u64;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(walkdir_to_io)?;

        if entry.file_type().is_dir() {
            continue;
        }
        if !entry.file_type().is_file() {
            tracing::debug!(path = %entry.path().display(), "skipping non-regular entry");
            continue;
        }

        let name = entry_name(root, &root_name, &entry)?;
        let mut file = File::open(entry.path())?;
        let size = file.metadata()?.len();

        builder
            .append_file(&name, &mut file)
            .map_err(FencError::from_archive_io)?;
        count += 1;

        tracing::info!("compressed {} size {size}", name.display());
    }

    let encoder = builder.into_inner().map_err(FencError::from_archive_io)?;
    let mut writer = encoder.finish()?;
    writer.flush()?;

    Ok(count)
}

/// 计算条目在 tar 中的名称
fn entry_name(root: &Path, root_name: &OsStr, entry: &DirEntry) -> Result<PathBuf> {
    if entry.depth() == 0 {
        return Ok(PathBuf::from(root_name));
    }

    let rel = entry.path().strip_prefix(root).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("无法计算相对路径: {e}"))
    })?;

    let mut name = PathBuf::from(root_name);
    name.push(validate_relative_path(rel)?);
    Ok(name)
}

/// 从 `reader` 读取 gzip 压缩的 tar 流，解包到 `dst_root`，返回解包的文件数。
///
/// - 会递归创建目录结构（Unix 下权限 0755）。
/// - 条目名中的根目录/盘符前缀被剥离，`..` 直接拒绝。
pub fn unpack<R: Read>(reader: R, dst_root: &Path) -> Result<u64> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    let mut count = 0u64;

    create_dir_all(dst_root)?;

    for entry in archive.entries().map_err(FencError::archive)? {
        let mut entry = entry.map_err(FencError::archive)?;
        let raw_path = entry.path().map_err(FencError::archive)?.into_owned();
        let rel = sanitize_entry_path(&raw_path)?;
        let out_path = dst_root.join(&rel);

        let entry_type = entry.header().entry_type();
        if entry_type.is_dir() {
            create_dir_all(&out_path)?;
            continue;
        }
        if !entry_type.is_file() {
            tracing::debug!(path = %raw_path.display(), ?entry_type, "skipping non-regular tar entry");
            continue;
        }

        if let Some(parent) = out_path.parent() {
            create_dir_all(parent)?;
        }

        let mut out = File::create(&out_path)?;
        let n = io::copy(&mut entry, &mut out).map_err(FencError::from_archive_io)?;
        out.flush()?;
        count += 1;

        tracing::info!("extracted {} size {n}", out_path.display());
    }

    Ok(count)
}

/// 清洗 tar 条目路径：
/// - 剥离根目录与盘符前缀（兼容旧版本写入的 `/a/b` 形式）
/// - 忽略 `.`
/// - 拒绝 `..`
/// - 拒绝清洗后为空的路径
pub fn sanitize_entry_path(raw: &Path) -> Result<PathBuf> {
    let mut safe = PathBuf::new();
    for comp in raw.components() {
        match comp {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::Normal(v) => safe.push(v),
            Component::ParentDir => {
                return Err(FencError::UnsafePath(raw.display().to_string()));
            }
        }
    }

    if safe.as_os_str().is_empty() {
        return Err(FencError::UnsafePath(raw.display().to_string()));
    }
    Ok(safe)
}

/// 校验遍历得到的相对路径仅包含普通组件
fn validate_relative_path(rel: &Path) -> Result<PathBuf> {
    let mut safe = PathBuf::new();
    for comp in rel.components() {
        match comp {
            Component::CurDir => {}
            Component::Normal(v) => safe.push(v),
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(FencError::UnsafePath(rel.display().to_string()));
            }
        }
    }
    Ok(safe)
}

#[cfg(unix)]
fn create_dir_all(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o755).create(path)
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

fn walkdir_to_io(err: walkdir::Error) -> io::Error {
    io::Error::other(err.to_string())
}
