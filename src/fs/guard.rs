//! fenc 中间产物与部分输出的清理工具。
//!
//! `RemoveGuard` 持有一个路径，在 drop 时删除它，除非调用了 `keep()`。
//! - 中间文件（`.gz`）：从不 keep，无论成功或失败都会被删除
//! - 输出文件 / 输出目录：成功后 keep，任何错误路径上都会被删除

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    File,
    Dir,
}

#[derive(Debug)]
pub struct RemoveGuard {
    path: PathBuf,
    kind: Kind,
    armed: bool,
}

impl RemoveGuard {
    /// drop 时删除文件
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: Kind::File,
            armed: true,
        }
    }

    /// drop 时递归删除目录
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: Kind::Dir,
            armed: true,
        }
    }

    /// 不做任何清理的占位 guard（例如目标目录在运行前已存在）
    pub fn disarmed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: Kind::Dir,
            armed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保留该路径，返回其所有权
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }

    fn remove(&self) -> io::Result<()> {
        match self.kind {
            Kind::File => fs::remove_file(&self.path),
            Kind::Dir => fs::remove_dir_all(&self.path),
        }
    }
}

impl Drop for RemoveGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        match self.remove() {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "cleanup failed"),
        }
    }
}
