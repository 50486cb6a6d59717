//! fenc Stream（chunk 分帧）实现
//!
//! 负责把任意长度的明文字节流切分为若干独立加密的 chunk，
//! 并在解密时按写入顺序还原。
//!
//! 每个 chunk：`"fenc" ‖ be_u32(len(body)) ‖ body`，`body = IV ‖ AES-128-CBC(PKCS7(slice))`。
//!
//! 约束：
//! - 严格顺序处理，chunk i 完整写出后才处理 chunk i+1
//! - 任一 chunk 出错（magic / 长度 / 填充 / 截断）立即中止整个流程
//! - 本模块不负责清理部分写出的文件

use std::io::{Read, Write};

use crate::crypto::aes_cbc;
use crate::crypto::kdf::{KEY_LEN, Key};
use crate::error::{FencError, Result};
use crate::format::chunk::{CHUNK_HEADER_LEN, ChunkHeader, MAGIC, MAX_BODY_LEN, read_full};

/// 默认明文 chunk 大小：10 MiB
pub const DEFAULT_CHUNK_SIZE: usize = 10 << 20;

/// 允许配置的最大明文 chunk 大小，保证加密后的 body 不超过 `MAX_BODY_LEN`
pub const MAX_CHUNK_SIZE: usize = MAX_BODY_LEN - 2 * aes_cbc::BLOCK_SIZE;

/// 流式加密器
pub struct StreamEncryptor {
    key: Key,
    chunk_size: usize,
    chunk_index: u64,
    bytes_in: u64,
    total_hint: Option<u64>,
}

impl StreamEncryptor {
    /// - key: 16 字节密钥（来自 KDF）
    /// - chunk_size: 每个明文 chunk 的大小，须在 `1..=MAX_CHUNK_SIZE` 内
    pub fn new(key: &[u8; KEY_LEN], chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
            return Err(FencError::InvalidChunkSize {
                size: chunk_size,
                max: MAX_CHUNK_SIZE,
            });
        }

        Ok(Self {
            key: Key::new(*key),
            chunk_size,
            chunk_index: 0,
            bytes_in: 0,
            total_hint: None,
        })
    }

    /// 设置输入总长度，仅用于进度日志
    pub fn with_total_hint(mut self, total: u64) -> Self {
        self.total_hint = Some(total);
        self
    }

    /// 从 reader 读取明文，分块加密后写入 writer，返回写出的 chunk 数
    pub fn encrypt<R: Read, W: Write>(&mut self, mut reader: R, mut writer: W) -> Result<u64> {
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let read_len = read_full(&mut reader, &mut buffer)?;
            if read_len == 0 {
                break;
            }

            let body = aes_cbc::encrypt(&buffer[..read_len], &self.key);

            ChunkHeader::new(MAGIC, body.len() as u32).write(&mut writer)?;
            writer.write_all(&body)?;

            self.chunk_index += 1;
            self.bytes_in += read_len as u64;
            log_progress("encrypted", self.chunk_index, self.bytes_in, self.total_hint);

            if read_len < self.chunk_size {
                break;
            }
        }

        Ok(self.chunk_index)
    }
}

/// 流式解密器
pub struct StreamDecryptor {
    key: Key,
    chunk_index: u64,
    bytes_in: u64,
    total_hint: Option<u64>,
}

impl StreamDecryptor {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            key: Key::new(*key),
            chunk_index: 0,
            bytes_in: 0,
            total_hint: None,
        }
    }

    /// 设置加密文件总长度，仅用于进度日志
    pub fn with_total_hint(mut self, total: u64) -> Self {
        self.total_hint = Some(total);
        self
    }

    /// 从 reader 读取 chunk 序列，解密后顺序写入 writer，返回处理的 chunk 数
    pub fn decrypt<R: Read, W: Write>(&mut self, mut reader: R, mut writer: W) -> Result<u64> {
        while let Some(header) = ChunkHeader::read(&mut reader)? {
            header.expect_magic(MAGIC)?;

            let body = header.read_body(&mut reader)?;
            let plaintext = aes_cbc::decrypt(&body, &self.key)?;
            writer.write_all(&plaintext)?;

            self.chunk_index += 1;
            self.bytes_in += (body.len() + CHUNK_HEADER_LEN) as u64;
            log_progress("decrypted", self.chunk_index, self.bytes_in, self.total_hint);
        }

        Ok(self.chunk_index)
    }
}

fn log_progress(action: &str, chunk: u64, done: u64, total: Option<u64>) {
    match total {
        Some(total) => tracing::info!(chunk, "{action} {done}/{total}"),
        None => tracing::info!(chunk, "{action} {done}"),
    }
}

/// 便捷函数：使用默认 chunk 大小加密整个流
pub fn frame_encrypt<R: Read, W: Write>(reader: R, writer: W, key: &[u8; KEY_LEN]) -> Result<u64> {
    StreamEncryptor::new(key, DEFAULT_CHUNK_SIZE)?.encrypt(reader, writer)
}

/// 便捷函数：解密整个 chunk 流
pub fn frame_decrypt<R: Read, W: Write>(reader: R, writer: W, key: &[u8; KEY_LEN]) -> Result<u64> {
    StreamDecryptor::new(key).decrypt(reader, writer)
}
