//! fenc chunk 头部编解码
//!
//! 每个 chunk 以 8 字节头部开始：
//!
//! 4 (magic, ASCII)
//! 4 (body 长度, u32 大端)
//!
//! 加密文件没有全局头部和尾部，读取方在 chunk 边界处遇到 EOF 即视为结束。

use std::io::{self, Read, Write};

use crate::error::{FencError, Result};

/// 数据 chunk 魔数
pub const MAGIC: &[u8; 4] = b"fenc";

/// chunk 头部固定大小
pub const CHUNK_HEADER_LEN: usize = 8;

/// 解密时允许的最大 body 长度（64 MiB）
///
/// 长度字段由文件提供，不可信；超出即拒绝，避免按攻击者给出的长度分配内存。
pub const MAX_BODY_LEN: usize = 64 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub magic: [u8; 4],
    pub body_len: u32,
}

impl ChunkHeader {
    pub fn new(magic: &[u8; 4], body_len: u32) -> Self {
        Self {
            magic: *magic,
            body_len,
        }
    }

    pub fn to_bytes(&self) -> [u8; CHUNK_HEADER_LEN] {
        let mut buf = [0u8; CHUNK_HEADER_LEN];
        buf[..4].copy_from_slice(&self.magic);
        buf[4..].copy_from_slice(&self.body_len.to_be_bytes());
        buf
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    /// 读取下一个 chunk 头部
    ///
    /// - 在 chunk 边界处 EOF：返回 `Ok(None)`
    /// - 不足 8 字节即 EOF：`Truncated`
    ///
    /// 不校验 magic，由调用方决定期望值。
    pub fn read<R: Read>(mut reader: R) -> Result<Option<Self>> {
        let mut buf = [0u8; CHUNK_HEADER_LEN];
        let n = read_full(&mut reader, &mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        if n < CHUNK_HEADER_LEN {
            return Err(FencError::Truncated {
                expected: CHUNK_HEADER_LEN,
                actual: n,
            });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[..4]);
        let body_len = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);

        Ok(Some(Self { magic, body_len }))
    }

    pub fn expect_magic(&self, magic: &[u8; 4]) -> Result<()> {
        if &self.magic != magic {
            return Err(FencError::BadMagic);
        }
        Ok(())
    }

    /// 读取紧随头部之后、恰好 `body_len` 字节的 body
    pub fn read_body<R: Read>(&self, mut reader: R) -> Result<Vec<u8>> {
        let len = self.body_len as usize;
        if len > MAX_BODY_LEN {
            return Err(FencError::BadCiphertext("chunk length exceeds limit"));
        }

        let mut body = vec![0u8; len];
        let n = read_full(&mut reader, &mut body)?;
        if n < len {
            return Err(FencError::Truncated {
                expected: len,
                actual: n,
            });
        }
        Ok(body)
    }
}

/// 反复 read 直到填满 `buf` 或遇到 EOF，返回实际读取的字节数。
///
/// 单次 `read` 可能返回短读，不能据此判断流已结束。
pub fn read_full<R: Read>(mut reader: R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
