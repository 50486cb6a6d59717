//! fenc 可选 KDF 前导头
//!
//! 默认（legacy）格式没有任何全局头部。选用 Argon2id 时，在第一个数据 chunk
//! 之前写入一个一次性前导头，复用 chunk 的 8 字节头部布局，但使用不同的 magic：
//!
//! 4  (magic "fenk")
//! 4  (body 长度 = 30, u32 大端)
//! 1  (version)
//! 1  (kdf id)
//! 4  (m_cost, KiB)
//! 4  (t_cost)
//! 4  (p_cost)
//! 16 (salt)
//!
//! 不认识前导头的旧解密器会在第一个 magic 处报 `bad head`，不会误解密。

use std::io::{BufRead, Write};

use crate::crypto::kdf::{self, Argon2Params, Key, SALT_LEN};
use crate::error::{FencError, Result};
use crate::format::chunk::ChunkHeader;

/// 前导头魔数
pub const KDF_MAGIC: &[u8; 4] = b"fenk";

/// 当前支持的前导头版本
pub const VERSION: u8 = 1;

/// KDF 标识：Argon2id
pub const KDF_ARGON2ID: u8 = 1;

/// 前导头 body 固定大小
pub const HEADER_BODY_LEN: usize = 1 + 1 + 4 + 4 + 4 + SALT_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfHeader {
    pub version: u8,
    pub params: Argon2Params,
    pub salt: [u8; SALT_LEN],
}

impl KdfHeader {
    pub fn new(params: Argon2Params, salt: [u8; SALT_LEN]) -> Self {
        Self {
            version: VERSION,
            params,
            salt,
        }
    }

    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        ChunkHeader::new(KDF_MAGIC, HEADER_BODY_LEN as u32).write(&mut writer)?;

        writer.write_all(&[self.version, KDF_ARGON2ID])?;
        writer.write_all(&self.params.m_cost.to_be_bytes())?;
        writer.write_all(&self.params.t_cost.to_be_bytes())?;
        writer.write_all(&self.params.p_cost.to_be_bytes())?;
        writer.write_all(&self.salt)?;

        Ok(())
    }

    /// 若输入以前导头开始，则读取并解析；否则不消费任何字节并返回 `None`。
    pub fn read_if_present<R: BufRead>(mut reader: R) -> Result<Option<Self>> {
        let peek = reader.fill_buf()?;
        if !peek.starts_with(KDF_MAGIC) {
            return Ok(None);
        }

        let header = ChunkHeader::read(&mut reader)?.ok_or(FencError::Truncated {
            expected: HEADER_BODY_LEN,
            actual: 0,
        })?;
        // 长度不符说明这并不是前导头，只是首个 chunk 的 magic 被破坏
        if header.body_len as usize != HEADER_BODY_LEN {
            return Err(FencError::BadMagic);
        }

        let body = header.read_body(&mut reader)?;
        Self::parse(&body).map(Some)
    }

    fn parse(body: &[u8]) -> Result<Self> {
        let version = body[0];
        if version != VERSION || body[1] != KDF_ARGON2ID {
            return Err(FencError::BadMagic);
        }

        let be_u32 = |at: usize| u32::from_be_bytes([body[at], body[at + 1], body[at + 2], body[at + 3]]);
        let params = Argon2Params {
            m_cost: be_u32(2),
            t_cost: be_u32(6),
            p_cost: be_u32(10),
        };
        params.check()?;

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&body[14..14 + SALT_LEN]);

        Ok(Self {
            version,
            params,
            salt,
        })
    }

    pub fn derive_key(&self, passphrase: &[u8]) -> Result<Key> {
        kdf::derive_argon2_key(passphrase, &self.salt, self.params)
    }
}

/// 按输入开头选择密钥：有前导头走 Argon2id，否则走 legacy MD5。
pub fn resolve_key<R: BufRead>(reader: R, passphrase: &[u8]) -> Result<Key> {
    match KdfHeader::read_if_present(reader)? {
        Some(header) => {
            tracing::debug!(?header.params, "kdf header found, using argon2id");
            header.derive_key(passphrase)
        }
        None => Ok(kdf::derive_legacy_key(passphrase)),
    }
}
