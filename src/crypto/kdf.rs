//! fenc 密钥派生函数（KDF）模块
//!
//! 提供两条派生路径：
//! - legacy：`MD5("fenc" ‖ passphrase)`，保证旧格式文件仍可解密；
//! - Argon2id：可选的强 KDF，salt 与参数记录在文件前导头中。
//!
//! 输出：
//! - 16 字节密钥（AES-128），离开作用域后自动清零

use argon2::{Algorithm, Argon2, Params, Version};
use md5::{Digest, Md5};
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroizing;

use crate::error::{FencError, Result};

/// 派生密钥长度（128-bit）
pub const KEY_LEN: usize = 16;

/// Argon2 salt 长度（字节）
pub const SALT_LEN: usize = 16;

/// legacy 派生时拼接在口令前的固定前缀
pub const LEGACY_PREFIX: &[u8; 4] = b"fenc";

pub type Key = Zeroizing<[u8; KEY_LEN]>;

/// legacy 密钥派生：`K = MD5("fenc" ‖ P)`
///
/// 无 salt、无迭代，强度很弱；仅为兼容既有文件而保留。
pub fn derive_legacy_key(passphrase: &[u8]) -> Key {
    let mut hasher = Md5::new();
    hasher.update(LEGACY_PREFIX);
    hasher.update(passphrase);
    let digest = hasher.finalize();

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&digest);
    key
}

/// Argon2id 参数
///
/// 参数随文件前导头一起保存，调整默认值不会影响已有文件的解密。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// 内存成本（KiB）
    pub m_cost: u32,
    /// 迭代次数
    pub t_cost: u32,
    /// 并行度
    pub p_cost: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            m_cost: 64 * 1024, // 64 MiB
            t_cost: 3,
            p_cost: 1,
        }
    }
}

/// 解密时接受的参数上限；参数来自文件，不可信
pub const MAX_M_COST: u32 = 1 << 20; // 1 GiB
pub const MAX_T_COST: u32 = 16;
pub const MAX_P_COST: u32 = 16;

impl Argon2Params {
    /// 拒绝超出上限的参数，避免按恶意文件给出的成本分配内存或长时间计算
    pub fn check(&self) -> Result<()> {
        if self.m_cost > MAX_M_COST || self.t_cost > MAX_T_COST || self.p_cost > MAX_P_COST {
            return Err(FencError::Kdf(format!(
                "argon2 params out of range: m_cost={} t_cost={} p_cost={}",
                self.m_cost, self.t_cost, self.p_cost
            )));
        }
        Ok(())
    }
}

/// 生成 Argon2 使用的随机 salt，每个文件独立
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// 使用 Argon2id 根据口令与 salt 派生 16 字节密钥
pub fn derive_argon2_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    params: Argon2Params,
) -> Result<Key> {
    let params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_LEN))
        .map_err(|e| FencError::Kdf(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase, salt, &mut key[..])
        .map_err(|e| FencError::Kdf(e.to_string()))?;

    Ok(key)
}
