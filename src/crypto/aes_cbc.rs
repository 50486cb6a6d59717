//! AES-128-CBC + PKCS#7 一次性加解密原语
//!
//! 输出格式自描述：`IV(16) ‖ ciphertext`。
//! - 每次加密都从系统 CSPRNG 抽取全新 IV
//! - 本原语只提供机密性，不提供完整性校验

use aes::Aes128;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::{RngCore, rngs::OsRng};

use crate::crypto::kdf::KEY_LEN;
use crate::error::{FencError, Result};

/// AES 分组长度，同时也是 IV 长度
pub const BLOCK_SIZE: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// 加密后的密文长度：IV + 填充到 16 字节边界（填充长度为 1..=16）
pub fn encrypted_len(plain_len: usize) -> usize {
    BLOCK_SIZE + (plain_len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// 加密 `plain`，返回 `IV ‖ ct`
pub fn encrypt(plain: &[u8], key: &[u8; KEY_LEN]) -> Vec<u8> {
    let mut iv = [0u8; BLOCK_SIZE];
    OsRng.fill_bytes(&mut iv);

    let ct = Aes128CbcEnc::new(&(*key).into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plain);

    let mut body = Vec::with_capacity(BLOCK_SIZE + ct.len());
    body.extend_from_slice(&iv);
    body.extend_from_slice(&ct);
    body
}

/// 解密 `IV ‖ ct`，校验并去除 PKCS#7 填充
///
/// # 错误
/// - 长度不足一个 IV，或密文不是整块：`BadCiphertext`
/// - 填充非法（通常意味着口令错误）：`BadPadding`
pub fn decrypt(body: &[u8], key: &[u8; KEY_LEN]) -> Result<Vec<u8>> {
    if body.len() < BLOCK_SIZE {
        return Err(FencError::BadCiphertext("ciphertext too short"));
    }

    let (iv, ct) = body.split_at(BLOCK_SIZE);
    if ct.len() % BLOCK_SIZE != 0 {
        return Err(FencError::BadCiphertext("ciphertext not full blocks"));
    }
    // 合法密文至少包含一个填充块
    if ct.is_empty() {
        return Err(FencError::BadPadding);
    }

    let mut iv_block = [0u8; BLOCK_SIZE];
    iv_block.copy_from_slice(iv);

    Aes128CbcDec::new(&(*key).into(), &iv_block.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ct)
        .map_err(|_| FencError::BadPadding)
}
