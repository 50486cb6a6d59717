mod decrypt;
mod encrypt;

pub mod archive;
pub mod crypto;
pub mod error;
pub mod format;
pub mod fs;

pub use crypto::kdf::Argon2Params;
pub use decrypt::OUTPUT_DIR;
pub use encrypt::{ENCRYPTED_EXT, EncryptOptions, KdfChoice};
pub use error::{FencError, Result};

use std::path::{Path, PathBuf};

/// 使用默认选项（10 MiB chunk、legacy KDF）加密文件或目录，返回 `.fenc` 路径
pub fn encrypt(input: &Path, passphrase: &str) -> Result<PathBuf> {
    encrypt::encrypt_path(input, passphrase, &EncryptOptions::default())
}

pub fn encrypt_with_options(
    input: &Path,
    passphrase: &str,
    options: &EncryptOptions,
) -> Result<PathBuf> {
    encrypt::encrypt_path(input, passphrase, options)
}

/// 解密 `.fenc` 文件到同级 `fenc_dec/` 目录，返回该目录路径
pub fn decrypt(input: &Path, passphrase: &str) -> Result<PathBuf> {
    decrypt::decrypt_path(input, passphrase)
}
