//! 密码学原语：密钥派生与分组加密。

pub mod aes_cbc;
pub mod kdf;
