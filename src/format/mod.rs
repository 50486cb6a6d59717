//! fenc 加密文件格式：chunk 头部、可选 KDF 前导头、chunk 流。

pub mod chunk;
pub mod header;
pub mod stream;
