//! 密钥派生与 AES-128-CBC 原语测试

use fenc::FencError;
use fenc::crypto::aes_cbc::{self, BLOCK_SIZE};
use fenc::crypto::kdf::{self, Argon2Params};

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn legacy_key_is_md5_of_prefixed_passphrase() {
    assert_eq!(
        hex(&kdf::derive_legacy_key(b"")[..]),
        "d52d637efbe0acde79d6de911ebe5516"
    );
    assert_eq!(
        hex(&kdf::derive_legacy_key(b"x")[..]),
        "9477edb892f9ebb3888dd5369eba3636"
    );
    assert_eq!(
        kdf::derive_legacy_key(b"pw")[..],
        kdf::derive_legacy_key(b"pw")[..]
    );
}

#[test]
fn argon2_key_depends_on_salt() {
    let params = Argon2Params {
        m_cost: 1024,
        t_cost: 1,
        p_cost: 1,
    };
    let a = kdf::derive_argon2_key(b"pw", &[1u8; 16], params).expect("derive a");
    let b = kdf::derive_argon2_key(b"pw", &[1u8; 16], params).expect("derive b");
    let c = kdf::derive_argon2_key(b"pw", &[2u8; 16], params).expect("derive c");

    assert_eq!(a[..], b[..]);
    assert_ne!(a[..], c[..]);
}

#[test]
fn argon2_rejects_invalid_params() {
    let params = Argon2Params {
        m_cost: 1,
        t_cost: 0,
        p_cost: 1,
    };
    let result = kdf::derive_argon2_key(b"pw", &[0u8; 16], params);
    assert!(matches!(result, Err(FencError::Kdf(_))));
}

#[test]
fn argon2_param_ceilings() {
    assert!(Argon2Params::default().check().is_ok());

    let at_limit = Argon2Params {
        m_cost: kdf::MAX_M_COST,
        t_cost: kdf::MAX_T_COST,
        p_cost: kdf::MAX_P_COST,
    };
    assert!(at_limit.check().is_ok());

    for over in [
        Argon2Params { m_cost: kdf::MAX_M_COST + 1, ..at_limit },
        Argon2Params { t_cost: kdf::MAX_T_COST + 1, ..at_limit },
        Argon2Params { p_cost: kdf::MAX_P_COST + 1, ..at_limit },
    ] {
        assert!(matches!(over.check(), Err(FencError::Kdf(_))), "{over:?}");
    }
}

#[test]
fn encrypt_pads_to_block_boundary() {
    let key = kdf::derive_legacy_key(b"pw");

    for len in [0usize, 1, 6, 15, 16, 17, 31, 32, 100] {
        let plain = vec![0x5au8; len];
        let body = aes_cbc::encrypt(&plain, &key);

        // 填充长度总在 [1, 16]，因此整块数为 len/16 + 1
        assert_eq!(body.len(), BLOCK_SIZE + (len / BLOCK_SIZE + 1) * BLOCK_SIZE);
        assert_eq!(body.len(), aes_cbc::encrypted_len(len));

        let decrypted = aes_cbc::decrypt(&body, &key).expect("decrypt");
        assert_eq!(decrypted, plain);
    }
}

#[test]
fn encrypt_draws_fresh_iv() {
    let key = kdf::derive_legacy_key(b"pw");
    let a = aes_cbc::encrypt(b"same plaintext", &key);
    let b = aes_cbc::encrypt(b"same plaintext", &key);

    assert_ne!(a[..BLOCK_SIZE], b[..BLOCK_SIZE]);
    assert_ne!(a[BLOCK_SIZE..], b[BLOCK_SIZE..]);
}

#[test]
fn decrypt_rejects_short_or_ragged_ciphertext() {
    let key = kdf::derive_legacy_key(b"pw");

    assert!(matches!(
        aes_cbc::decrypt(&[0u8; 15], &key),
        Err(FencError::BadCiphertext(_))
    ));
    assert!(matches!(
        aes_cbc::decrypt(&[0u8; 16 + 17], &key),
        Err(FencError::BadCiphertext(_))
    ));
    assert!(matches!(
        aes_cbc::decrypt(&[0u8; 16], &key),
        Err(FencError::BadPadding)
    ));
}

#[test]
fn decrypt_detects_invalid_padding() {
    let key = kdf::derive_legacy_key(b"pw");
    let mut body = aes_cbc::encrypt(b"hello\n", &key);

    // 单块密文：修改 IV 最后一字节会直接改变明文的填充字节（0x0a → 0x20）
    body[BLOCK_SIZE - 1] ^= 0x0a ^ 0x20;

    assert!(matches!(
        aes_cbc::decrypt(&body, &key),
        Err(FencError::BadPadding)
    ));
}
