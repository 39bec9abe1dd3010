// TxCodec tests

use dao_voting::identity::Keypair;
use dao_voting::tx::{CodecError, TxBuilder, TxCodec, TxValidator};

#[test]
fn test_hex_roundtrip_keeps_signature_valid() {
    let keypair = Keypair::generate();
    let signed = TxBuilder::new()
        .signer(&keypair)
        .create_proposal("Fund the audit", 3_600)
        .build()
        .unwrap();

    let hex = TxCodec::encode_hex(&signed).unwrap();
    let decoded = TxCodec::decode_hex(&hex).unwrap();

    assert_eq!(decoded.id(), signed.id());
    assert_eq!(decoded.caller(), keypair.address());
    assert!(TxValidator::is_valid(&decoded));
}

#[test]
fn test_invalid_hex() {
    let result = TxCodec::decode_hex("not hex at all");
    assert!(matches!(result, Err(CodecError::InvalidHex(_))));
}

#[test]
fn test_truncated_bytes() {
    let keypair = Keypair::generate();
    let signed = TxBuilder::new().signer(&keypair).finalize(1).build().unwrap();
    let bytes = TxCodec::encode(&signed).unwrap();

    let result = TxCodec::decode(&bytes[..bytes.len() / 2]);
    assert!(matches!(result, Err(CodecError::DecodeError(_))));
}
