use dao_voting::identity::{Keypair, KeypairError, PublicKey};

/// Test: Each generated keypair should be unique
#[test]
fn test_keypairs_are_unique() {
    let keypair1 = Keypair::generate();
    let keypair2 = Keypair::generate();

    assert_ne!(
        keypair1.public_key().as_bytes(),
        keypair2.public_key().as_bytes(),
        "Two generated keypairs should have different public keys"
    );
}

/// Test: Public key has correct length (32 bytes for Ed25519)
#[test]
fn test_public_key_length() {
    let keypair = Keypair::generate();
    assert_eq!(keypair.public_key().as_bytes().len(), 32);
}

/// Test: Can serialize keypair to bytes and restore it
#[test]
fn test_keypair_serialization() {
    let original = Keypair::generate();
    let restored = Keypair::from_bytes(&original.to_bytes()).expect("Should deserialize keypair from bytes");

    assert_eq!(original.public_key(), restored.public_key());
    assert_eq!(original.address(), restored.address());
}

/// Test: Public key survives postcard serialization
#[test]
fn test_public_key_postcard_roundtrip() {
    let public_key = Keypair::generate().public_key();
    let bytes = postcard::to_allocvec(&public_key).unwrap();
    let restored: PublicKey = postcard::from_bytes(&bytes).unwrap();

    assert_eq!(public_key, restored);
}

/// Test: Wrong-length public key bytes are rejected
#[test]
fn test_public_key_wrong_length() {
    let result = PublicKey::from_bytes(&[1u8; 31]);
    assert!(matches!(
        result,
        Err(KeypairError::InvalidLength { expected: 32, got: 31 })
    ));
}
