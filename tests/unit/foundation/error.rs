use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SpecterError::transport("x")
            .to_string()
            .contains("transport error:")
    );
    assert!(SpecterError::decode("x").to_string().contains("decode error:"));
    assert!(
        SpecterError::process("x")
            .to_string()
            .contains("process error:")
    );
    assert!(
        SpecterError::service("x")
            .to_string()
            .contains("service unavailable:")
    );
    assert!(
        SpecterError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SpecterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_transport_validation_and_other_are_fatal() {
    assert!(SpecterError::transport("spi").is_fatal());
    assert!(SpecterError::validation("cfg").is_fatal());
    assert!(!SpecterError::decode("png").is_fatal());
    assert!(!SpecterError::process("arecord").is_fatal());
    assert!(!SpecterError::service("timeout").is_fatal());
}
