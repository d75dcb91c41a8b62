use termlower::error::ConfigError;
use termlower::ir::Endianness;
use termlower::LowerConfig;

#[test]
fn test_empty_document_gives_defaults() {
    let config = LowerConfig::from_toml_str("").unwrap();
    assert_eq!(config, LowerConfig::default());
    assert_eq!(config.target_endianness, Endianness::Little);
    assert!(config.fold_constants);
    assert!(config.verify);
}

#[test]
fn test_all_keys() {
    let config = LowerConfig::from_toml_str(
        r#"
        target_endianness = "big"
        fold_constants = false
        verify = false
        "#,
    )
    .unwrap();
    assert_eq!(config.target_endianness, Endianness::Big);
    assert!(!config.fold_constants);
    assert!(!config.verify);
}

#[test]
fn test_missing_keys_keep_defaults() {
    let config = LowerConfig::from_toml_str("fold_constants = false").unwrap();
    assert_eq!(config.target_endianness, Endianness::Little);
    assert!(!config.fold_constants);
    assert!(config.verify);
}

#[test]
fn test_native_target_is_rejected() {
    let err = LowerConfig::from_toml_str(r#"target_endianness = "native""#).unwrap_err();
    assert!(matches!(err, ConfigError::NativeTarget));
}

#[test]
fn test_malformed_values_are_parse_errors() {
    let err = LowerConfig::from_toml_str(r#"target_endianness = "middle""#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let err = LowerConfig::from_toml_str("verify = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_errors_convert_to_crate_error() {
    let err: termlower::Error = LowerConfig::from_toml_str(r#"target_endianness = "native""#)
        .unwrap_err()
        .into();
    assert!(err.to_string().starts_with("[configuration error]"));
}
