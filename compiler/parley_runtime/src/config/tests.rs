#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use crate::anomaly::AnomalyKind;
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.precision, 24);
    assert_eq!(config.max_digits, 30);
    assert_eq!(config.base, 10);
    assert_eq!(config.rounding, RoundingMode::HalfEven);
    assert!(!config.strict_lists);
    assert_eq!(config.verbosity, Verbosity::Normal);
    assert!(Config::strict().strict_lists);
}

#[test]
fn precision_bounds() {
    assert_eq!(Config::check_precision(1).unwrap(), MIN_PRECISION);
    assert_eq!(Config::check_precision(10_000).unwrap(), MAX_PRECISION);
    for bad in [0, -5, 10_001, i64::MAX] {
        assert_eq!(
            Config::check_precision(bad).unwrap_err().kind,
            AnomalyKind::BadPrecision { precision: bad }
        );
    }
}

#[test]
fn base_bounds() {
    assert_eq!(Config::check_base(16).unwrap(), 16);
    assert_eq!(
        Config::check_base(1).unwrap_err().kind,
        AnomalyKind::BadBase { base: 1 }
    );
    assert_eq!(
        Config::check_base(37).unwrap_err().kind,
        AnomalyKind::BadBase { base: 37 }
    );
}

#[test]
fn failed_update_leaves_config_unchanged() {
    let shared = SharedConfig::new(Config::default());
    assert!(shared.set_precision(0).is_err());
    assert_eq!(shared.get().precision, DEFAULT_PRECISION);
    shared.set_precision(50).unwrap();
    assert_eq!(shared.get().precision, 50);
}

#[test]
fn clones_share_state() {
    let shared = SharedConfig::default();
    let other = shared.clone();
    other.set_strict_lists(true);
    assert!(shared.get().strict_lists);
}

#[test]
fn precision_variable_reads_and_writes_config() {
    let shared = SharedConfig::default();
    let var = shared.precision_variable("precision").as_variable().unwrap();
    let config = shared.get();
    assert_eq!(var.as_string(&config).unwrap(), "24");

    var.assign(Scalar::Str("12".into()), &config).unwrap();
    assert_eq!(shared.get().precision, 12);

    let err = var.assign(Scalar::Str("0".into()), &config).unwrap_err();
    assert_eq!(err.kind, AnomalyKind::BadPrecision { precision: 0 });
    assert_eq!(shared.get().precision, 12);
}

#[test]
fn base_variable_validates() {
    let shared = SharedConfig::default();
    let var = shared.base_variable("base").as_variable().unwrap();
    let config = shared.get();
    var.assign(Scalar::Str("16".into()), &config).unwrap();
    assert_eq!(shared.get().base, 16);
    let err = var.assign(Scalar::Bool(true), &config).unwrap_err();
    assert_eq!(err.kind, AnomalyKind::BadBase { base: 1 });
}

#[test]
fn strict_lists_variable_coerces_to_bool() {
    let shared = SharedConfig::default();
    let var = shared.strict_lists_variable("strictLists").as_variable().unwrap();
    let config = shared.get();
    var.assign(Scalar::Str("yes".into()), &config).unwrap();
    assert!(shared.get().strict_lists);
    var.assign(Scalar::Str("FALSE".into()), &config).unwrap();
    assert!(!shared.get().strict_lists);
    assert_eq!(var.value(&config).unwrap(), Scalar::Bool(false));
}

#[test]
fn verbosity_maps_to_level_filter() {
    assert_eq!(Verbosity::Silent.level_filter(), LevelFilter::OFF);
    assert_eq!(Verbosity::Normal.level_filter(), LevelFilter::WARN);
    assert_eq!(Verbosity::Debug.level_filter(), LevelFilter::DEBUG);
}
