use overlay_core::{ConfigError, OverlayConfig};

#[test]
fn test_defaults() {
    let config = OverlayConfig::default();
    assert_eq!(config.edge_margin, 16.0);
    assert_eq!(config.dismiss_distance, 100.0);
    assert_eq!(config.mobile_breakpoint, 768.0);
    assert!(config.close_on_escape);
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder() {
    let config = OverlayConfig::new()
        .edge_margin(1.0)
        .dismiss_thresholds(4.0, 20.0)
        .mobile_breakpoint(80.0)
        .panel_width(30.0)
        .panel_max_height(12.0)
        .close_on_outside_click(false);

    assert_eq!(config.edge_margin, 1.0);
    assert_eq!(config.dismiss_velocity, 20.0);
    assert_eq!(config.panel_width, Some(30.0));
    assert!(!config.close_on_outside_click);
    assert!(config.validate().is_ok());
}

#[test]
fn test_rejects_negative_margin() {
    let err = OverlayConfig::new().edge_margin(-1.0).validate().unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidLength {
            field: "edge_margin",
            value: -1.0
        }
    );
}

#[test]
fn test_rejects_zero_threshold() {
    let err = OverlayConfig::new()
        .dismiss_thresholds(0.0, 500.0)
        .validate()
        .unwrap_err();
    assert!(matches!(err, ConfigError::NonPositive { field: "dismiss_distance", .. }));
}

#[test]
fn test_rejects_nan_breakpoint() {
    let err = OverlayConfig::new()
        .mobile_breakpoint(f32::NAN)
        .validate()
        .unwrap_err();
    assert!(matches!(err, ConfigError::NonPositive { field: "mobile_breakpoint", .. }));
}

#[test]
fn test_rejects_bad_ratio() {
    let err = OverlayConfig::new()
        .sheet_max_height_ratio(1.5)
        .validate()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRatio { .. }));
    assert_eq!(
        err.to_string(),
        "'sheet_max_height_ratio' must be in (0, 1] (got 1.5)"
    );
}

#[test]
fn test_deserialize_partial() {
    let config: OverlayConfig =
        serde_json::from_str(r#"{ "mobile_breakpoint": 640.0, "panel_width": 280.0 }"#).unwrap();
    assert_eq!(config.mobile_breakpoint, 640.0);
    assert_eq!(config.panel_width, Some(280.0));
    // Missing fields fall back to defaults
    assert_eq!(config.edge_margin, 16.0);
    assert!(config.validate().is_ok());
}
