use mcbench_core::options::{require_usize, OptValue, Options};
use mcbench_core::McError;

fn sample_options() -> Options {
    serde_json::from_str(
        r#"{
            "n_samples": 500,
            "sigma": 1.5,
            "centered": true,
            "family": "gaussian",
            "dim_x": [10, 20, 40]
        }"#,
    )
    .unwrap()
}

#[test]
fn untagged_values_parse_by_shape() {
    let opts = sample_options();
    assert_eq!(opts["n_samples"], OptValue::Int(500));
    assert_eq!(opts["sigma"], OptValue::Float(1.5));
    assert_eq!(opts["centered"], OptValue::Bool(true));
    assert_eq!(opts["family"], OptValue::Str("gaussian".into()));
    assert!(opts["dim_x"].is_list());
}

#[test]
fn iteration_preserves_insertion_order() {
    let opts = sample_options();
    let keys: Vec<&str> = opts.keys().map(String::as_str).collect();
    assert_eq!(keys, ["n_samples", "sigma", "centered", "family", "dim_x"]);
}

#[test]
fn numeric_coercions() {
    let opts = sample_options();
    assert_eq!(opts["n_samples"].as_usize(), Some(500));
    assert_eq!(opts["n_samples"].as_f64(), Some(500.0));
    assert_eq!(opts["sigma"].as_usize(), None);
    assert_eq!(OptValue::Int(-1).as_u64(), None);
    assert_eq!(OptValue::Int(-1).as_usize(), None);
    // Counts wider than the platform word are rejected, never truncated.
    assert_eq!(
        OptValue::Int(i64::MAX).as_usize(),
        usize::try_from(i64::MAX as u64).ok()
    );
}

#[test]
fn list_display_compresses_to_range() {
    let opts = sample_options();
    assert_eq!(opts["dim_x"].to_string(), "10_to_40");

    let words = OptValue::List(vec![
        OptValue::Str("low".into()),
        OptValue::Str("high".into()),
    ]);
    assert_eq!(words.to_string(), "low_to_high");
}

#[test]
fn require_usize_names_the_missing_key() {
    let opts = sample_options();
    assert_eq!(require_usize(&opts, "dgp_opts", "n_samples").unwrap(), 500);

    let err = require_usize(&opts, "mc_opts", "n_experiments").unwrap_err();
    match err {
        McError::Config(info) => {
            assert_eq!(info.context["key"], "n_experiments");
            assert_eq!(info.context["section"], "mc_opts");
        }
        other => panic!("expected config error, got {other:?}"),
    }
}
