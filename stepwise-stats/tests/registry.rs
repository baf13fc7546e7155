//! Calculators driven through the registry with JSON arguments

use serde_json::json;
use stepwise_core::codes;
use stepwise_plugin::{CalcContext, CalculatorRegistry};
use stepwise_stats::load_stats_library;
use stepwise_tables::EmptyTables;
use std::sync::Arc;

fn registry() -> CalculatorRegistry {
    load_stats_library(CalculatorRegistry::new())
}

fn number(value: &serde_json::Value, field: &str) -> f64 {
    value[field].as_f64().unwrap()
}

#[test]
fn test_every_calculator_registered() {
    let registry = registry();
    let names: Vec<&str> = registry.metas().iter().map(|m| m.name).collect();
    for expected in [
        "combinations",
        "permutations",
        "binomial",
        "binomial_range",
        "poisson",
        "poisson_range",
        "hypergeometric",
        "descriptive",
        "box_plot",
        "special_means",
        "t_test_one_sample",
        "t_test_paired",
        "t_test_independent",
        "t_test_independent_summary",
        "chi_square_gof",
        "chi_square_independence",
        "linear_regression",
        "regression_predict",
    ] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
    assert_eq!(registry.len(), 18);
}

#[test]
fn test_related_names_resolve() {
    let registry = registry();
    for meta in registry.metas() {
        for related in meta.related {
            assert!(registry.get(related).is_some(), "{} lists unknown {}", meta.name, related);
        }
    }
}

#[test]
fn test_binomial_range_through_registry() {
    let registry = registry();
    let report = registry
        .call("binomial_range", json!({"n": 10, "min": 4, "max": 6, "p": 0.5}), &CalcContext::default())
        .unwrap();
    let value = report.value().unwrap();
    assert!((number(value, "probability") - 0.65625).abs() < 1e-9);
    for id in ["identify", "formula", "calculations", "sum"] {
        assert!(report.steps().contains(id), "missing step {}", id);
    }
}

#[test]
fn test_invalid_input_is_soft() {
    let registry = registry();
    let report = registry
        .call("binomial_range", json!({"n": 10, "min": 5, "max": 4, "p": 0.5}), &CalcContext::default())
        .unwrap();
    assert!(report.is_invalid());
    assert!(report.steps().contains("invalid"));
}

#[test]
fn test_data_as_delimited_string() {
    let registry = registry();
    let report = registry
        .call("descriptive", json!({"data": "2, 4, 4, 4, 5, 5, 7, 9"}), &CalcContext::default())
        .unwrap();
    let value = report.value().unwrap();
    assert_eq!(number(value, "mean"), 5.0);
    assert_eq!(number(value, "population_std_dev"), 2.0);
}

#[test]
fn test_box_plot_too_few_values_is_error() {
    let registry = registry();
    let err = registry
        .call("box_plot", json!({"data": [4]}), &CalcContext::default())
        .unwrap_err();
    assert_eq!(err.code, codes::INSUFFICIENT_DATA);
}

#[test]
fn test_negative_count_is_soft() {
    let registry = registry();
    let report = registry
        .call("permutations", json!({"n": -3, "r": 2}), &CalcContext::default())
        .unwrap();
    assert!(report.is_invalid());
    assert_eq!(report.steps().ids(), vec!["identify", "invalid"]);
}

#[test]
fn test_negative_trim_is_error() {
    let registry = registry();
    let err = registry
        .call("special_means", json!({"data": [1, 2, 3], "trim_count": -1}), &CalcContext::default())
        .unwrap_err();
    assert_eq!(err.code, codes::DOMAIN_ERROR);
}

#[test]
fn test_missing_argument() {
    let registry = registry();
    let err = registry
        .call("poisson", json!({"lambda": 2}), &CalcContext::default())
        .unwrap_err();
    assert_eq!(err.code, codes::ARG_MISSING);
}

#[test]
fn test_unknown_calculator_suggests() {
    let registry = registry();
    let err = registry.call("binomal", json!({}), &CalcContext::default()).unwrap_err();
    assert_eq!(err.code, codes::UNKNOWN_CALCULATOR);
    assert!(err.suggestion.unwrap().contains("binomial"));
}

#[test]
fn test_context_alpha_default() {
    let registry = registry();
    let args = json!({"data": [10, 11, 12, 11, 10.5], "mu0": 10});
    let strict = CalcContext::default().with_default_alpha(0.001);
    let report = registry.call("t_test_one_sample", args.clone(), &strict).unwrap();
    assert_eq!(report.value().unwrap()["alpha"], json!(0.001));

    let report = registry.call("t_test_one_sample", args, &CalcContext::default()).unwrap();
    assert_eq!(report.value().unwrap()["alpha"], json!(0.05));
}

#[test]
fn test_empty_tables_leave_decision_undetermined() {
    let registry = registry();
    let ctx = CalcContext::new(Arc::new(EmptyTables));
    let report = registry
        .call("t_test_one_sample", json!({"data": [48, 52, 50, 49, 51], "mu0": 50}), &ctx)
        .unwrap();
    assert_eq!(report.value().unwrap()["decision"], json!("undetermined"));
}

#[test]
fn test_one_tailed_from_context() {
    let registry = registry();
    let ctx = CalcContext::default().with_two_tailed(false);
    let report = registry
        .call(
            "t_test_independent_summary",
            json!({"n1": 30, "mean1": 75, "sd1": 10, "n2": 30, "mean2": 70, "sd2": 12}),
            &ctx,
        )
        .unwrap();
    assert_eq!(report.value().unwrap()["tails"], json!("one"));
}

#[test]
fn test_chi_square_independence_table() {
    let registry = registry();
    let report = registry
        .call("chi_square_independence", json!({"table": [[20, 30], [30, 20]]}), &CalcContext::default())
        .unwrap();
    let value = report.value().unwrap();
    assert!((number(value, "statistic") - 4.0).abs() < 1e-9);
    assert_eq!(value["decision"], json!("reject"));
}

#[test]
fn test_regression_predict_appends_step() {
    let registry = registry();
    let report = registry
        .call("regression_predict", json!({"x": [0, 1, 2], "y": [1, 3, 5], "at": 4}), &CalcContext::default())
        .unwrap();
    assert!((number(report.value().unwrap(), "y") - 9.0).abs() < 1e-9);
    assert_eq!(report.steps().last().unwrap().id, "prediction");
    assert!(report.steps().contains("significance"));
}

#[test]
fn test_report_serializes_with_status_tag() {
    let registry = registry();
    let report = registry
        .call("combinations", json!({"n": 10, "r": 4}), &CalcContext::default())
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], json!("ok"));
    assert_eq!(json["value"]["count"], json!(210.0));
}

#[test]
fn test_list_by_category() {
    let registry = registry();
    let hypothesis = registry.list(Some("hypothesis"));
    assert_eq!(hypothesis.as_array().unwrap().len(), 6);
    let help = registry.help(Some("binomial")).unwrap();
    assert_eq!(help["category"], json!("distributions"));
}
