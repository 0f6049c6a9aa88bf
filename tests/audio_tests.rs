use logpulse::audio::AudioSeverity;
use logpulse::AudioProcessorAnalyzer;
use serde_json::json;

#[test]
fn healthy_processor_is_optimal() {
    let doc = json!({
        "processorData": {"model": "AZMP8"},
        "logs": [{"message": "Scene recall complete"}],
        "metrics": {
            "inputLevels": {"1": -18.0, "2": -20.5},
            "outputLevels": {"main": -12.0},
            "networkLatency": 4,
            "cpuLoad": 30
        }
    });
    let outcome = AudioProcessorAnalyzer::new().analyze_document(&doc);
    let r = outcome.report().expect("report");
    assert_eq!(r.severity, AudioSeverity::Optimal);
    assert_eq!(r.category, "performance");
    assert_eq!(r.confidence, 85);
    assert_eq!(r.summary, "Atlas system operating optimally. Signal quality: 100%, Processing load: 30%");
    assert_eq!(r.audio_patterns, vec!["scene_recall: scene.*recall|preset.*load|configuration.*change"]);
    assert!(r.hardware_recommendations.is_empty());
    assert!(r.configuration_issues.is_empty());
    assert!(r.audio_insights.is_empty());
}

#[test]
fn hot_inputs_and_slow_network_need_attention() {
    let doc = json!({
        "logs": [{"message": "Dante clock error on secondary"}, {"message": "Input clipping on ch 3"}],
        "metrics": {
            "inputLevels": {"3": -1.0, "4": -2.0},
            "outputLevels": {"main": -10.0},
            "networkLatency": 30,
            "cpuLoad": 50
        }
    });
    let outcome = AudioProcessorAnalyzer::new().analyze_document(&doc);
    let r = outcome.report().expect("report");
    // 100 - 15 - 15
    assert_eq!(r.performance_metrics.signal_quality, 70.0);
    assert_eq!(r.performance_metrics.network_stability, 75.0);
    assert_eq!(r.severity, AudioSeverity::Moderate);
    assert_eq!(r.summary, "Atlas system requires attention. Signal quality: 70%, Processing: 50%");
    assert_eq!(r.hardware_recommendations, vec!["Check Dante network configuration and switch settings"]);
    assert_eq!(
        r.configuration_issues,
        vec!["Review input gain structure - some signals may be too hot or too low"]
    );
    assert_eq!(r.audio_insights.len(), 2);
    assert!(r.audio_patterns.iter().any(|p| p.starts_with("dante_network:")));
    assert!(r.audio_patterns.iter().any(|p| p.starts_with("signal_clipping:")));
}

#[test]
fn overloaded_dsp_is_critical() {
    let doc = json!({"metrics": {"cpuLoad": 97, "networkLatency": 2}});
    let outcome = AudioProcessorAnalyzer::new().analyze_document(&doc);
    let r = outcome.report().expect("report");
    assert_eq!(r.severity, AudioSeverity::Critical);
    assert_eq!(r.summary, "CRITICAL: Atlas system issues detected. Immediate attention required.");
    assert_eq!(
        r.configuration_issues,
        vec!["Consider reducing DSP processing load or upgrading processor"]
    );
}

#[test]
fn empty_snapshot_scores_perfect() {
    let outcome = AudioProcessorAnalyzer::new().analyze_document(&json!({}));
    let r = outcome.report().expect("report");
    assert_eq!(r.severity, AudioSeverity::Optimal);
    assert_eq!(r.performance_metrics.signal_quality, 100.0);
    assert!(r.audio_patterns.is_empty());
}

#[test]
fn report_serializes_with_camel_case_keys() {
    let outcome = AudioProcessorAnalyzer::new().analyze_document(&json!({"metrics": {"cpuLoad": 80}}));
    let v = serde_json::to_value(&outcome).unwrap();
    assert_eq!(v["severity"], "minor");
    assert_eq!(v["performanceMetrics"]["processingLoad"], 80.0);
    assert!(v.get("hardwareRecommendations").is_some());
    assert!(v.get("audioInsights").is_some());
}

#[test]
fn failures_carry_prefix_and_zero_confidence() {
    let analyzer = AudioProcessorAnalyzer::new();

    let bad_text = analyzer.analyze_input("not json");
    let f = bad_text.failure().expect("failure");
    assert!(f.error.starts_with("Script execution failed: "));
    assert_eq!(f.severity, AudioSeverity::Critical);
    assert_eq!(f.confidence, 0);

    let bad_shape = analyzer.analyze_input(r#"{"metrics": {"inputLevels": {"1": "loud"}}}"#);
    let f = bad_shape.failure().expect("failure");
    assert!(f.error.starts_with("Atlas analysis failed: "));
    assert!(f.error.contains("inputLevels.1"));
}
