use complaint_triage::{
    estimate_urgency, train, TriagePipeline, UrgencyConfig, UrgencyEstimator, UrgencyLevel,
};
use std::thread;

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}

fn setup_pipeline() -> TriagePipeline {
    init_logging();
    let classifier = train(vec![
        ("AC not working in room 12", "Maintenance"),
        ("Wifi is too slow", "IT"),
        ("No water since morning", "Maintenance"),
    ])
    .expect("Failed to train classifier");
    TriagePipeline::new(classifier)
}

#[test]
fn test_end_to_end_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = setup_pipeline();
    let result = pipeline.triage("No water since morning, emergency");
    assert_eq!(result.category, "Maintenance");
    assert_eq!(result.urgency, UrgencyLevel::High);
    Ok(())
}

#[test]
fn test_empty_text() {
    let pipeline = setup_pipeline();
    let result = pipeline.triage("");
    assert_eq!(result.category, "Maintenance");
    assert_eq!(result.urgency, UrgencyLevel::Low);
}

#[test]
fn test_critical_phrase_overrides_positive_sentiment() {
    assert_eq!(
        estimate_urgency("Great hostel, wonderful staff, but the geyser is broken"),
        UrgencyLevel::High
    );
    assert_eq!(estimate_urgency("Electricity bill is TOO HIGH"), UrgencyLevel::High);
}

#[test]
fn test_sentiment_thresholds_are_strict() {
    // Polarity exactly -0.4 is not below -0.4.
    assert_eq!(estimate_urgency("poor"), UrgencyLevel::Medium);
    assert_eq!(estimate_urgency("The food is terrible"), UrgencyLevel::High);
    assert_eq!(estimate_urgency("The corridor is noisy"), UrgencyLevel::Medium);
    assert_eq!(estimate_urgency("Room 12 fan"), UrgencyLevel::Low);
    assert_eq!(estimate_urgency("The staff is friendly"), UrgencyLevel::Low);
}

#[test]
fn test_urgency_ignores_normalization() {
    // "no" is a stopword and would be stripped by normalization.
    let pipeline = setup_pipeline();
    let report = pipeline.triage_detailed("no electricity in block A");
    assert!(!report.normalized.contains("no "));
    assert_eq!(report.urgency.level, UrgencyLevel::High);
    assert_eq!(report.urgency.trigger.as_deref(), Some("no electricity"));
}

#[test]
fn test_custom_urgency_estimator() -> Result<(), Box<dyn std::error::Error>> {
    let estimator = UrgencyEstimator::new(&UrgencyConfig {
        critical_phrases: vec!["fire".to_string()],
        ..UrgencyConfig::default()
    })?;
    let pipeline = setup_pipeline().with_urgency_estimator(estimator);

    assert_eq!(pipeline.triage("There is a fire near the lab").urgency, UrgencyLevel::High);
    // The default phrases are replaced, so only sentiment applies here.
    assert_eq!(pipeline.triage("AC not working").urgency, UrgencyLevel::Medium);
    Ok(())
}

#[test]
fn test_invalid_urgency_config() {
    let inverted = UrgencyEstimator::new(&UrgencyConfig {
        high_below: 0.0,
        medium_below: -0.4,
        ..UrgencyConfig::default()
    });
    assert!(inverted.is_err());

    let blank = UrgencyEstimator::new(&UrgencyConfig {
        critical_phrases: vec!["  ".to_string()],
        ..UrgencyConfig::default()
    });
    assert!(blank.is_err());
}

#[test]
fn test_json_rendering() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = setup_pipeline();
    let json = serde_json::to_value(pipeline.triage("Wifi is too slow"))?;
    assert_eq!(json["category"], "IT");
    assert_eq!(json["urgency"], "Medium");
    Ok(())
}

#[test]
fn test_concurrent_triage_matches_sequential() {
    let pipeline = setup_pipeline();
    let texts = [
        "No water since morning",
        "Wifi is too slow",
        "",
        "The AC is very bad",
        "Thanks, the fan works fine now",
    ];
    let expected: Vec<_> = texts.iter().map(|text| pipeline.triage(text)).collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            thread::spawn(move || texts.iter().map(|text| pipeline.triage(text)).collect::<Vec<_>>())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
