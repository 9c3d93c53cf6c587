use super::*;

fn entry(message: &str, level: Level, service: &str) -> LogEntry {
    let mut fields = HashMap::new();
    fields.insert("service".to_string(), service.to_string());
    LogEntry {
        timestamp_ns: 1,
        level,
        message: message.to_string(),
        source: "test.log".to_string(),
        agent_id: "agent-1".to_string(),
        fields,
    }
}

#[test]
fn dedup_key_excludes_timestamp() {
    let mut a = entry("boom", Level::Error, "payments");
    let mut b = a.clone();
    a.timestamp_ns = 1;
    b.timestamp_ns = 2;
    assert_eq!(a.dedup_key(), b.dedup_key());
}

#[test]
fn dedup_key_differs_on_message() {
    let a = entry("boom", Level::Error, "payments");
    let b = entry("bang", Level::Error, "payments");
    assert_ne!(a.dedup_key(), b.dedup_key());
}

#[test]
fn base_rate_defaults_to_one() {
    let policy = SamplingPolicy::default();
    assert_eq!(policy.rate_for(Level::Info, "anything"), 1.0);
}

#[test]
fn content_rule_overrides_base_rate() {
    let mut policy = SamplingPolicy {
        base_rates: HashMap::from([("ERROR".to_string(), 0.0)]),
        content_rules: vec![ContentRule {
            pattern: "payment".to_string(),
            rate: 1.0,
        }],
    };
    policy.base_rates.insert("ERROR".to_string(), 0.0);
    assert_eq!(policy.rate_for(Level::Error, "payment failed"), 1.0);
    assert_eq!(policy.rate_for(Level::Error, "unrelated"), 0.0);
}

#[test]
fn first_matching_content_rule_wins() {
    let policy = SamplingPolicy {
        base_rates: HashMap::new(),
        content_rules: vec![
            ContentRule {
                pattern: "order".to_string(),
                rate: 0.5,
            },
            ContentRule {
                pattern: "order-urgent".to_string(),
                rate: 1.0,
            },
        ],
    };
    assert_eq!(policy.rate_for(Level::Info, "order-urgent shipped"), 0.5);
}

#[test]
fn config_document_rejects_out_of_range_rate() {
    let yaml = "sampling:\n  base_rates:\n    ERROR: 1.5\n";
    let err = ConfigDocument::parse(yaml.as_bytes()).unwrap_err();
    assert_eq!(err.code(), crate::ErrorCode::InvalidRate);
}

#[test]
fn config_document_parses_full_shape() {
    let yaml = r#"
agent_settings:
  poll_interval_secs: 30
  batch_size_kb: 32
  batch_window_secs: 5
sampling:
  base_rates:
    ERROR: 1.0
    INFO: 0.1
  content_rules:
    - pattern: payment
      rate: 1.0
"#;
    let doc = ConfigDocument::parse(yaml.as_bytes()).unwrap();
    assert_eq!(doc.agent_settings.poll_interval_secs, 30);
    assert_eq!(doc.sampling.base_rates["INFO"], 0.1);
    assert_eq!(doc.sampling.content_rules[0].pattern, "payment");
}

#[test]
fn content_hash_is_eight_bytes_hex() {
    let hash = ConfigDocument::content_hash(b"hello");
    assert_eq!(hash.len(), 16);
}

#[test]
fn content_hash_changes_with_content() {
    let a = ConfigDocument::content_hash(b"hello");
    let b = ConfigDocument::content_hash(b"world");
    assert_ne!(a, b);
}
