//! 可观测性模块集成测试
//!
//! 测试 metrics 记录函数和配置解析的核心功能。

mod metrics_tests {
    use reminder_shared::observability::metrics::{
        record_channel_send, record_deferred, record_notification, record_reminder_processed,
        set_worker_last_run,
    };

    #[test]
    fn test_record_notification() {
        record_notification("success", 0.05);
        record_notification("partial", 0.12);
        record_notification("failed", 0.30);
        record_notification("deferred", 0.0);
    }

    #[test]
    fn test_record_channel_send() {
        for channel in ["EMAIL", "SMS", "PUSH", "CALL"] {
            record_channel_send(channel, "success");
            record_channel_send(channel, "failed");
        }
    }

    #[test]
    fn test_record_processor_metrics() {
        record_deferred();
        record_reminder_processed("sent");
        record_reminder_processed("skipped");
        set_worker_last_run("reminder_worker");
    }
}

mod config_tests {
    use reminder_shared::observability::ObservabilityConfig;

    #[test]
    fn test_deserialize_partial_config_uses_defaults() {
        let config: ObservabilityConfig =
            serde_json::from_str(r#"{"log_level": "debug", "json_logs": true}"#)
                .expect("反序列化可观测性配置失败");

        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
        assert!(config.metrics_enabled);
        assert_eq!(config.metrics_port, 9090);
        assert_eq!(config.service_name, "unknown-service");
    }
}
