use std::env;
use std::sync::{Mutex, OnceLock};

use maitred_cli::commands::{chat, config, doctor};
use serde_json::Value;

#[test]
fn doctor_json_reports_pass_with_valid_env() {
    with_env(
        &[
            ("MAITRED_LLM_API_KEY", "sk-test"),
            ("MAITRED_DATABASE_URL", "sqlite::memory:"),
        ],
        || {
            let report = parse_payload(&doctor::run(true));
            assert_eq!(report["overall_status"], "pass");

            let checks = report["checks"].as_array().expect("checks should be an array");
            assert_eq!(checks.len(), 3);
            assert_eq!(checks[0]["name"], "config_validation");
            assert_eq!(checks[1]["name"], "llm_credential_readiness");
            assert_eq!(checks[2]["name"], "database_connectivity");
            for check in checks {
                assert_eq!(check["status"], "pass");
            }
        },
    );
}

#[test]
fn doctor_json_reports_failure_and_skips_when_config_invalid() {
    with_env(&[], || {
        let report = parse_payload(&doctor::run(true));
        assert_eq!(report["overall_status"], "fail");

        let checks = report["checks"].as_array().expect("checks should be an array");
        assert_eq!(checks[0]["name"], "config_validation");
        assert_eq!(checks[0]["status"], "fail");
        assert_eq!(checks[1]["status"], "skipped");
        assert_eq!(checks[2]["status"], "skipped");
    });
}

#[test]
fn config_redacts_the_api_key() {
    with_env(&[("MAITRED_LLM_API_KEY", "sk-secret-cli-value")], || {
        let output = config::run();

        assert!(output.contains("llm.api_key = <redacted> (source: env (MAITRED_LLM_API_KEY))"));
        assert!(!output.contains("sk-secret-cli-value"));
    });
}

#[test]
fn config_surfaces_validation_failure() {
    with_env(&[], || {
        let output = config::run();
        assert!(output.starts_with("config validation failed:"));
        assert!(output.contains("llm.api_key"));
    });
}

#[test]
fn chat_returns_config_failure_envelope_without_credentials() {
    with_env(&[], || {
        let result = chat::run("hello", None, None, None);
        assert_eq!(result.exit_code, 1, "expected config failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "chat");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config");
    });
}

#[test]
fn chat_handles_a_payment_turn_without_the_model() {
    with_env(
        &[
            ("MAITRED_LLM_API_KEY", "sk-test"),
            ("MAITRED_DATABASE_URL", "sqlite::memory:?cache=shared"),
            ("MAITRED_DATABASE_MAX_CONNECTIONS", "1"),
        ],
        || {
            let result = chat::run(
                "I want to pay 1000 for table 5 by card",
                Some("conv-cli-test".to_string()),
                Some("u-cli".to_string()),
                None,
            );
            assert_eq!(result.exit_code, 0, "expected successful payment turn");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "chat");
            assert_eq!(payload["status"], "ok");
            assert_eq!(payload["conversation_id"], "conv-cli-test");

            let response = payload["response"].as_str().unwrap_or("");
            assert!(response.contains("1000 DZD"));
            assert!(response.contains("table T-5"));
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "MAITRED_DATABASE_URL",
        "MAITRED_DATABASE_MAX_CONNECTIONS",
        "MAITRED_DATABASE_TIMEOUT_SECS",
        "MAITRED_LLM_API_KEY",
        "MAITRED_LLM_BASE_URL",
        "MAITRED_LLM_MODEL",
        "MAITRED_LLM_TIMEOUT_SECS",
        "MAITRED_LLM_TEMPERATURE",
        "MAITRED_SERVER_BIND_ADDRESS",
        "MAITRED_SERVER_PORT",
        "MAITRED_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "MAITRED_LOGGING_LEVEL",
        "MAITRED_LOGGING_FORMAT",
        "MAITRED_LOG_LEVEL",
        "MAITRED_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
