//! Full configuration validation.
//!
//! Validates numeric ranges and URL shape, collecting every error into a
//! single `ConfigError`.

mod helpers;


use crate::schema::PanelineConfig;
use paneline_common::ConfigError;

use helpers::validate_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PanelineConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_transport(&mut errors, config);
    validate_dialog(&mut errors, config);
    validate_handshake(&mut errors, config);
    validate_store(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_transport(errors: &mut Vec<String>, config: &PanelineConfig) {
    let base_url = config.transport.base_url.trim();
    if base_url.is_empty() {
        errors.push("transport.base_url must not be empty".into());
    } else if base_url.contains('?') || base_url.contains('#') {
        errors.push(format!(
            "transport.base_url = {base_url} must not carry a query or fragment"
        ));
    }
    validate_range(
        errors,
        "transport.inline_threshold",
        config.transport.inline_threshold,
        256,
        65536,
    );
}

fn validate_dialog(errors: &mut Vec<String>, config: &PanelineConfig) {
    validate_range(
        errors,
        "dialog.height_percent",
        config.dialog.height_percent,
        1,
        100,
    );
    validate_range(
        errors,
        "dialog.width_percent",
        config.dialog.width_percent,
        1,
        100,
    );
}

fn validate_handshake(errors: &mut Vec<String>, config: &PanelineConfig) {
    validate_range(
        errors,
        "handshake.ready_timeout_ms",
        config.handshake.ready_timeout_ms,
        100,
        120_000,
    );
}

fn validate_store(errors: &mut Vec<String>, config: &PanelineConfig) {
    validate_range(
        errors,
        "store.max_age_secs",
        config.store.max_age_secs,
        10,
        86_400,
    );
}
