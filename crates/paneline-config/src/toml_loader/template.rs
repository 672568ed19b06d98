//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Paneline Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[transport]
# base_url = "https://localhost:3000/dialog.html"
# inline_threshold = 2048     # bytes, 256-65536; larger payloads are staged

[dialog]
# height_percent = 60         # 1-100
# width_percent = 40          # 1-100
# display_in_iframe = false

[handshake]
# ready_timeout_ms = 10000    # 100-120000
# repeat_ready = "resend"     # "resend" | "ignore"

[store]
# backend = "memory"          # "memory" | "file"
# directory = ""              # file backend; empty = platform data dir
# max_age_secs = 300          # 10-86400

[logging]
# level = "info"              # trace | debug | info | warn | error
"##
    .to_string()
}
