use serde::Serialize;
use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("STOCKPOS_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// How command results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

/// The JSON envelope for a successful command
pub fn success_envelope<T: Serialize>(command: &str, data: T) -> serde_json::Result<serde_json::Value> {
    Ok(serde_json::json!({
        "ok": true,
        "command": command,
        "data": serde_json::to_value(data)?,
    }))
}

/// The JSON envelope for a failed command
pub fn error_envelope(command: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "ok": false,
        "command": command,
        "error": message,
    })
}

/// Print a command's data as a JSON envelope (no-op in human mode)
pub fn emit_success<T: Serialize>(mode: OutputMode, command: &str, data: T) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", serde_json::to_string_pretty(&success_envelope(command, data)?)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes() {
        let ok = success_envelope("stats", serde_json::json!({"products": 2})).unwrap();
        assert_eq!(ok["ok"], true);
        assert_eq!(ok["data"]["products"], 2);

        let err = error_envelope("checkout", "Your cart is empty");
        assert_eq!(err["ok"], false);
        assert_eq!(err["error"], "Your cart is empty");
    }

    #[test]
    fn test_output_mode() {
        assert!(OutputMode::from_flag(false).is_human());
        assert_eq!(OutputMode::from_flag(true), OutputMode::Json);
    }
}
