//! Human-readable error descriptions and structured JSON error formatting.

use tank_core::error::{BuildError, TankError};

/// First error of type `T` anywhere in the report's chain.
fn find<T: std::error::Error + 'static>(err: &eyre::Report) -> Option<&T> {
    err.chain().find_map(|e| e.downcast_ref::<T>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = find::<BuildError>(err) {
        return match be {
            BuildError::MissingDirectory => {
                "What happened: No device directory was given to the engine.\nLikely causes: The host did not call with_directory(...).\nHow to fix: Provide the construct before build().".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid engine configuration ({msg}).\nLikely causes: Out-of-range values in the [engine] table.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(te) = find::<TankError>(err) {
        return match te {
            TankError::Detached(name) => format!(
                "What happened: Device '{name}' stopped answering during a tick.\nLikely causes: The block was removed, destroyed or disconnected from the construct.\nHow to fix: Reattach or rebuild it, then restart so discovery runs again."
            ),
            TankError::Device(msg) => format!(
                "What happened: A device rejected a read or write ({msg}).\nLikely causes: Non-finite command or a faulty device.\nHow to fix: Check the [engine] constants and the device; rerun with --log-level=debug."
            ),
            TankError::Config(msg) => format!(
                "What happened: {msg}.\nLikely causes: The lever script and the [[devices]] table disagree.\nHow to fix: Use hinge names exactly as listed by `tank discover`."
            ),
        };
    }

    // String-based heuristics for errors coming from config loading
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("lever script csv must have headers") {
        return "Invalid headers in lever script CSV. Expected 'tick,lever,angle_deg'.".to_string();
    }

    if lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid.\nDetails: {msg}\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read.\nDetails: {msg}\nHow to fix: Pass --config with the path to a TOML file."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 detached device, 4 device fault, 5 invalid setup; 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(te) = find::<TankError>(err) {
        return match te {
            TankError::Detached(_) => 3,
            TankError::Device(_) => 4,
            TankError::Config(_) => 5,
        };
    }
    if find::<BuildError>(err).is_some() {
        return 5;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(te) = find::<TankError>(err) {
        return match te {
            TankError::Detached(_) => "Detached",
            TankError::Device(_) => "Device",
            TankError::Config(_) => "Config",
        };
    }
    if find::<BuildError>(err).is_some() {
        return "Build";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "message": humanize(err),
        "exit_code": exit_code_for_error(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn detached_maps_through_context() {
        let err: eyre::Result<()> = Err(eyre::Report::new(TankError::Detached(
            "Tank Drive Left".into(),
        )));
        let err = err.wrap_err("command 'Tank Drive Left'").unwrap_err();
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("'Tank Drive Left' stopped answering"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Detached");
    }

    #[test]
    fn untyped_errors_fall_back() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).starts_with("Something went wrong."));
    }
}
