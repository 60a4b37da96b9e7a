//! Delegated health readings from an external probe process.
//!
//! The probe is a capability behind the `HealthProbe` trait; the shipped
//! adapter runs a configured command and parses one JSON object from its
//! stdout. Tests inject fakes instead of spawning anything.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Fixed response when the probe payload is not valid JSON.
pub const INVALID_FORMAT_RESPONSE: &str =
    "Error: invalid health data format received from probe.";

/// Fixed response when the probe payload is empty or null.
pub const NO_DATA_RESPONSE: &str = "Error: no valid health data received.";

/// One temperature reading pair from the probe, in both units.
///
/// Field names on the wire are the probe's contract and keep their
/// original capitalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReading {
    #[serde(rename = "ambient_temp_C")]
    pub ambient_temp_c: f64,
    #[serde(rename = "ambient_temp_F")]
    pub ambient_temp_f: f64,
    #[serde(rename = "forehead_temp_C")]
    pub forehead_temp_c: f64,
    #[serde(rename = "forehead_temp_F")]
    pub forehead_temp_f: f64,
}

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe launch failed: {0}")]
    Launch(String),

    #[error("probe exited with status {0}")]
    Failed(i32),

    #[error("probe timed out after {0} seconds")]
    Timeout(u64),

    #[error("probe output is not valid JSON")]
    InvalidFormat,

    #[error("probe returned no data")]
    NoData,
}

/// Source of health readings.
pub trait HealthProbe: Send + Sync {
    fn read(&self) -> Result<HealthReading, ProbeError>;
}

/// Adapter that runs an external command and parses its stdout.
pub struct CommandProbe {
    command: Vec<String>,
    timeout: Duration,
}

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

impl CommandProbe {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }
}

impl HealthProbe for CommandProbe {
    fn read(&self) -> Result<HealthReading, ProbeError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| ProbeError::Launch("probe command is empty".to_string()))?;

        debug!("Running health probe: {} {:?}", program, args);

        let mut child = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ProbeError::Launch(e.to_string()))?;

        // Drain stdout on a separate thread so a chatty probe cannot
        // deadlock against a full pipe while we wait for it to exit.
        let mut stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| ProbeError::Launch("probe stdout unavailable".to_string()))?;
        let reader = thread::spawn(move || {
            let mut buf = String::new();
            stdout_pipe.read_to_string(&mut buf).map(|_| buf)
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = reader.join();
                        return Err(ProbeError::Timeout(self.timeout.as_secs()));
                    }
                    thread::sleep(WAIT_POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = reader.join();
                    return Err(ProbeError::Launch(e.to_string()));
                }
            }
        };

        let stdout = reader
            .join()
            .map_err(|_| ProbeError::Launch("probe reader thread panicked".to_string()))?
            .map_err(|e| ProbeError::Launch(e.to_string()))?;

        if !status.success() {
            return Err(ProbeError::Failed(status.code().unwrap_or(-1)));
        }

        parse_reading(&stdout)
    }
}

/// Parse the probe payload. Null or empty payloads are reported distinctly
/// from syntactically or structurally invalid ones.
pub fn parse_reading(stdout: &str) -> Result<HealthReading, ProbeError> {
    let value: serde_json::Value =
        serde_json::from_str(stdout.trim()).map_err(|_| ProbeError::InvalidFormat)?;

    match &value {
        serde_json::Value::Null => return Err(ProbeError::NoData),
        serde_json::Value::Object(map) if map.is_empty() => return Err(ProbeError::NoData),
        _ => {}
    }

    serde_json::from_value(value).map_err(|_| ProbeError::InvalidFormat)
}

/// Human-readable summary of a successful reading.
pub fn format_reading(reading: &HealthReading) -> String {
    format!(
        "Health Check\n{}\nAmbient temp: {}°C ({}°F)\nForehead temp: {}°C ({}°F)",
        "=".repeat(12),
        reading.ambient_temp_c,
        reading.ambient_temp_f,
        reading.forehead_temp_c,
        reading.forehead_temp_f
    )
}

/// Map every probe failure to its user-visible string.
pub fn error_response(err: &ProbeError) -> String {
    match err {
        ProbeError::InvalidFormat => INVALID_FORMAT_RESPONSE.to_string(),
        ProbeError::NoData => NO_DATA_RESPONSE.to_string(),
        other => format!("Error checking health: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_PAYLOAD: &str = r#"{"ambient_temp_C": 22.5, "ambient_temp_F": 72.5,
        "forehead_temp_C": 36.6, "forehead_temp_F": 97.9}"#;

    fn echo_probe(payload: &str) -> CommandProbe {
        CommandProbe::new(
            vec!["echo".to_string(), payload.to_string()],
            Duration::from_secs(5),
        )
    }

    #[test]
    fn reads_valid_payload() {
        let reading = echo_probe(GOOD_PAYLOAD).read().unwrap();
        assert_eq!(reading.ambient_temp_c, 22.5);
        assert_eq!(reading.forehead_temp_f, 97.9);
    }

    #[test]
    fn garbage_payload_is_invalid_format() {
        let err = echo_probe("sensor offline").read().unwrap_err();
        assert!(matches!(err, ProbeError::InvalidFormat));
    }

    #[test]
    fn missing_fields_are_invalid_format() {
        let err = echo_probe(r#"{"ambient_temp_C": 22.5}"#).read().unwrap_err();
        assert!(matches!(err, ProbeError::InvalidFormat));
    }

    #[test]
    fn null_payload_is_no_data() {
        let err = echo_probe("null").read().unwrap_err();
        assert!(matches!(err, ProbeError::NoData));
    }

    #[test]
    fn empty_object_is_no_data() {
        let err = echo_probe("{}").read().unwrap_err();
        assert!(matches!(err, ProbeError::NoData));
    }

    #[test]
    fn unlaunchable_command_fails() {
        let probe = CommandProbe::new(
            vec!["mimir-no-such-probe-binary".to_string()],
            Duration::from_secs(1),
        );
        assert!(matches!(probe.read().unwrap_err(), ProbeError::Launch(_)));
    }

    #[test]
    fn empty_command_fails() {
        let probe = CommandProbe::new(vec![], Duration::from_secs(1));
        assert!(matches!(probe.read().unwrap_err(), ProbeError::Launch(_)));
    }

    #[test]
    fn nonzero_exit_fails() {
        let probe = CommandProbe::new(vec!["false".to_string()], Duration::from_secs(5));
        assert!(matches!(probe.read().unwrap_err(), ProbeError::Failed(_)));
    }

    #[test]
    fn slow_probe_times_out() {
        let probe = CommandProbe::new(
            vec!["sleep".to_string(), "5".to_string()],
            Duration::from_millis(200),
        );
        assert!(matches!(probe.read().unwrap_err(), ProbeError::Timeout(_)));
    }

    #[test]
    fn error_strings_match_contract() {
        assert_eq!(
            error_response(&ProbeError::InvalidFormat),
            INVALID_FORMAT_RESPONSE
        );
        assert_eq!(error_response(&ProbeError::NoData), NO_DATA_RESPONSE);
        assert!(error_response(&ProbeError::Timeout(10)).starts_with("Error checking health:"));
    }

    #[test]
    fn reading_formats_both_units() {
        let reading = HealthReading {
            ambient_temp_c: 22.5,
            ambient_temp_f: 72.5,
            forehead_temp_c: 36.6,
            forehead_temp_f: 97.9,
        };
        let summary = format_reading(&reading);
        assert!(summary.contains("22.5°C (72.5°F)"));
        assert!(summary.contains("36.6°C (97.9°F)"));
    }
}
