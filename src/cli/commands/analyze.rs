//! `analyze` and `check` handlers

use crate::config::{ConfigOverrides, PolarionConfig};
use crate::error::AppResult;
use crate::metrics::format_measure;
use crate::sensor::{PolarionSensor, RunReport};
use crate::soap::SoapConnector;
use tracing::info;

pub async fn run_analyze(mut config: PolarionConfig, overrides: ConfigOverrides) -> AppResult<()> {
    config.apply_overrides(&overrides);

    config.ensure_complete()?;

    let sensor = PolarionSensor::from_config(config)?;
    info!("Running {}", sensor);

    let report = sensor.analyse().await?;
    print!("{}", render_report(&report));
    Ok(())
}

pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    for measure in &report.measures {
        out.push_str(&format_measure(measure));
    }
    out
}

/// Validate configuration locally; the server is not contacted
pub fn run_check(config: &PolarionConfig) -> AppResult<()> {
    config.ensure_complete()?;
    SoapConnector::new(config.server_url(), config.timeout())?;

    println!("✅ Configuration is complete");
    println!("  Server:   {}", config.server_url());
    println!("  Project:  {}", config.fetch_project_id());
    println!("  Timeout:  {}s", config.timeout_secs);
    println!("  Measures: {}", config.measures_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, PolarionError};

    fn complete() -> PolarionConfig {
        PolarionConfig {
            server_url: Some("http://my.polarion.server".to_string()),
            fetch_project_id: Some("test".to_string()),
            username: Some("admin".to_string()),
            password: Some("adminPwd".to_string()),
            ..PolarionConfig::default()
        }
    }

    #[test]
    fn test_check_accepts_complete_config() {
        assert!(run_check(&complete()).is_ok());
    }

    #[test]
    fn test_check_reports_missing_parameters() {
        let mut config = complete();
        config.username = None;

        let err = run_check(&config).unwrap_err();
        let err = err.downcast_ref::<PolarionError>().unwrap();
        assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_check_rejects_malformed_url() {
        let mut config = complete();
        config.server_url = Some("my polarion".to_string());

        let err = run_check(&config).unwrap_err();
        let err = err.downcast_ref::<PolarionError>().unwrap();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_URL);
    }
}
