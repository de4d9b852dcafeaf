//! `show` and `metrics` handlers

use crate::config::PolarionConfig;
use crate::error::AppResult;
use crate::metrics::{definitions, format_measure, JsonMeasureStore, Measure, MeasureStore};

pub fn run_show(config: &PolarionConfig, json: bool) -> AppResult<()> {
    let store = JsonMeasureStore::new(config.measures_path.clone());
    let measures = store.load_measures()?;
    print!("{}", render_measures(&measures, json)?);
    Ok(())
}

pub fn render_measures(measures: &[Measure], json: bool) -> AppResult<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(measures)?));
    }
    if measures.is_empty() {
        return Ok("No measures recorded yet\n".to_string());
    }
    Ok(measures.iter().map(format_measure).collect())
}

pub fn run_metrics(json: bool) -> AppResult<()> {
    print!("{}", render_metrics(json)?);
    Ok(())
}

pub fn render_metrics(json: bool) -> AppResult<String> {
    let all = definitions::all();
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&all)?));
    }

    let mut out = String::new();
    for metric in all {
        out.push_str(&format!(
            "{:<16} {} ({}, domain {})\n",
            metric.key, metric.name, metric.description, metric.domain
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metrics_text() {
        let text = render_metrics(false).unwrap();
        assert!(text.contains("openIssues"));
        assert!(text.contains("Polarion Resolved Issues"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_render_metrics_json() {
        let json = render_metrics(true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["key"], "openIssues");
        assert_eq!(parsed[0]["value_type"], "INT");
        assert_eq!(parsed[1]["direction"], "none");
    }

    #[test]
    fn test_render_empty_measures() {
        assert_eq!(
            render_measures(&[], false).unwrap(),
            "No measures recorded yet\n"
        );
        assert_eq!(render_measures(&[], true).unwrap().trim(), "[]");
    }
}
