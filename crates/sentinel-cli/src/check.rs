//! `sentinel config check`: validate the environment and monitor file.

use sentinel_core::{AppConfig, MonitorFile};
use sentinel_detect::Detector;

use crate::scan::thresholds;

/// Load and validate the monitor file, then print what a scan would use.
///
/// # Errors
///
/// Returns an error if the monitor file is missing, malformed or invalid.
pub(crate) fn run_config_check(config: &AppConfig) -> anyhow::Result<()> {
    let monitor = sentinel_core::load_monitor(&config.monitor_path)?;
    print!("{}", render_summary(config, &monitor));
    Ok(())
}

pub(crate) fn render_summary(config: &AppConfig, monitor: &MonitorFile) -> String {
    let detector = Detector::new(&monitor.patterns, &monitor.stale, thresholds(config));
    let vocab = detector.vocabulary();
    let degraded: Vec<&str> = vocab.degraded_terms().collect();

    let mut out = format!("monitor file: {}\n", config.monitor_path.display());
    out.push_str(&format!(
        "  sources:   {} ({})\n",
        monitor.nodes.len(),
        monitor.nodes.join(", ")
    ));
    out.push_str(&format!("  incidents: {}\n", vocab.incidents().len()));
    out.push_str(&format!("  locations: {}\n", vocab.locations().len()));
    out.push_str(&format!("  statuses:  {}\n", vocab.statuses().len()));
    if !degraded.is_empty() {
        out.push_str(&format!("  substring-matched terms: {}\n", degraded.join(", ")));
    }
    match monitor.stale.current_month {
        Some(m) => {
            let name = monitor
                .stale
                .months
                .get(usize::from(m).saturating_sub(1))
                .map_or("?", String::as_str);
            out.push_str(&format!("  current month: {m} ({name})\n"));
        }
        None => out.push_str("  current month: unset (month filter off)\n"),
    }
    let t = detector.thresholds();
    out.push_str(&format!(
        "thresholds: count >= {} and count > {} x baseline (default rate {}/hr)\n",
        t.min_count, t.multiplier, t.default_rate
    ));
    out.push_str(&format!("state file: {}\n", config.state_path.display()));
    out.push_str(&format!(
        "baselines: {}{}\n",
        config.baseline_path.display(),
        config
            .baseline_url
            .as_deref()
            .map(|u| format!(" (remote {u})"))
            .unwrap_or_default()
    ));
    out.push_str(if config.notifications_enabled() {
        "notifications: telegram\n"
    } else {
        "notifications: log only\n"
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_vocabulary_and_month() {
        let monitor = sentinel_core::parse_monitor(
            r"
nodes: [VahidOnline, Tasnimnews]
patterns:
  incidents: [انفجار, آتش‌سوزی]
  locations: [تهران]
  status: [قطعی]
stale:
  current_month: 2
",
        )
        .unwrap();
        let config = crate::tests::test_config();
        let out = render_summary(&config, &monitor);
        assert!(out.contains("sources:   2 (VahidOnline, Tasnimnews)"));
        assert!(out.contains("incidents: 2"));
        assert!(out.contains("statuses:  1"));
        assert!(out.contains("current month: 2 (اردیبهشت)"));
        assert!(out.contains("notifications: log only"));
    }

    #[test]
    fn summary_prints_one_setting_per_line() {
        let monitor = sentinel_core::parse_monitor("nodes: [a]").unwrap();
        let config = crate::tests::test_config();
        let out = render_summary(&config, &monitor);
        assert_eq!(out.lines().count(), 10);
        assert!(out.ends_with("notifications: log only\n"));
        assert!(out.contains("current month: unset (month filter off)\n"));
        assert!(out.contains("baselines: ./data/trend_baselines.json\n"));
    }

    #[test]
    fn terms_colliding_after_normalization_fail_the_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentinel.yaml");
        std::fs::write(
            &path,
            "nodes: [a]\npatterns:\n  incidents: [\u{0643}رج]\n  locations: [\u{06A9}رج]\n",
        )
        .unwrap();
        let mut config = crate::tests::test_config();
        config.monitor_path = path;
        let err = run_config_check(&config).unwrap_err();
        assert!(err.to_string().contains("appears in both"), "got {err}");
    }

    #[test]
    fn missing_monitor_file_is_an_error() {
        let mut config = crate::tests::test_config();
        config.monitor_path = "/nonexistent/sentinel.yaml".into();
        assert!(run_config_check(&config).is_err());
    }
}
