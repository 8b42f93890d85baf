//! Delimited-text snapshot of the current history

use crate::domain::HistoryBook;
use crate::shared::types::MonitorConfig;

/// One header row, then one row per tracked instrument carrying its
/// latest value, trend label, and RFC3339 timestamp. Text fields are
/// double-quoted. Instruments with no history yet are skipped.
pub fn export_snapshot(config: &MonitorConfig, history: &HistoryBook) -> String {
    let mut out = String::from("\"instrument\",\"last\",\"trend\",\"updated\"\n");

    for instrument in &config.instruments {
        let latest = match history.latest(instrument) {
            Some(latest) => latest,
            None => continue,
        };
        out.push_str(&format!(
            "\"{}\",{},\"{}\",\"{}\"\n",
            instrument,
            latest.value,
            history.trend(instrument).as_str(),
            latest.time.to_rfc3339(),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HistoryEntry;
    use crate::shared::types::Sample;

    fn entry(value: f64) -> HistoryEntry {
        HistoryEntry::from(&Sample::new("x", value))
    }

    #[test]
    fn test_export_header_plus_one_row_per_instrument() {
        let mut config = MonitorConfig::default();
        config.instruments = vec!["BTC_USDT".to_string(), "ETH_USDT".to_string()];

        let mut history = HistoryBook::new(50);
        history.append("BTC_USDT", entry(64000.0));
        history.append("BTC_USDT", entry(64100.0));
        history.append("ETH_USDT", entry(3000.0));

        let csv = export_snapshot(&config, &history);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "\"instrument\",\"last\",\"trend\",\"updated\"");
        assert!(lines[1].starts_with("\"BTC_USDT\",64100,"));
        assert!(lines[1].contains("\"insufficient data\""));
        assert!(lines[2].starts_with("\"ETH_USDT\",3000,"));
    }

    #[test]
    fn test_export_skips_instruments_without_history() {
        let mut config = MonitorConfig::default();
        config.instruments = vec!["BTC_USDT".to_string(), "ETH_USDT".to_string()];

        let mut history = HistoryBook::new(50);
        history.append("BTC_USDT", entry(64000.0));

        let csv = export_snapshot(&config, &history);
        assert_eq!(csv.lines().count(), 2);
    }
}
