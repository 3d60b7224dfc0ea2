//! Central/corner selection

use alerting::{AlertEvent, Severity};

/// What to render: at most one central alert, the rest in the corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    /// Corner alerts, newest first.
    pub corner: Vec<AlertEvent>,
    /// The single center-slot alert.
    pub central: Option<AlertEvent>,
}

/// Select the presentation for the currently visible alerts (newest
/// first).
///
/// Info alerts always go to the corner. Warning/alert/critical compete for
/// the central slot: if any critical is present, the most recent critical
/// wins and the remaining center-class alerts are demoted to the corner so
/// they stay visible without displacing the critical message.
pub fn select(visible: &[AlertEvent]) -> Presentation {
    let mut corner: Vec<AlertEvent> = Vec::new();
    let mut center_class: Vec<AlertEvent> = Vec::new();

    for alert in visible {
        if alert.severity.is_center_class() {
            center_class.push(alert.clone());
        } else {
            corner.push(alert.clone());
        }
    }

    let has_critical = center_class
        .iter()
        .any(|a| a.severity == Severity::Critical);

    let central = if has_critical {
        let critical = center_class
            .iter()
            .find(|a| a.severity == Severity::Critical)
            .cloned();
        corner.extend(
            center_class
                .into_iter()
                .filter(|a| a.severity != Severity::Critical),
        );
        critical
    } else {
        center_class.first().cloned()
    };

    Presentation { corner, central }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(message: &str, severity: Severity, ts: u64) -> AlertEvent {
        AlertEvent::new(message, severity, false, ts)
    }

    #[test]
    fn test_info_goes_to_corner() {
        let visible = vec![alert("Break started", Severity::Info, 3_000)];
        let pres = select(&visible);
        assert!(pres.central.is_none());
        assert_eq!(pres.corner.len(), 1);
    }

    #[test]
    fn test_most_recent_critical_wins_center() {
        // newest first
        let visible = vec![
            alert("newer critical", Severity::Critical, 3_000),
            alert("older critical", Severity::Critical, 2_000),
            alert("warning", Severity::Warning, 1_000),
        ];
        let pres = select(&visible);
        assert_eq!(pres.central.unwrap().message, "newer critical");
    }

    #[test]
    fn test_critical_demotes_warning_to_corner() {
        let visible = vec![
            alert("critical", Severity::Critical, 3_000),
            alert("warning", Severity::Warning, 2_000),
            alert("info", Severity::Info, 1_000),
        ];
        let pres = select(&visible);
        assert_eq!(pres.central.as_ref().unwrap().message, "critical");
        // warning is relocated, not dropped
        let corner: Vec<_> = pres.corner.iter().map(|a| a.message.as_str()).collect();
        assert!(corner.contains(&"warning"));
        assert!(corner.contains(&"info"));
    }

    #[test]
    fn test_warning_takes_center_without_critical() {
        let visible = vec![
            alert("warning", Severity::Warning, 2_000),
            alert("session alert", Severity::Alert, 1_000),
        ];
        let pres = select(&visible);
        assert_eq!(pres.central.unwrap().message, "warning");
        assert!(pres.corner.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(select(&[]), Presentation::default());
    }
}
