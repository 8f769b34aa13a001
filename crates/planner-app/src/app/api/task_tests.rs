//! Unit tests for task payload validation.

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::app::api::task::{TaskPayload, validate_payload};
    use crate::app::api::tasks::parse_limit;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date")
    }

    fn payload(date: &str, repeat: &str) -> TaskPayload {
        TaskPayload {
            id: String::new(),
            date: date.to_string(),
            title: "a task".to_string(),
            comment: String::new(),
            repeat: repeat.to_string(),
        }
    }

    #[test]
    fn title_is_required() {
        let mut p = payload("20240120", "");
        p.title = String::new();

        let err = validate_payload(&mut p, today()).expect_err("missing title");
        assert!(err.contains("title"));
    }

    #[test]
    fn new_task_without_date_defaults_to_today() {
        let mut p = payload("", "");

        validate_payload(&mut p, today()).expect("valid payload");
        assert_eq!(p.date, "20240115");
    }

    #[test]
    fn update_without_date_keeps_it_empty() {
        let mut p = payload("", "");
        p.id = "7".to_string();

        validate_payload(&mut p, today()).expect("valid payload");
        assert_eq!(p.date, "");
    }

    #[test]
    fn future_date_is_left_alone() {
        let mut p = payload("20240220", "");

        validate_payload(&mut p, today()).expect("valid payload");
        assert_eq!(p.date, "20240220");
    }

    #[test]
    fn past_date_without_rule_moves_to_today() {
        let mut p = payload("20240101", "");

        validate_payload(&mut p, today()).expect("valid payload");
        assert_eq!(p.date, "20240115");
    }

    #[test]
    fn past_date_with_rule_moves_to_next_occurrence() {
        // 10 -> 13 -> 16, first date after the 15th
        let mut p = payload("20240110", "d 3");

        validate_payload(&mut p, today()).expect("valid payload");
        assert_eq!(p.date, "20240116");
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut p = payload("15.01.2024", "");

        validate_payload(&mut p, today()).expect_err("bad date format");
    }

    #[test]
    fn past_date_with_bad_rule_is_rejected() {
        let mut p = payload("20240101", "k 3");

        let err = validate_payload(&mut p, today()).expect_err("bad rule");
        assert!(err.contains("next date"));
    }

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(parse_limit(None), 50);
        assert_eq!(parse_limit(Some("10")), 10);
        assert_eq!(parse_limit(Some("1000")), 100);
        assert_eq!(parse_limit(Some("0")), 50);
        assert_eq!(parse_limit(Some("-3")), 50);
        assert_eq!(parse_limit(Some("ten")), 50);
    }
}
