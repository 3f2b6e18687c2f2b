use super::FileReport;
use crate::errors::Result;

/// A single report renders as an object, several as an array.
pub fn render(reports: &[FileReport]) -> Result<String> {
    let json = match reports {
        [single] => serde_json::to_string_pretty(single)?,
        _ => serde_json::to_string_pretty(reports)?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use std::path::PathBuf;

    fn report(code: &str) -> FileReport {
        FileReport {
            path: PathBuf::from("snippet.js"),
            result: analyze(code, None),
            learner: None,
        }
    }

    #[test]
    fn test_single_report_is_object() {
        let json = render(&[report("var x = 1;")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["path"], "snippet.js");
        assert_eq!(value["detections"][0]["topicSlug"], "var-hoisting");
        assert_eq!(value["detections"][0]["source"], "native-detector");
        assert_eq!(value["tree"]["dialect"], "javascript");
        assert!(value.get("learner").is_none());
    }

    #[test]
    fn test_many_reports_are_array() {
        let json = render(&[report("let a = 1;"), report("var b;")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }
}
