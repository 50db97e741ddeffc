use serde::Serialize;
use std::fmt;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite-preview-02-05";

/// Advertised limits of a selectable model. Informational only; nothing enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    pub name: &'static str,
    pub requests_per_minute: Option<u32>,
    pub requests_per_day: Option<u32>,
}

// Free tier figures
pub const MODEL_OPTIONS: &[ModelDescriptor] = &[
    ModelDescriptor {
        name: "gemini-2.5-pro-exp-03-25",
        requests_per_minute: Some(5),
        requests_per_day: Some(25),
    },
    ModelDescriptor {
        name: "gemini-2.5-flash",
        requests_per_minute: Some(500),
        requests_per_day: Some(1500),
    },
    ModelDescriptor {
        name: DEFAULT_MODEL,
        requests_per_minute: Some(1000),
        requests_per_day: Some(10000),
    },
];

pub fn find_model(name: &str) -> Option<&'static ModelDescriptor> {
    MODEL_OPTIONS.iter().find(|m| m.name == name)
}

fn limit(value: Option<u32>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} rpm, {} rpd)",
            self.name,
            limit(self.requests_per_minute),
            limit(self.requests_per_day)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_is_listed() {
        let default = find_model(DEFAULT_MODEL).expect("default model in table");
        assert_eq!(default.requests_per_minute, Some(1000));
        assert_eq!(default.requests_per_day, Some(10000));
    }

    #[test]
    fn test_display_label() {
        let pro = find_model("gemini-2.5-pro-exp-03-25").unwrap();
        assert_eq!(pro.to_string(), "gemini-2.5-pro-exp-03-25 (5 rpm, 25 rpd)");

        let unknown = ModelDescriptor {
            name: "custom",
            requests_per_minute: None,
            requests_per_day: Some(3),
        };
        assert_eq!(unknown.to_string(), "custom (N/A rpm, 3 rpd)");
    }

    #[test]
    fn test_unknown_model() {
        assert!(find_model("gpt-4").is_none());
    }
}
