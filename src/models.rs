use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type CourseId = u32;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub rating: Rating,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

// The authenticated user as reported by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Principal {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl Principal {
    // Display name, else the local part of the email, else a generic greeting.
    pub fn greeting_name(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        if let Some(local) = self
            .email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|l| !l.is_empty())
        {
            return local.to_string();
        }
        "Learner".to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrolledCourse {
    pub id: CourseId,
    pub title: String,
    pub image: String,
    pub category: String,
    pub progress: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Google,
    Github,
}

impl ProviderKind {
    pub fn provider_id(self) -> &'static str {
        match self {
            ProviderKind::Google => "google.com",
            ProviderKind::Github => "github.com",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Google => write!(f, "Google"),
            ProviderKind::Github => write!(f, "GitHub"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" | "google.com" => Ok(ProviderKind::Google),
            "github" | "github.com" => Ok(ProviderKind::Github),
            other => Err(format!("unknown identity provider: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn principal(display_name: Option<&str>, email: Option<&str>) -> Principal {
        Principal {
            uid: "u1".to_string(),
            display_name: display_name.map(str::to_string),
            email: email.map(str::to_string),
            photo_url: None,
        }
    }

    #[test]
    fn greeting_prefers_display_name() {
        assert_eq!(principal(Some("Ada"), Some("ada@example.com")).greeting_name(), "Ada");
    }

    #[test]
    fn greeting_falls_back_to_email_then_learner() {
        assert_eq!(principal(None, Some("grace@example.com")).greeting_name(), "grace");
        assert_eq!(principal(Some(""), None).greeting_name(), "Learner");
    }

    #[test]
    fn course_without_rating_decodes_with_zero_rating() {
        let json = r#"{"id":3,"title":"T","description":"D","image":"i.png","price":1.5,"category":"c"}"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.rating, Rating::default());
    }

    #[test]
    fn provider_kind_parses_names_and_ids() {
        assert_eq!("GitHub".parse::<ProviderKind>(), Ok(ProviderKind::Github));
        assert_eq!("google.com".parse::<ProviderKind>(), Ok(ProviderKind::Google));
        assert!("facebook".parse::<ProviderKind>().is_err());
    }
}
