use pttrack_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// First, middle and last name of a patient or provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
}

impl PersonName {
    pub fn new(
        first_name: impl AsRef<str>,
        last_name: impl AsRef<str>,
        middle_name: Option<String>,
    ) -> Result<Self, pttrack_types::TextError> {
        Ok(Self {
            first_name: NonEmptyText::new(first_name)?,
            last_name: NonEmptyText::new(last_name)?,
            middle_name: middle_name
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
        })
    }

    /// Render the name for display.
    ///
    /// `reverse` puts the last name first ("Brodeltein, Juggie B."). `middle_short` reduces
    /// each whitespace-separated middle name to its initial.
    pub fn name(&self, reverse: bool, middle_short: bool) -> String {
        let middle = match &self.middle_name {
            Some(middle) if middle_short => middle
                .split_whitespace()
                .filter_map(|part| part.chars().next())
                .map(|initial| format!("{initial}."))
                .collect::<String>(),
            Some(middle) => middle.clone(),
            None => String::new(),
        };

        let parts: Vec<&str> = if reverse {
            vec![self.last_name.as_str(), self.first_name.as_str(), middle.as_str()]
        } else {
            vec![self.first_name.as_str(), middle.as_str(), self.last_name.as_str()]
        };

        let mut rendered = String::new();
        for (i, part) in parts.into_iter().filter(|p| !p.is_empty()).enumerate() {
            if i > 0 {
                rendered.push(' ');
            }
            rendered.push_str(part);
            if reverse && i == 0 {
                rendered.push(',');
            }
        }
        rendered
    }
}

impl std::fmt::Display for PersonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name(true, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn juggie() -> PersonName {
        PersonName::new("Juggie", "Brodeltein", Some("Bayer".into())).unwrap()
    }

    #[test]
    fn reversed_name_with_initial() {
        assert_eq!(juggie().name(true, true), "Brodeltein, Juggie B.");
        assert_eq!(juggie().to_string(), "Brodeltein, Juggie B.");
    }

    #[test]
    fn forward_name_with_full_middle() {
        assert_eq!(juggie().name(false, false), "Juggie Bayer Brodeltein");
    }

    #[test]
    fn multiple_middle_names_become_initials() {
        let name = PersonName::new("Asdf", "Lkjh", Some("John Ray".into())).unwrap();
        assert_eq!(name.name(false, true), "Asdf J.R. Lkjh");
    }

    #[test]
    fn missing_middle_name_leaves_no_gap() {
        let name = PersonName::new("No", "Action", Some("  ".into())).unwrap();
        assert_eq!(name.middle_name, None);
        assert_eq!(name.name(true, true), "Action, No");
        assert_eq!(name.name(false, true), "No Action");
    }

    #[test]
    fn rejects_blank_last_name() {
        assert!(PersonName::new("No", " ", None).is_err());
    }
}
