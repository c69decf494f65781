use serde::Deserialize;

/// One page of an activity-stream feed.
#[derive(Debug, Deserialize)]
pub struct ActivityPage {
    #[serde(default, rename = "orderedItems")]
    pub ordered_items: Vec<Activity>,
    #[serde(default)]
    pub next: Option<Link>,
}

#[derive(Debug, Deserialize)]
pub struct Link {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Activity {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub object: Option<ActivityObject>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityObject {
    pub id: String,
    /// The feed serializes `type` as either a string or an array.
    #[serde(default, rename = "type")]
    pub types: TypeTags,
}

#[derive(Debug, Deserialize, Default)]
#[serde(untagged)]
pub enum TypeTags {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl TypeTags {
    pub fn contains_any(&self, wanted: &[String]) -> bool {
        match self {
            TypeTags::None => false,
            TypeTags::One(tag) => wanted.iter().any(|w| w == tag),
            TypeTags::Many(tags) => tags.iter().any(|tag| wanted.iter().any(|w| w == tag)),
        }
    }
}

impl Activity {
    /// Whether this activity describes a record we should fetch: not a
    /// removal, and its object carries one of the wanted type tags.
    pub fn selects(&self, wanted: &[String]) -> bool {
        if matches!(self.kind.as_deref(), Some("Remove") | Some("Delete")) {
            return false;
        }
        self.object
            .as_ref()
            .map(|o| o.types.contains_any(wanted))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "orderedItems": [
            {
                "type": "Update",
                "object": {
                    "id": "https://id.example.org/authorities/n1",
                    "type": ["madsrdf:Authority", "madsrdf:PersonalName"]
                }
            },
            {
                "type": "Delete",
                "object": {
                    "id": "https://id.example.org/authorities/n2",
                    "type": ["madsrdf:Authority"]
                }
            },
            {
                "type": "Create",
                "object": {
                    "id": "https://id.example.org/authorities/n3",
                    "type": "madsrdf:Topic"
                }
            }
        ],
        "next": { "id": "https://id.example.org/feed/2.json" }
    }"#;

    #[test]
    fn deserializes_string_and_array_type_tags() {
        let page: ActivityPage = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.ordered_items.len(), 3);
        assert_eq!(page.next.as_ref().unwrap().id, "https://id.example.org/feed/2.json");
    }

    #[test]
    fn selects_by_type_tag_and_skips_removals() {
        let page: ActivityPage = serde_json::from_str(PAGE).unwrap();
        let wanted = vec!["madsrdf:Authority".to_string()];

        let selected: Vec<&str> = page
            .ordered_items
            .iter()
            .filter(|a| a.selects(&wanted))
            .map(|a| a.object.as_ref().unwrap().id.as_str())
            .collect();

        // n2 is a Delete, n3 carries only madsrdf:Topic.
        assert_eq!(selected, vec!["https://id.example.org/authorities/n1"]);
    }

    #[test]
    fn last_page_has_no_next_link() {
        let page: ActivityPage = serde_json::from_str(r#"{"orderedItems": []}"#).unwrap();
        assert!(page.ordered_items.is_empty());
        assert!(page.next.is_none());
    }
}
