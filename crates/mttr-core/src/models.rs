use serde::{Deserialize, Deserializer, Serialize};

/// A tracker ticket as fetched, before any timestamp parsing.
///
/// Timestamps stay as the raw strings the tracker sent; the aggregator parses
/// them so that a malformed value can abort the run with the ticket named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Tracker-internal identifier.
    pub id: String,
    /// Human-facing key such as `OPS-123`.
    pub key: String,
    /// When the ticket was opened.
    pub created: String,
    /// When the ticket was resolved, `None` while it is still open.
    #[serde(default)]
    pub resolved: Option<String>,
    /// Labels in tracker order.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Ticket {
    /// The resolution timestamp, treating an empty string as absent.
    pub fn resolution(&self) -> Option<&str> {
        self.resolved.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Key when present, otherwise the internal id.
    pub fn display_key(&self) -> &str {
        if self.key.is_empty() {
            &self.id
        } else {
            &self.key
        }
    }
}

/// Which resolved tickets must have parseable timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseScope {
    /// Every resolved ticket, in or out of the window. A bad timestamp
    /// anywhere in the feed aborts the run.
    #[default]
    All,
    /// `resolved` for every resolved ticket, `created` only for tickets that
    /// fall inside the window.
    InWindow,
}

impl std::str::FromStr for ParseScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ParseScope::All),
            "in-window" => Ok(ParseScope::InWindow),
            other => Err(format!("unknown parse scope \"{}\"", other)),
        }
    }
}

// ── Jira wire format ──────────────────────────────────────────────────────────

/// Selected fields of a Jira issue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    #[serde(rename = "resolutiondate", default)]
    pub resolution_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
}

/// A Jira issue as returned by the search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

impl From<Issue> for Ticket {
    fn from(issue: Issue) -> Self {
        Ticket {
            id: issue.id,
            key: issue.key,
            created: issue.fields.created,
            resolved: issue.fields.resolution_date,
            labels: issue.fields.labels,
        }
    }
}

/// One page of a Jira search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Offset the server says this page starts at, when it reports one.
    #[serde(default)]
    pub start_at: Option<u64>,
    #[serde(default)]
    pub max_results: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl SearchPage {
    /// `startAt` of the page after this one, given the offset this page was
    /// requested at. `None` when this is the last page.
    ///
    /// The offset reported in the body is not trusted here; see
    /// [`SearchPage::starts_at`].
    pub fn next_start_at(&self, requested: u64) -> Option<u64> {
        if self.issues.is_empty() {
            return None;
        }
        let next = requested.checked_add(self.issues.len() as u64)?;
        (next < self.total).then_some(next)
    }

    /// `false` when the server reports a different offset than `requested`.
    pub fn starts_at(&self, requested: u64) -> bool {
        self.start_at.map_or(true, |start_at| start_at == requested)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "startAt": 0,
        "maxResults": 2,
        "total": 3,
        "issues": [
            {
                "id": "10001",
                "key": "OPS-1",
                "fields": {
                    "created": "2018-08-01T09:00:00.000+1000",
                    "resolutiondate": "2018-08-03T09:00:00.000+1000",
                    "labels": ["payments"]
                }
            },
            {
                "id": "10002",
                "key": "OPS-2",
                "fields": {
                    "created": "2018-08-02T09:00:00.000+1000",
                    "resolutiondate": null,
                    "labels": null
                }
            }
        ]
    }"#;

    #[test]
    fn test_decode_search_page() {
        let page: SearchPage = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.max_results, 2);
        assert_eq!(page.issues.len(), 2);

        let tickets: Vec<Ticket> = page.issues.into_iter().map(Ticket::from).collect();
        assert_eq!(tickets[0].key, "OPS-1");
        assert_eq!(tickets[0].labels, vec!["payments"]);
        assert_eq!(
            tickets[0].resolution(),
            Some("2018-08-03T09:00:00.000+1000")
        );
        assert_eq!(tickets[1].resolution(), None);
        assert!(tickets[1].labels.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let issue: Issue = serde_json::from_str(r#"{"id": "7"}"#).unwrap();
        let ticket = Ticket::from(issue);
        assert_eq!(ticket.display_key(), "7");
        assert!(ticket.created.is_empty());
        assert!(ticket.resolution().is_none());
    }

    #[test]
    fn test_empty_resolution_is_absent() {
        let ticket = Ticket {
            id: "1".into(),
            key: "OPS-1".into(),
            created: "2018-08-01".into(),
            resolved: Some("  ".into()),
            labels: vec![],
        };
        assert!(ticket.resolution().is_none());
    }

    #[test]
    fn test_parse_scope_from_str() {
        assert_eq!("all".parse::<ParseScope>(), Ok(ParseScope::All));
        assert_eq!("in-window".parse::<ParseScope>(), Ok(ParseScope::InWindow));
        assert!("some".parse::<ParseScope>().is_err());
        assert_eq!(ParseScope::default(), ParseScope::All);
    }

    #[test]
    fn test_next_start_at() {
        let page: SearchPage = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.next_start_at(0), Some(2));
        assert_eq!(page.next_start_at(1), None);

        let empty = SearchPage {
            total: 3,
            ..SearchPage::default()
        };
        assert_eq!(empty.next_start_at(0), None);
    }

    #[test]
    fn test_next_start_at_does_not_overflow() {
        let page: SearchPage = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.next_start_at(u64::MAX - 1), None);
    }

    #[test]
    fn test_starts_at_checks_reported_offset() {
        let mut page: SearchPage = serde_json::from_str(PAGE).unwrap();
        assert!(page.starts_at(0));
        assert!(!page.starts_at(2));

        page.start_at = None;
        assert!(page.starts_at(2));
    }
}
