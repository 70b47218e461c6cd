//! Search/visibility filtering and completion statistics.
//!
//! Completion statistics are always computed over the unfiltered combined
//! list, so search text and visibility flags never change the percentage.

use crate::models::status::resolve_status;
use crate::models::{CreativeStatus, Creative, EditMap, StatusEntry, StatusMap};
use crate::overlay::{effective_fields, DescriptionFallback, EffectiveFields};
use serde::Serialize;

/// Which statuses are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub show_pending: bool,
    pub show_created: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            show_pending: true,
            show_created: true,
        }
    }
}

impl Visibility {
    pub fn allows(self, status: CreativeStatus) -> bool {
        match status {
            CreativeStatus::Pending => self.show_pending,
            CreativeStatus::Created => self.show_created,
        }
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewItem {
    pub creative: Creative,
    pub fields: EffectiveFields,
    pub status: StatusEntry,
}

/// Filtered, ordered view plus the number of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub items: Vec<ViewItem>,
    pub matched: usize,
}

/// Completion numbers for one (persona, phase).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionStats {
    pub total: usize,
    pub created: usize,
    pub percent: u32,
}

impl CompletionStats {
    pub fn summary(&self) -> String {
        format!(
            "Total: {} | Completadas: {} ({}%)",
            self.total, self.created, self.percent
        )
    }
}

/// Case-insensitive match of `query` against id, headline and subline.
///
/// An empty query matches everything.
pub fn matches_search(creative: &Creative, fields: &EffectiveFields, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    [
        creative.id.as_str(),
        fields.headline.as_str(),
        fields.subline.as_str(),
    ]
    .iter()
    .any(|haystack| haystack.to_lowercase().contains(&needle))
}

/// Stable filter of `combined` by search text and visibility.
pub fn project(
    combined: &[Creative],
    edits: &EditMap,
    statuses: &StatusMap,
    query: &str,
    visibility: Visibility,
) -> Projection {
    let items: Vec<ViewItem> = combined
        .iter()
        .filter_map(|creative| {
            let fields = effective_fields(
                creative,
                edits.get(&creative.id),
                DescriptionFallback::Editor,
            );
            if !matches_search(creative, &fields, query) {
                return None;
            }
            let status = resolve_status(statuses, &creative.id);
            if !visibility.allows(status.status) {
                return None;
            }
            Some(ViewItem {
                creative: creative.clone(),
                fields,
                status,
            })
        })
        .collect();

    let matched = items.len();
    Projection { items, matched }
}

/// Completion over the whole combined list, ignoring view filters.
pub fn completion_stats(combined: &[Creative], statuses: &StatusMap) -> CompletionStats {
    let total = combined.len();
    let created = combined
        .iter()
        .filter(|creative| resolve_status(statuses, &creative.id).is_created())
        .count();
    let percent = if total == 0 {
        0
    } else {
        (created as f64 / total as f64 * 100.0).round() as u32
    };
    CompletionStats {
        total,
        created,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::combined_list;
    use crate::models::{CreativeEdit, Persona, Phase};
    use crate::test_support::{custom_creative, sample_catalog};
    use chrono::Utc;

    fn combined() -> Vec<Creative> {
        let custom = vec![custom_creative(
            "P3-CUSTOM-0042",
            Persona::P3,
            Phase::Tofu,
            "Oficina rural",
        )];
        combined_list(&sample_catalog(), &custom, Persona::P3, Phase::Tofu)
    }

    fn ids(projection: &Projection) -> Vec<&str> {
        projection
            .items
            .iter()
            .map(|item| item.creative.id.as_str())
            .collect()
    }

    #[test]
    fn empty_query_with_all_flags_returns_full_list_in_order() {
        let list = combined();
        let projection = project(
            &list,
            &EditMap::new(),
            &StatusMap::new(),
            "",
            Visibility::default(),
        );
        assert_eq!(
            ids(&projection),
            vec!["P3-TOFU-001", "P3-TOFU-002", "P3-TOFU-003", "P3-CUSTOM-0042"]
        );
        assert_eq!(projection.matched, 4);
    }

    #[test]
    fn search_uses_overlay_values_not_catalog_values() {
        let list = combined();
        let mut edits = EditMap::new();
        edits.insert(
            "P3-TOFU-002".to_string(),
            CreativeEdit {
                headline: Some("Fibra en la montaña".to_string()),
                ..CreativeEdit::default()
            },
        );

        let by_overlay = project(&list, &edits, &StatusMap::new(), "MONTAÑA", Visibility::default());
        assert_eq!(ids(&by_overlay), vec!["P3-TOFU-002"]);

        let by_stale_catalog = project(&list, &edits, &StatusMap::new(), "coworking", Visibility::default());
        assert!(by_stale_catalog.items.is_empty());
    }

    #[test]
    fn visibility_drops_items_by_resolved_status() {
        let list = combined();
        let mut statuses = StatusMap::new();
        statuses.insert("P3-TOFU-001".to_string(), StatusEntry::created_at(Utc::now()));

        let only_created = project(
            &list,
            &EditMap::new(),
            &statuses,
            "",
            Visibility {
                show_pending: false,
                show_created: true,
            },
        );
        assert_eq!(ids(&only_created), vec!["P3-TOFU-001"]);

        let nothing = project(
            &list,
            &EditMap::new(),
            &statuses,
            "",
            Visibility {
                show_pending: false,
                show_created: false,
            },
        );
        assert_eq!(nothing.matched, 0);
    }

    #[test]
    fn completion_percentage_ignores_filters() {
        let list = combined();
        let mut statuses = StatusMap::new();
        statuses.insert("P3-TOFU-001".to_string(), StatusEntry::created_at(Utc::now()));
        statuses.insert("P3-TOFU-003".to_string(), StatusEntry::default());

        let before = completion_stats(&list, &statuses);
        let narrowed = project(
            &list,
            &EditMap::new(),
            &statuses,
            "custom",
            Visibility {
                show_pending: true,
                show_created: false,
            },
        );
        let after = completion_stats(&list, &statuses);

        assert_eq!(narrowed.matched, 1);
        assert_eq!(before, after);
        assert_eq!(
            after,
            CompletionStats {
                total: 4,
                created: 1,
                percent: 25
            }
        );
    }

    #[test]
    fn completion_of_empty_list_is_zero_percent() {
        let stats = completion_stats(&[], &StatusMap::new());
        assert_eq!(stats.percent, 0);
        assert_eq!(stats.summary(), "Total: 0 | Completadas: 0 (0%)");
    }

    #[test]
    fn completion_percentage_rounds_to_nearest() {
        let list = combined();
        let statuses: StatusMap = list[..1]
            .iter()
            .chain(&list[2..3])
            .map(|creative| (creative.id.clone(), StatusEntry::created_at(Utc::now())))
            .collect();
        let stats = completion_stats(&list[..3], &statuses);
        assert_eq!(stats.percent, 67);
    }
}
