//! Thread list filters and their query-string encoding

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use campusline_shared::{ChatType, ClassDivisionId};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Active filter set for the thread list endpoint.
///
/// `page` and `limit` always travel with the request; the remaining
/// fields are sent only when set.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadFilters {
    pub chat_type: ChatType,
    /// Restrict to threads the caller participates in
    pub includes_me: bool,
    pub page: u32,
    pub limit: u32,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub class_division_id: Option<ClassDivisionId>,
}

impl Default for ThreadFilters {
    fn default() -> Self {
        Self::new(20)
    }
}

impl ThreadFilters {
    pub fn new(limit: u32) -> Self {
        Self {
            chat_type: ChatType::All,
            includes_me: false,
            page: 1,
            limit,
            start_date: None,
            end_date: None,
            class_division_id: None,
        }
    }

    /// Merge a partial change into the active set and reset to page 1.
    ///
    /// Any filter change invalidates the current page position, so the
    /// reset happens here rather than at each call site.
    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(chat_type) = patch.chat_type {
            self.chat_type = chat_type;
        }
        if let Some(includes_me) = patch.includes_me {
            self.includes_me = includes_me;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(class_division_id) = patch.class_division_id {
            self.class_division_id = class_division_id;
        }
        self.page = 1;
    }

    /// Key/value pairs for the request query string
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("chat_type", self.chat_type.as_str().to_string()),
            ("includes_me", self.includes_me.to_string()),
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(date) = self.start_date {
            if let Ok(formatted) = date.format(DATE_FORMAT) {
                pairs.push(("start_date", formatted));
            }
        }
        if let Some(date) = self.end_date {
            if let Ok(formatted) = date.format(DATE_FORMAT) {
                pairs.push(("end_date", formatted));
            }
        }
        if let Some(division) = self.class_division_id {
            pairs.push(("class_division_id", division.to_string()));
        }
        pairs
    }
}

/// Partial filter change; `None` leaves the current value in place.
///
/// The optional filters use a nested `Option` so a patch can both set
/// and clear them.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub chat_type: Option<ChatType>,
    pub includes_me: Option<bool>,
    pub start_date: Option<Option<Date>>,
    pub end_date: Option<Option<Date>>,
    pub class_division_id: Option<Option<ClassDivisionId>>,
}

impl FilterPatch {
    pub fn chat_type(chat_type: ChatType) -> Self {
        Self {
            chat_type: Some(chat_type),
            ..Self::default()
        }
    }

    pub fn date_range(start: Date, end: Date) -> Self {
        Self {
            start_date: Some(Some(start)),
            end_date: Some(Some(end)),
            ..Self::default()
        }
    }

    pub fn division(id: Option<ClassDivisionId>) -> Self {
        Self {
            class_division_id: Some(id),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_apply_merges_and_resets_page() {
        let mut filters = ThreadFilters::default();
        filters.page = 4;
        filters.includes_me = true;

        filters.apply(FilterPatch::chat_type(ChatType::Group));

        assert_eq!(filters.chat_type, ChatType::Group);
        assert!(filters.includes_me);
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn test_apply_can_clear_optional_filters() {
        let mut filters = ThreadFilters::default();
        filters.class_division_id = Some(ClassDivisionId::new());

        filters.apply(FilterPatch::division(None));

        assert_eq!(filters.class_division_id, None);
    }

    #[test]
    fn test_query_pairs_omit_unset_filters() {
        let filters = ThreadFilters::default();
        let pairs = filters.query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("chat_type", "all".to_string()),
                ("includes_me", "false".to_string()),
                ("page", "1".to_string()),
                ("limit", "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_format_dates() {
        let mut filters = ThreadFilters::default();
        filters.apply(FilterPatch::date_range(date!(2025 - 01 - 06), date!(2025 - 01 - 31)));

        let pairs = filters.query_pairs();
        assert!(pairs.contains(&("start_date", "2025-01-06".to_string())));
        assert!(pairs.contains(&("end_date", "2025-01-31".to_string())));
    }
}
