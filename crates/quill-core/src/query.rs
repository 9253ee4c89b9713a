//! Declarative queries
//!
//! A [`Query`] is a flat, declarative bundle that boundary layers (CLI
//! flags, HTTP query parameters) can populate from repeatable
//! arguments. Each attribute holds an outer list of inner OR-groups:
//! the members of a group are OR'd (a primitive filter already does
//! this), and the groups themselves are AND'd, giving conjunctive
//! normal form. The `exclude_*` twins compile to negated clauses.
//!
//! [`Query::filter`] compiles the whole bundle into a single [`Filter`]
//! so the engine only ever deals in predicates.

use chrono::NaiveDateTime;

use crate::filter::Filter;

/// A declarative, CNF-structured filter specification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Path-prefix groups; each inner group is OR'd, groups are AND'd
    pub paths: Vec<Vec<String>>,
    /// Title-substring groups
    pub titles: Vec<Vec<String>>,
    /// Content-substring groups
    pub contents: Vec<Vec<String>>,
    /// Tag-membership groups
    pub tags: Vec<Vec<String>>,

    /// Path-prefix groups to exclude
    pub exclude_paths: Vec<Vec<String>>,
    /// Title-substring groups to exclude
    pub exclude_titles: Vec<Vec<String>>,
    /// Content-substring groups to exclude
    pub exclude_contents: Vec<Vec<String>>,
    /// Tag-membership groups to exclude
    pub exclude_tags: Vec<Vec<String>>,

    /// Inclusive lower date bound
    pub date_from: Option<NaiveDateTime>,
    /// Inclusive upper date bound
    pub date_until: Option<NaiveDateTime>,
    /// Inclusive minimum body length in bytes
    pub min_length: Option<usize>,
    /// Exclusive maximum body length in bytes
    pub max_length: Option<usize>,
}

impl Query {
    /// Compile the query into a single composed predicate.
    ///
    /// Empty or absent fields contribute no clause; the empty query
    /// compiles to `And([])`, which is always true.
    pub fn filter(&self) -> Filter {
        let mut clauses = Vec::new();

        push_groups(&mut clauses, &self.paths, Filter::PathPrefix, false);
        push_groups(&mut clauses, &self.titles, Filter::TitleContains, false);
        push_groups(&mut clauses, &self.contents, Filter::ContentContains, false);
        push_groups(&mut clauses, &self.tags, Filter::HasTag, false);

        push_groups(&mut clauses, &self.exclude_paths, Filter::PathPrefix, true);
        push_groups(&mut clauses, &self.exclude_titles, Filter::TitleContains, true);
        push_groups(
            &mut clauses,
            &self.exclude_contents,
            Filter::ContentContains,
            true,
        );
        push_groups(&mut clauses, &self.exclude_tags, Filter::HasTag, true);

        if let Some(from) = self.date_from {
            clauses.push(Filter::DateFrom(vec![from]));
        }
        if let Some(until) = self.date_until {
            clauses.push(Filter::DateUntil(vec![until]));
        }
        if let Some(min) = self.min_length {
            clauses.push(Filter::MinLength(vec![min]));
        }
        if let Some(max) = self.max_length {
            clauses.push(Filter::MaxLength(vec![max]));
        }

        Filter::And(clauses)
    }
}

/// Turn each non-empty OR-group into one conjuncted clause, negated
/// for exclusions.
fn push_groups(
    clauses: &mut Vec<Filter>,
    groups: &[Vec<String>],
    primitive: fn(Vec<String>) -> Filter,
    negate: bool,
) {
    for group in groups {
        if group.is_empty() {
            continue;
        }
        let clause = primitive(group.clone());
        clauses.push(if negate { Filter::not(clause) } else { clause });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;

    fn notes() -> Vec<Note> {
        vec![
            Note::synthetic("food/pizza", "Pizza")
                .with_contents("Pizza is great.")
                .with_tags(vec!["food".to_string()]),
            Note::synthetic("food/beans", "Beans")
                .with_contents("Beans are fine.")
                .with_tags(vec!["food".to_string(), "legume".to_string()]),
            Note::synthetic("moods/hunger", "Hunger").with_contents("I am hungry."),
        ]
    }

    fn select(q: &Query) -> Vec<String> {
        let f = q.filter();
        let mut hits: Vec<String> = notes()
            .iter()
            .filter(|n| f.matches(n))
            .map(|n| n.path.clone())
            .collect();
        hits.sort();
        hits
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert_eq!(
            select(&Query::default()),
            vec!["food/beans", "food/pizza", "moods/hunger"]
        );
    }

    #[test]
    fn test_single_group_is_ored() {
        let q = Query {
            paths: vec![vec!["food/".to_string(), "moods/".to_string()]],
            ..Query::default()
        };
        assert_eq!(select(&q), vec!["food/beans", "food/pizza", "moods/hunger"]);
    }

    #[test]
    fn test_groups_are_anded() {
        // Must be under food/ AND carry the legume tag.
        let q = Query {
            paths: vec![vec!["food/".to_string()]],
            tags: vec![vec!["legume".to_string()]],
            ..Query::default()
        };
        assert_eq!(select(&q), vec!["food/beans"]);
    }

    #[test]
    fn test_exclude_compiles_to_negated_clause() {
        let q = Query {
            paths: vec![vec!["food/".to_string()]],
            exclude_titles: vec![vec!["Beans".to_string()]],
            ..Query::default()
        };
        assert_eq!(select(&q), vec!["food/pizza"]);
    }

    #[test]
    fn test_include_minus_exclude() {
        let q = Query {
            tags: vec![vec!["food".to_string()]],
            exclude_tags: vec![vec!["legume".to_string()]],
            ..Query::default()
        };
        assert_eq!(select(&q), vec!["food/pizza"]);
    }

    #[test]
    fn test_length_bounds() {
        let q = Query {
            min_length: Some(13),
            max_length: Some(15),
            ..Query::default()
        };
        // "I am hungry." is 12 bytes, "Pizza is great." 15, "Beans are
        // fine." 15; max 15 is exclusive so nothing of length 15 passes.
        assert_eq!(select(&q), Vec::<String>::new());

        let q = Query {
            min_length: Some(13),
            max_length: Some(16),
            ..Query::default()
        };
        assert_eq!(select(&q), vec!["food/beans", "food/pizza"]);
    }

    #[test]
    fn test_empty_groups_contribute_no_clause() {
        let q = Query {
            paths: vec![vec![]],
            titles: vec![],
            ..Query::default()
        };
        assert_eq!(select(&q), vec!["food/beans", "food/pizza", "moods/hunger"]);
    }
}
