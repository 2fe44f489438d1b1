//! Registration statistics for the dashboard header.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::registration::{Gender, Registration};

/// Per-group totals, as aggregated by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub total_friends: usize,
}

/// Totals across every registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_registrations: usize,
    pub total_friends: usize,
    pub male_count: usize,
    pub female_count: usize,
    pub unexported_count: usize,
}

pub fn summarize(registrations: &[Registration]) -> Summary {
    let mut summary = Summary {
        total_registrations: registrations.len(),
        ..Default::default()
    };
    for reg in registrations {
        summary.total_friends += reg.new_friends.len();
        for friend in &reg.new_friends {
            match friend.gender {
                Gender::Male => summary.male_count += 1,
                Gender::Female => summary.female_count += 1,
            }
        }
        if !reg.exported_to_sheet {
            summary.unexported_count += 1;
        }
    }
    summary
}

/// Distinct group names present in the data, sorted, for the filter menu.
pub fn distinct_groups(registrations: &[Registration]) -> Vec<String> {
    registrations
        .iter()
        .map(|r| r.platinum_group.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::Member;
    use chrono::Utc;

    fn reg(group: &str, friends: Vec<Member>, exported: bool) -> Registration {
        let now = Utc::now();
        Registration {
            id: uuid::Uuid::new_v4(),
            platinum_group: group.to_string(),
            leader_name: "王小明".to_string(),
            new_friends: friends,
            exported_to_sheet: exported,
            exported_at: exported.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample() -> Vec<Registration> {
        vec![
            reg(
                "治宏小組",
                vec![
                    Member::new("甲", Gender::Male),
                    Member::new("乙", Gender::Female),
                ],
                true,
            ),
            reg("彥淳小組", vec![Member::new("丙", Gender::Female)], false),
            reg("治宏小組", vec![Member::new("丁", Gender::Male)], false),
        ]
    }

    #[test]
    fn summary_totals() {
        let summary = summarize(&sample());
        assert_eq!(summary.total_registrations, 3);
        assert_eq!(summary.total_friends, 4);
        assert_eq!(summary.male_count, 2);
        assert_eq!(summary.female_count, 2);
        assert_eq!(summary.unexported_count, 2);
    }

    #[test]
    fn groups_are_distinct_and_sorted() {
        let groups = distinct_groups(&sample());
        assert_eq!(groups.len(), 2);
        let mut sorted = groups.clone();
        sorted.sort();
        assert_eq!(groups, sorted);
    }

    #[test]
    fn empty_input() {
        assert!(distinct_groups(&[]).is_empty());
        assert_eq!(summarize(&[]), Summary::default());
    }
}
