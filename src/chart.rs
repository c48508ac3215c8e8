use crate::models::{ChartBucket, ViolationRecord};

/// At most this many students get their own slice; the rest fold into
/// "Others".
pub const MAX_STUDENTS_SHOWN: usize = 6;

pub const OTHERS_LABEL: &str = "Others";

/// Buckets violation counts per student for the top-offenders chart. The
/// value is the number of violation entries, not records, summed across all
/// of a student's records. Students are identified by display name only, so
/// same-named students in different classes merge into one bucket.
///
/// Result: sorted descending by count (ties keep first-seen order), top six
/// students, remainder collapsed into a trailing "Others" bucket. Empty input
/// yields an empty vec; callers show an explicit no-data placeholder instead
/// of an empty chart.
pub fn chart_buckets(records: &[ViolationRecord]) -> Vec<ChartBucket> {
    let mut counts: Vec<ChartBucket> = Vec::new();

    for record in records {
        match counts.iter_mut().find(|b| b.name == record.student_name) {
            Some(bucket) => bucket.value += record.violations.len(),
            None => counts.push(ChartBucket {
                name: record.student_name.clone(),
                value: record.violations.len(),
            }),
        }
    }

    counts.sort_by(|a, b| b.value.cmp(&a.value));

    if counts.len() > MAX_STUDENTS_SHOWN {
        let others_value: usize = counts[MAX_STUDENTS_SHOWN..].iter().map(|b| b.value).sum();
        counts.truncate(MAX_STUDENTS_SHOWN);
        counts.push(ChartBucket {
            name: OTHERS_LABEL.to_string(),
            value: others_value,
        });
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, ViolationType};
    use chrono::NaiveDate;

    fn record(name: &str, violation_count: usize) -> ViolationRecord {
        ViolationRecord {
            id: format!("test-{name}-{violation_count}"),
            student_name: name.to_string(),
            student_class: "X-A".to_string(),
            gender: Gender::Male,
            date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            violations: vec![ViolationType::NoHat; violation_count],
            notes: None,
        }
    }

    #[test]
    fn empty_input_yields_empty_buckets() {
        assert!(chart_buckets(&[]).is_empty());
    }

    #[test]
    fn counts_entries_not_records() {
        let records = vec![record("Budi Santoso", 2), record("Budi Santoso", 1)];
        let buckets = chart_buckets(&records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].value, 3);
    }

    #[test]
    fn bucket_sum_matches_total_entry_count() {
        let records: Vec<ViolationRecord> = (0..10)
            .map(|i| record(&format!("Student {i}"), i % 3 + 1))
            .collect();
        let total: usize = records.iter().map(|r| r.violations.len()).sum();
        let buckets = chart_buckets(&records);
        let bucket_total: usize = buckets.iter().map(|b| b.value).sum();
        assert_eq!(bucket_total, total);
    }

    #[test]
    fn sorted_descending_with_first_seen_tie_order() {
        let records = vec![
            record("Citra Lestari", 1),
            record("Budi Santoso", 2),
            record("Agus Wijaya", 1),
        ];
        let buckets = chart_buckets(&records);
        let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Budi Santoso", "Citra Lestari", "Agus Wijaya"]);
    }

    #[test]
    fn no_others_bucket_at_exactly_six_students() {
        let records: Vec<ViolationRecord> =
            (0..6).map(|i| record(&format!("Student {i}"), 1)).collect();
        let buckets = chart_buckets(&records);
        assert_eq!(buckets.len(), 6);
        assert!(buckets.iter().all(|b| b.name != OTHERS_LABEL));
    }

    #[test]
    fn long_tail_folds_into_others() {
        let records: Vec<ViolationRecord> = (0..9)
            .map(|i| record(&format!("Student {i}"), 9 - i))
            .collect();
        let buckets = chart_buckets(&records);
        assert_eq!(buckets.len(), MAX_STUDENTS_SHOWN + 1);

        let others = buckets.last().unwrap();
        assert_eq!(others.name, OTHERS_LABEL);
        // Tail counts 3, 2, 1 for students 6..9.
        assert_eq!(others.value, 6);
    }
}
