use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};

use crate::models::{Gender, RecordDraft, Student, ViolationRecord, ViolationType};

/// In-memory collection of violation records. The store owns the records and
/// is the only place ids are assigned; everything else lives for the session
/// only.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<ViolationRecord>,
    next_seq: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ViolationRecord>) -> Self {
        Self {
            records,
            next_seq: 0,
        }
    }

    pub fn records(&self) -> &[ViolationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn find(&self, id: &str) -> Option<&ViolationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Appends a new record, assigning a fresh id. The id is timestamp-derived
    /// with a sequence suffix so two submissions in the same millisecond still
    /// get distinct ids.
    pub fn add(&mut self, draft: RecordDraft) -> &ViolationRecord {
        let id = format!("{}-{}", Utc::now().timestamp_millis(), self.next_seq);
        self.next_seq += 1;
        self.records.push(ViolationRecord {
            id,
            student_name: draft.student_name,
            student_class: draft.student_class,
            gender: draft.gender,
            date: draft.date,
            violations: draft.violations,
            notes: draft.notes,
        });
        self.records.last().expect("record just pushed")
    }

    /// Replaces every field of the record matching `id` except the id itself.
    /// Returns false when no record matches.
    pub fn edit(&mut self, id: &str, draft: RecordDraft) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.student_name = draft.student_name;
                record.student_class = draft.student_class;
                record.gender = draft.gender;
                record.date = draft.date;
                record.violations = draft.violations;
                record.notes = draft.notes;
                true
            }
            None => false,
        }
    }

    /// Removes the record with the given id. Missing ids are a no-op.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// Case-insensitive substring match against student name or class, sorted
    /// by date descending for display. An empty term matches every record.
    pub fn filter(&self, term: &str) -> Vec<&ViolationRecord> {
        let needle = term.to_lowercase();
        let mut matches: Vec<&ViolationRecord> = self
            .records
            .iter()
            .filter(|r| {
                r.student_name.to_lowercase().contains(&needle)
                    || r.student_class.to_lowercase().contains(&needle)
            })
            .collect();
        matches.sort_by(|a, b| b.date.cmp(&a.date));
        matches
    }
}

/// Class name -> enrolled students, students kept sorted by name. Class keys
/// disappear when their last student is removed.
#[derive(Debug, Default)]
pub struct Roster {
    classes: BTreeMap<String, Vec<Student>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn students(&self, class: &str) -> Option<&[Student]> {
        self.classes.get(class).map(Vec::as_slice)
    }

    pub fn gender_of(&self, class: &str, name: &str) -> Option<Gender> {
        self.classes
            .get(class)?
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .map(|s| s.gender)
    }

    /// No-op when a same-named student (case-insensitive) already exists in
    /// the class.
    pub fn add_student(&mut self, class: &str, name: &str, gender: Gender) {
        let students = self.classes.entry(class.to_string()).or_default();
        if students
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(name))
        {
            return;
        }
        students.push(Student {
            name: name.to_string(),
            gender,
        });
        students.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Removes the student; drops the class entry entirely once it is empty.
    pub fn delete_student(&mut self, class: &str, name: &str) {
        if let Some(students) = self.classes.get_mut(class) {
            students.retain(|s| s.name != name);
            if students.is_empty() {
                self.classes.remove(class);
            }
        }
    }
}

pub fn seed_roster() -> Roster {
    let mut roster = Roster::new();
    let seed = [
        ("X-A", "Doni Firmansyah", Gender::Male),
        ("X-A", "Farah Nabila", Gender::Female),
        ("X-C", "Agus Wijaya", Gender::Male),
        ("X-C", "Gita Amelia", Gender::Female),
        ("XI IPS 2", "Citra Lestari", Gender::Female),
        ("XI IPS 2", "Hadi Prasetyo", Gender::Male),
        ("XII IPA 1", "Budi Santoso", Gender::Male),
        ("XII IPA 1", "Bambang Yudhoyono", Gender::Male),
        ("XII IPA 1", "Rina Hartati", Gender::Female),
        ("XII Bahasa", "Eka Putri", Gender::Female),
        ("XII Bahasa", "Indra Gunawan", Gender::Male),
    ];
    for (class, name, gender) in seed {
        roster.add_student(class, name, gender);
    }
    roster
}

pub fn seed_records() -> Vec<ViolationRecord> {
    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid seed date")
    }

    vec![
        ViolationRecord {
            id: "seed-1".to_string(),
            student_name: "Budi Santoso".to_string(),
            student_class: "XII IPA 1".to_string(),
            gender: Gender::Male,
            date: date(2024, 7, 15),
            violations: vec![ViolationType::NoHat, ViolationType::ImproperShoes],
            notes: Some("Multi-colored shoes.".to_string()),
        },
        ViolationRecord {
            id: "seed-2".to_string(),
            student_name: "Citra Lestari".to_string(),
            student_class: "XI IPS 2".to_string(),
            gender: Gender::Female,
            date: date(2024, 7, 15),
            violations: vec![ViolationType::NoTie],
            notes: None,
        },
        ViolationRecord {
            id: "seed-3".to_string(),
            student_name: "Doni Firmansyah".to_string(),
            student_class: "X-A".to_string(),
            gender: Gender::Male,
            date: date(2024, 7, 22),
            violations: vec![ViolationType::LongHair, ViolationType::ImproperSocks],
            notes: Some("Hair covering the ears.".to_string()),
        },
        ViolationRecord {
            id: "seed-4".to_string(),
            student_name: "Eka Putri".to_string(),
            student_class: "XII Bahasa".to_string(),
            gender: Gender::Female,
            date: date(2024, 7, 22),
            violations: vec![ViolationType::IncompleteBadge],
            notes: None,
        },
        ViolationRecord {
            id: "seed-5".to_string(),
            student_name: "Agus Wijaya".to_string(),
            student_class: "X-C".to_string(),
            gender: Gender::Male,
            date: date(2024, 7, 29),
            violations: vec![ViolationType::NoHat],
            notes: None,
        },
        ViolationRecord {
            id: "seed-6".to_string(),
            student_name: "Bambang Yudhoyono".to_string(),
            student_class: "XII IPA 1".to_string(),
            gender: Gender::Male,
            date: date(2024, 7, 29),
            violations: vec![ViolationType::LongHair],
            notes: None,
        },
    ]
}
