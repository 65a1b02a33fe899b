use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::remap::{RemapRule, SPARSE_FORCE_TABLE};

/// Which NinaPro database a recording comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Database {
    Db1,
    Db2,
    Db3,
}

impl Database {
    pub fn name(self) -> &'static str {
        match self {
            Database::Db1 => "DB1",
            Database::Db2 => "DB2",
            Database::Db3 => "DB3",
        }
    }

    pub fn info(self) -> &'static DbInfo {
        match self {
            Database::Db1 => &DB1_INFO,
            Database::Db2 => &DB2_INFO,
            Database::Db3 => &DB3_INFO,
        }
    }

    pub fn session_plan(self) -> &'static SessionPlan {
        match self {
            Database::Db1 => &DB1_PLAN,
            Database::Db2 => &DB2_PLAN,
            Database::Db3 => &DB3_PLAN,
        }
    }

    /// File name of one session recording, following the per-database naming
    /// convention (`S{subject}_A1_E{session}.mat` for DB1,
    /// `S{subject}_E{session}_A1.mat` for DB2/DB3).
    pub fn session_file(self, subject: usize, session: usize) -> String {
        match self {
            Database::Db1 => format!("S{subject}_A1_E{session}.mat"),
            Database::Db2 | Database::Db3 => format!("S{subject}_E{session}_A1.mat"),
        }
    }
}

impl std::fmt::Display for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-subject deviation from a database's majority channel/movement counts
/// (DB3 subjects were recorded with individual electrode and gesture sets).
#[derive(Clone, Debug, Serialize)]
pub struct SubjectOverride {
    /// 1-based subject number.
    pub subject: usize,
    pub nb_channels: Option<usize>,
    pub nb_moves: Option<usize>,
}

/// Static description of one database: recording geometry plus the published
/// demographic tables. Subject lists hold 1-based subject numbers exactly as
/// published; [`DbInfo::to_indices`] converts them to 0-based positions.
#[derive(Clone, Debug, Serialize)]
pub struct DbInfo {
    pub nb_subjects: usize,
    pub nb_channels: usize,
    /// Movement count including rest for DB1, excluding it for DB2/DB3, as
    /// published.
    pub nb_moves: usize,
    pub nb_reps: usize,
    /// Sample rate in Hz.
    pub fs: f64,
    pub female: Vec<usize>,
    pub male: Vec<usize>,
    pub left_handed: Vec<usize>,
    pub right_handed: Vec<usize>,
    pub ages: Vec<u32>,
    pub heights: Vec<u32>,
    pub weights: Vec<u32>,
    pub subject_overrides: Vec<SubjectOverride>,
}

impl DbInfo {
    /// Repetition ids 1..=nb_reps.
    pub fn rep_labels(&self) -> Vec<i8> {
        (1..=self.nb_reps as i8).collect()
    }

    /// Movement ids 1..=nb_moves for the majority of subjects.
    pub fn move_labels(&self) -> Vec<i8> {
        (1..=self.nb_moves as i8).collect()
    }

    /// Channel count for one subject, honoring per-subject overrides.
    pub fn nb_channels_for(&self, subject: usize) -> usize {
        self.subject_overrides
            .iter()
            .find(|o| o.subject == subject)
            .and_then(|o| o.nb_channels)
            .unwrap_or(self.nb_channels)
    }

    /// Movement count for one subject, honoring per-subject overrides.
    pub fn nb_moves_for(&self, subject: usize) -> usize {
        self.subject_overrides
            .iter()
            .find(|o| o.subject == subject)
            .and_then(|o| o.nb_moves)
            .unwrap_or(self.nb_moves)
    }

    /// 0-based positions for a list of 1-based subject numbers.
    pub fn to_indices(subjects: &[usize]) -> Vec<usize> {
        subjects.iter().map(|s| s - 1).collect()
    }
}

/// Which label streams of a session file the reader should hand over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    /// The re-annotated `restimulus`/`rerepetition` streams.
    Refined,
    /// The raw `stimulus`/`repetition` streams (some files carry no refined
    /// variant).
    Raw,
}

/// How one session of a database is read and folded into the subject stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSpec {
    pub streams: StreamKind,
    pub remap: RemapRule,
    /// Force the final sample of both label streams to rest before diffing;
    /// some files end mid-gesture, which would otherwise drop the last
    /// transition.
    pub clear_final_sample: bool,
}

/// Ordered per-session handling for one database.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionPlan {
    pub sessions: Vec<SessionSpec>,
}

fn spec(streams: StreamKind, remap: RemapRule, clear_final_sample: bool) -> SessionSpec {
    SessionSpec {
        streams,
        remap,
        clear_final_sample,
    }
}

pub static DB1_PLAN: Lazy<SessionPlan> = Lazy::new(|| SessionPlan {
    sessions: vec![
        spec(StreamKind::Refined, RemapRule::Identity, false),
        spec(StreamKind::Refined, RemapRule::Offset, false),
        spec(StreamKind::Refined, RemapRule::Offset, false),
    ],
});

pub static DB2_PLAN: Lazy<SessionPlan> = Lazy::new(|| SessionPlan {
    sessions: vec![
        spec(StreamKind::Refined, RemapRule::Identity, false),
        // Exercise 2 already continues the exercise 1 numbering.
        spec(StreamKind::Refined, RemapRule::Identity, false),
        // Exercise 3 carries only raw streams, numbered sparsely, and ends
        // mid-movement.
        spec(
            StreamKind::Raw,
            RemapRule::Table(SPARSE_FORCE_TABLE.clone()),
            true,
        ),
    ],
});

pub static DB3_PLAN: Lazy<SessionPlan> = Lazy::new(|| SessionPlan {
    sessions: vec![
        spec(StreamKind::Refined, RemapRule::Identity, false),
        spec(StreamKind::Refined, RemapRule::Identity, false),
        spec(
            StreamKind::Refined,
            RemapRule::Table(SPARSE_FORCE_TABLE.clone()),
            false,
        ),
    ],
});

pub static DB1_INFO: Lazy<DbInfo> = Lazy::new(|| DbInfo {
    nb_subjects: 27,
    nb_channels: 10,
    nb_moves: 53, // 52 + rest
    nb_reps: 10,
    fs: 100.0,
    female: vec![6, 8, 10, 14, 15, 20, 22],
    male: vec![
        1, 2, 3, 4, 6, 8, 10, 11, 12, 15, 16, 17, 18, 20, 22, 23, 24, 25, 26, 27,
    ],
    left_handed: vec![14, 16],
    right_handed: vec![
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 15, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27,
    ],
    ages: vec![
        31, 27, 22, 27, 27, 22, 28, 27, 23, 30, 28, 25, 27, 29, 26, 29, 30, 29, 34, 26, 38, 35,
        30, 26, 28, 40, 28,
    ],
    heights: vec![
        170, 170, 180, 183, 178, 163, 170, 164, 173, 160, 170, 185, 184, 155, 162, 167, 175, 178,
        173, 165, 178, 168, 180, 180, 180, 179, 185,
    ],
    weights: vec![
        75, 62, 85, 95, 75, 48, 60, 54, 63, 60, 67, 80, 85, 54, 60, 67, 76, 68, 82, 54, 73, 65,
        65, 65, 70, 66, 100,
    ],
    subject_overrides: Vec::new(),
});

pub static DB2_INFO: Lazy<DbInfo> = Lazy::new(|| DbInfo {
    nb_subjects: 40,
    nb_channels: 12,
    nb_moves: 50, // 40 + 9 force movements + rest
    nb_reps: 6,
    fs: 2000.0,
    female: vec![4, 11, 14, 18, 19, 20, 22, 28, 35, 36, 38],
    male: vec![
        1, 2, 3, 5, 6, 7, 8, 9, 10, 12, 13, 15, 16, 17, 21, 23, 24, 25, 26, 27, 29, 30, 31, 32,
        33, 34, 37, 39, 40,
    ],
    left_handed: vec![4, 13, 22, 25, 26],
    right_handed: vec![
        1, 2, 3, 5, 6, 7, 8, 9, 10, 11, 12, 14, 15, 16, 17, 18, 19, 20, 21, 23, 24, 27, 28, 29,
        30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40,
    ],
    ages: vec![
        29, 29, 31, 30, 25, 35, 27, 45, 23, 34, 32, 29, 30, 30, 30, 34, 29, 30, 31, 26, 32, 28,
        25, 28, 31, 30, 29, 29, 27, 30, 29, 28, 25, 31, 24, 27, 34, 30, 31, 31,
    ],
    heights: vec![
        187, 183, 174, 154, 175, 172, 187, 173, 172, 173, 150, 184, 182, 173, 169, 173, 175, 169,
        158, 155, 170, 162, 170, 170, 168, 186, 170, 160, 171, 173, 185, 173, 183, 192, 170, 155,
        190, 163, 183, 173,
    ],
    weights: vec![
        75, 75, 69, 50, 70, 79, 92, 73, 63, 84, 54, 90, 70, 59, 58, 76, 70, 90, 52, 52, 75, 54,
        66, 73, 70, 90, 65, 61, 64, 68, 98, 72, 71, 78, 52, 44, 105, 62, 96, 65,
    ],
    subject_overrides: Vec::new(),
});

pub static DB3_INFO: Lazy<DbInfo> = Lazy::new(|| DbInfo {
    nb_subjects: 11,
    nb_channels: 12,
    nb_moves: 50,
    nb_reps: 6,
    fs: 2000.0,
    // Gender was not published for the amputee database.
    female: Vec::new(),
    male: Vec::new(),
    left_handed: vec![5],
    right_handed: vec![1, 2, 3, 4, 6, 7, 8, 9, 10, 11],
    ages: vec![32, 35, 0, 34, 67, 32, 35, 33, 44, 59, 45],
    heights: vec![172, 183, 178, 166, 175, 172, 185, 175, 180, 177, 183],
    weights: vec![86, 81, 82, 68, 75, 66, 75, 80, 95, 86, 75],
    subject_overrides: vec![
        SubjectOverride {
            subject: 1,
            nb_channels: None,
            nb_moves: Some(40),
        },
        SubjectOverride {
            subject: 3,
            nb_channels: None,
            nb_moves: Some(49),
        },
        SubjectOverride {
            subject: 7,
            nb_channels: Some(10),
            nb_moves: None,
        },
        SubjectOverride {
            subject: 8,
            nb_channels: Some(10),
            nb_moves: None,
        },
        SubjectOverride {
            subject: 10,
            nb_channels: None,
            nb_moves: Some(43),
        },
    ],
});

/// Clinical data published alongside DB3, synced to subject order.
#[derive(Clone, Debug, Serialize)]
pub struct Db3Clinical {
    pub remaining_forearm_pct: Vec<u32>,
    pub years_after_amputation: Vec<u32>,
    pub amputation_cause: Vec<&'static str>,
    pub phantom_limb_sensation: Vec<u32>,
    pub dash_score: Vec<f64>,
    pub cosmetic_prosthesis_use_years: Vec<f64>,
    pub kinematic_prosthesis_use_years: Vec<f64>,
    pub myoelectric_prosthesis_use_years: Vec<f64>,
}

pub static DB3_CLINICAL: Lazy<Db3Clinical> = Lazy::new(|| Db3Clinical {
    remaining_forearm_pct: vec![50, 70, 30, 40, 90, 40, 0, 50, 90, 50, 90],
    years_after_amputation: vec![13, 6, 5, 1, 1, 13, 7, 5, 14, 2, 5],
    amputation_cause: vec![
        "Accident", "Accident", "Accident", "Accident", "Accident", "Accident", "Accident",
        "Accident", "Accident", "Accident", "Cancer",
    ],
    phantom_limb_sensation: vec![2, 5, 2, 1, 2, 4, 0, 2, 5, 5, 4],
    dash_score: vec![
        1.67, 15.18, 22.5, 86.67, 11.67, 37.5, 31.67, 33.33, 3.33, 11.76, 12.5,
    ],
    cosmetic_prosthesis_use_years: vec![0.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    kinematic_prosthesis_use_years: vec![0.0, 0.0, 8.0, 0.0, 0.4, 12.0, 0.0, 0.0, 0.0, 1.66, 5.0],
    myoelectric_prosthesis_use_years: vec![13.0, 0.0, 8.0, 0.0, 0.0, 0.0, 6.0, 4.0, 14.0, 0.0, 5.0],
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demographic_tables_are_synced_to_subject_counts() {
        for db in [Database::Db1, Database::Db2, Database::Db3] {
            let info = db.info();
            assert_eq!(info.ages.len(), info.nb_subjects);
            assert_eq!(info.heights.len(), info.nb_subjects);
            assert_eq!(info.weights.len(), info.nb_subjects);
        }
    }

    #[test]
    fn session_file_naming_follows_the_convention() {
        assert_eq!(Database::Db1.session_file(3, 2), "S3_A1_E2.mat");
        assert_eq!(Database::Db2.session_file(17, 3), "S17_E3_A1.mat");
        assert_eq!(Database::Db3.session_file(1, 1), "S1_E1_A1.mat");
    }

    #[test]
    fn db3_overrides_shadow_the_majority_counts() {
        let info = Database::Db3.info();
        assert_eq!(info.nb_channels_for(7), 10);
        assert_eq!(info.nb_channels_for(2), 12);
        assert_eq!(info.nb_moves_for(1), 40);
        assert_eq!(info.nb_moves_for(10), 43);
        assert_eq!(info.nb_moves_for(11), 50);
    }

    #[test]
    fn rep_labels_span_the_cycle() {
        assert_eq!(Database::Db1.info().rep_labels().len(), 10);
        assert_eq!(Database::Db2.info().rep_labels(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(DbInfo::to_indices(&[6, 8, 10]), vec![5, 7, 9]);
    }

    #[test]
    fn final_db2_session_uses_the_sparse_table_on_raw_streams() {
        let plan = Database::Db2.session_plan();
        assert_eq!(plan.sessions.len(), 3);
        let last = &plan.sessions[2];
        assert_eq!(last.streams, StreamKind::Raw);
        assert!(last.clear_final_sample);
        assert!(matches!(last.remap, RemapRule::Table(_)));
    }
}
