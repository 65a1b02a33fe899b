use thiserror::Error;

/// Error type shared by every preprocessing stage.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("signal has {signal} samples but label stream has {labels}")]
    LengthMismatch { signal: usize, labels: usize },
    #[error("channel count mismatch between sessions: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
    #[error("movement stream contains no rest/movement transitions")]
    NoTransitions,
    #[error("remapped movement id {0} does not fit the i8 label range")]
    LabelOverflow(i32),
    #[error("movement id {0} has no entry in the session remap table")]
    UnmappedLabel(i8),
    #[error("nb_test ({nb_test}) must be at least 1 and smaller than the repetition count ({nb_reps})")]
    NotEnoughReps { nb_test: usize, nb_reps: usize },
    #[error("requested {requested} splits but only {available} unused combinations exist")]
    NotEnoughCombinations { requested: usize, available: usize },
    #[error("base test set {0:?} is not one of the enumerated combinations")]
    BaseNotFound(Vec<i8>),
    #[error("no occurrences of value {0} in the reference array")]
    NoMatches(i8),
    #[error("window length and increment must both be nonzero (got {len} / {inc})")]
    WindowParams { len: usize, inc: usize },
    #[error("label {label} outside the {nb_classes}-class range")]
    ClassOutOfRange { label: i8, nb_classes: usize },
    #[error("subject {subject} is out of range for {database} (1..={max})")]
    SubjectOutOfRange {
        subject: usize,
        database: &'static str,
        max: usize,
    },
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("session source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}
