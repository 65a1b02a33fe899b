use std::collections::VecDeque;

use log::info;
use ndarray::{concatenate, Array1, Array2, Axis};

use crate::database::{Database, SessionSpec};
use crate::error::PrepError;
use crate::remap::remap_session;
use crate::segment::segment_repetitions;

/// Error type of the external session reader.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Raw per-session triple as handed over by the external `.mat` reader.
#[derive(Clone, Debug)]
pub struct SessionRecording {
    /// samples x channels.
    pub emg: Array2<f32>,
    pub rep: Array1<i8>,
    pub moves: Array1<i8>,
}

impl SessionRecording {
    pub fn validate(&self) -> Result<(), PrepError> {
        let signal = self.emg.nrows();
        if self.rep.len() != signal || self.moves.len() != signal {
            return Err(PrepError::LengthMismatch {
                signal,
                labels: self.rep.len().min(self.moves.len()),
            });
        }
        Ok(())
    }
}

/// External collaborator that reads one session file for a subject. The
/// `spec` tells the reader which label streams the session carries (see
/// [`crate::database::StreamKind`]); file naming follows
/// [`Database::session_file`].
pub trait SessionSource {
    fn load_session(
        &mut self,
        db: Database,
        subject: usize,
        session: usize,
        spec: &SessionSpec,
    ) -> Result<SessionRecording, SourceError>;
}

/// In-memory source useful for tests and synthetic playback.
pub struct ManualSource {
    queue: VecDeque<SessionRecording>,
}

impl ManualSource {
    pub fn new(sessions: impl IntoIterator<Item = SessionRecording>) -> Self {
        Self {
            queue: sessions.into_iter().collect(),
        }
    }
}

impl SessionSource for ManualSource {
    fn load_session(
        &mut self,
        _db: Database,
        _subject: usize,
        _session: usize,
        _spec: &SessionSpec,
    ) -> Result<SessionRecording, SourceError> {
        self.queue
            .pop_front()
            .ok_or_else(|| "manual source ran out of sessions".into())
    }
}

/// Fully imported and re-segmented subject recording.
#[derive(Clone, Debug)]
pub struct SegmentedRecording {
    pub emg: Array2<f32>,
    /// Derived cyclic repetition labels (0 = unassigned).
    pub rep: Array1<i8>,
    /// Concatenated movement labels, globally unique across sessions.
    pub moves: Array1<i8>,
    /// Inclusive block bounds, one per derived repetition.
    pub rep_regions: Vec<(usize, usize)>,
    /// Count of capped block boundaries; always even.
    pub nb_capped: usize,
}

/// Load, remap, concatenate and re-segment every session of one subject.
///
/// `rest_length_cap_secs` bounds how much rest is kept on each side of a
/// gesture; pass something large (the original used 999) to keep everything.
pub fn import_subject<S: SessionSource>(
    source: &mut S,
    db: Database,
    subject: usize,
    rest_length_cap_secs: f64,
) -> Result<SegmentedRecording, PrepError> {
    let db_info = db.info();
    if subject == 0 || subject > db_info.nb_subjects {
        return Err(PrepError::SubjectOutOfRange {
            subject,
            database: db.name(),
            max: db_info.nb_subjects,
        });
    }

    let plan = db.session_plan();
    let mut emg_parts: Vec<Array2<f32>> = Vec::with_capacity(plan.sessions.len());
    let mut rep_parts: Vec<Array1<i8>> = Vec::with_capacity(plan.sessions.len());
    let mut move_parts: Vec<Array1<i8>> = Vec::with_capacity(plan.sessions.len());
    let mut running_max: i8 = 0;

    for (k, spec) in plan.sessions.iter().enumerate() {
        let mut rec = source
            .load_session(db, subject, k + 1, spec)
            .map_err(PrepError::Source)?;
        rec.validate()?;
        if let Some(first) = emg_parts.first() {
            if rec.emg.ncols() != first.ncols() {
                return Err(PrepError::ChannelMismatch {
                    expected: first.ncols(),
                    actual: rec.emg.ncols(),
                });
            }
        }
        if spec.clear_final_sample {
            if let Some(last) = rec.moves.last_mut() {
                *last = 0;
            }
            if let Some(last) = rec.rep.last_mut() {
                *last = 0;
            }
        }
        let remapped = remap_session(rec.moves.view(), &spec.remap, running_max)?;
        running_max = remapped
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .max(running_max);

        emg_parts.push(rec.emg);
        rep_parts.push(rec.rep);
        move_parts.push(remapped);
    }

    let emg_views: Vec<_> = emg_parts.iter().map(|a| a.view()).collect();
    let emg = concatenate(Axis(0), &emg_views)?;
    let raw_rep = concatenate(
        Axis(0),
        &rep_parts.iter().map(|a| a.view()).collect::<Vec<_>>(),
    )?;
    let moves = concatenate(
        Axis(0),
        &move_parts.iter().map(|a| a.view()).collect::<Vec<_>>(),
    )?;

    let seg = segment_repetitions(
        moves.view(),
        raw_rep.view(),
        db_info.fs,
        rest_length_cap_secs,
    )?;
    info!(
        "{} subject {subject}: {} samples, {} repetition blocks, {} capped boundaries",
        db.name(),
        emg.nrows(),
        seg.rep_regions.len(),
        seg.nb_capped
    );

    Ok(SegmentedRecording {
        emg,
        rep: seg.rep,
        moves,
        rep_regions: seg.rep_regions,
        nb_capped: seg.nb_capped,
    })
}
