//! Run the whole preprocessing pipeline on a synthetic DB1-shaped subject and
//! print a JSON summary. Handy for eyeballing segmentation and split output
//! without the real dataset on disk; set RUST_LOG=debug for the audit trail.

use anyhow::Result;
use log::info;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use nina_prep::{
    gen_split_balanced_with, get_windows, import_subject, normalise_emg, Database, ManualSource,
    SessionRecording,
};

/// One synthetic session: rest / gesture / rest blocks with a mirrored raw
/// repetition stream, noisy ramp EMG.
fn synthetic_session(gestures: &[i8], channels: usize, block: usize) -> SessionRecording {
    let mut moves = vec![0i8; block];
    let mut rep = vec![0i8; block];
    for (i, &g) in gestures.iter().enumerate() {
        moves.extend(std::iter::repeat(g).take(block));
        rep.extend(std::iter::repeat((i % 10 + 1) as i8).take(block));
        moves.extend(std::iter::repeat(0i8).take(block));
        rep.extend(std::iter::repeat(0i8).take(block));
    }
    let len = moves.len();
    let emg = Array2::from_shape_fn((len, channels), |(i, c)| {
        let phase = i as f32 / 17.0 + c as f32;
        phase.sin() * (1.0 + moves[i].unsigned_abs() as f32)
    });
    SessionRecording {
        emg,
        rep: Array1::from(rep),
        moves: Array1::from(moves),
    }
}

#[derive(Serialize)]
struct Summary {
    database: String,
    samples: usize,
    channels: usize,
    movement_ids: Vec<i8>,
    repetition_blocks: usize,
    capped_boundaries: usize,
    first_regions: Vec<(usize, usize)>,
    windows: usize,
    window_shape: (usize, usize, usize),
    test_folds: Vec<Vec<i8>>,
}

fn main() -> Result<()> {
    env_logger::init();

    let db = Database::Db1;
    let mut source = ManualSource::new(vec![
        synthetic_session(&(1..=4).collect::<Vec<i8>>(), 10, 40),
        synthetic_session(&(1..=4).collect::<Vec<i8>>(), 10, 40),
        synthetic_session(&(1..=4).collect::<Vec<i8>>(), 10, 40),
    ]);

    let rec = import_subject(&mut source, db, 1, 5.0)?;
    info!(
        "imported {} samples across {} repetition blocks",
        rec.emg.nrows(),
        rec.rep_regions.len()
    );

    let rep_ids: Vec<i8> = {
        let mut ids: Vec<i8> = rec.rep.iter().copied().filter(|&r| r != 0).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    let mut rng = StdRng::seed_from_u64(42);
    let splits = gen_split_balanced_with(&rep_ids, 2, None, &mut rng)?;

    let emg = normalise_emg(
        rec.emg.view(),
        rec.rep.view(),
        &splits.train_reps[0],
        None,
        None,
    )?;
    let windows = get_windows(
        &splits.train_reps[0],
        15,
        5,
        emg.view(),
        rec.moves.view(),
        rec.rep.view(),
        None,
    )?;

    let mut movement_ids: Vec<i8> = rec.moves.iter().copied().filter(|&m| m != 0).collect();
    movement_ids.sort_unstable();
    movement_ids.dedup();

    let summary = Summary {
        database: db.name().to_string(),
        samples: rec.emg.nrows(),
        channels: rec.emg.ncols(),
        movement_ids,
        repetition_blocks: rec.rep_regions.len(),
        capped_boundaries: rec.nb_capped,
        first_regions: rec.rep_regions.iter().take(4).copied().collect(),
        windows: windows.x.dim().0,
        window_shape: windows.x.dim(),
        test_folds: splits.test_reps,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
