//! Grid-search calibration against labelled recordings
//!
//! Runs the attack estimator over a good (clean attack) and a bad (dirty
//! attack) corpus for every point of a [`ParameterGrid`], and scores how well
//! each point separates the two duration populations.
//!
//! Algorithm:
//! 1. Decode every recording and build its spectrogram once. The grid never
//!    varies the spectrogram settings, so this work is shared by all points.
//! 2. Validate the configuration of every grid point before any analysis.
//! 3. Detect the onset of every recording once per distinct onset ratio, and
//!    track pitch once per distinct (recording, onset frame). Pitch tracking
//!    dominates the cost and ignores the other three parameters.
//! 4. Evaluate grid points in parallel (rayon), fusing cached pitch with
//!    peakiness. Each point yields one immutable [`CalibrationRow`]; rows
//!    come back in grid order.
//! 5. Per-file failures are recorded in the row (duration absent, error flag
//!    set) and excluded from the score. They never abort the sweep.
//!
//! # Example
//!
//! ```no_run
//! use attack_time::calibration::{sweep, Corpus, ParameterGrid};
//! use attack_time::{AttackConfig, YinEstimator};
//!
//! let config = AttackConfig::default();
//! let corpus = Corpus::load(&["good/a.wav"], &["bad/b.wav"], &config)?;
//! let rows = sweep(&corpus, &ParameterGrid::default(), &YinEstimator::default())?;
//! println!("{} grid points", rows.len());
//! # Ok::<(), attack_time::AttackError>(())
//! ```

pub mod cost;

pub use cost::{separation_score, SeparationScore};

use crate::analysis::series::TimeSeries;
use crate::config::AttackConfig;
use crate::error::AttackError;
use crate::estimator::AttackEstimator;
use crate::features::onset::{detect_onset, Onset};
use crate::features::pitch::{PitchEstimator, YinEstimator};
use crate::features::spectrogram::Spectrogram;
use crate::io::waveform::Waveform;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f32, end: f32, n: usize) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f32;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f32 })
                .collect()
        }
    }
}

/// Value lists for the four calibrated parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    /// Onset energy ratios (default: 8 values from 0.2 to 0.6)
    pub onset_energy_ratios: Vec<f32>,
    /// Peak energy thresholds (default: 8 values from 0.3 to 0.75)
    pub peak_energy_thresholds: Vec<f32>,
    /// Peakiness rolling windows in frames (default: 15, 20, 25, 30)
    pub rolling_windows: Vec<usize>,
    /// Peak counts (default: 3, 4, 5, 6)
    pub peak_counts: Vec<usize>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            onset_energy_ratios: linspace(0.2, 0.6, 8),
            peak_energy_thresholds: linspace(0.3, 0.75, 8),
            rolling_windows: vec![15, 20, 25, 30],
            peak_counts: vec![3, 4, 5, 6],
        }
    }
}

impl ParameterGrid {
    /// Number of grid points
    pub fn len(&self) -> usize {
        self.onset_energy_ratios.len()
            * self.peak_energy_thresholds.len()
            * self.rolling_windows.len()
            * self.peak_counts.len()
    }

    /// Whether any axis is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product of the axes, onset ratio varying slowest
    pub fn points(&self) -> Vec<GridPoint> {
        let mut points = Vec::with_capacity(self.len());
        for &onset_energy_ratio in &self.onset_energy_ratios {
            for &peak_energy_threshold in &self.peak_energy_thresholds {
                for &rolling_window in &self.rolling_windows {
                    for &peak_count in &self.peak_counts {
                        points.push(GridPoint {
                            onset_energy_ratio,
                            peak_energy_threshold,
                            rolling_window,
                            peak_count,
                        });
                    }
                }
            }
        }
        points
    }
}

/// One combination of calibrated parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Onset threshold relative to mean frame energy
    pub onset_energy_ratio: f32,
    /// Peakiness stability threshold
    pub peak_energy_threshold: f32,
    /// Peakiness rolling window in frames
    pub rolling_window: usize,
    /// Spectral peaks summed per frame
    pub peak_count: usize,
}

impl GridPoint {
    /// `base` with this point's parameters substituted
    pub fn apply(&self, base: &AttackConfig) -> AttackConfig {
        AttackConfig {
            onset_energy_ratio: self.onset_energy_ratio,
            peak_energy_threshold: self.peak_energy_threshold,
            rolling_window: self.rolling_window,
            peak_count: self.peak_count,
            ..base.clone()
        }
    }
}

/// Corpus membership of a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Clean attack
    Good,
    /// Dirty attack
    Bad,
}

/// A labelled recording, decoded and transformed once
#[derive(Debug)]
pub struct Recording {
    name: String,
    label: Label,
    prepared: Result<(Waveform, Spectrogram), AttackError>,
}

impl Recording {
    /// Name used as the duration key in calibration rows
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Corpus membership
    pub fn label(&self) -> Label {
        self.label
    }

    /// Failure from decoding or spectrogram construction, if any
    pub fn error(&self) -> Option<&AttackError> {
        self.prepared.as_ref().err()
    }
}

/// Good and bad recordings prepared for a sweep
#[derive(Debug)]
pub struct Corpus {
    config: AttackConfig,
    recordings: Vec<Recording>,
}

impl Corpus {
    /// Decode good and bad files and build their spectrograms
    ///
    /// Unreadable or too-short files are kept with their error so that every
    /// row reports them. Files are keyed by their path as given.
    ///
    /// # Errors
    ///
    /// Returns `AttackError::Configuration` if `config` is invalid, and
    /// `AttackError::InvalidInput` if two files share a name.
    pub fn load<P: AsRef<Path> + Sync>(good: &[P], bad: &[P], config: &AttackConfig) -> Result<Self, AttackError> {
        let estimator = AttackEstimator::new(config.clone())?;
        let labelled: Vec<(Label, &P)> = good
            .iter()
            .map(|p| (Label::Good, p))
            .chain(bad.iter().map(|p| (Label::Bad, p)))
            .collect();

        let recordings = labelled
            .par_iter()
            .map(|&(label, path)| {
                let path = path.as_ref();
                let prepared = Waveform::from_file(path).and_then(|waveform| {
                    let spectrogram = estimator.spectrogram(&waveform)?;
                    Ok((waveform, spectrogram))
                });
                if let Err(e) = &prepared {
                    log::warn!("Calibration: {} will be excluded: {}", path.display(), e);
                }
                Recording {
                    name: path.display().to_string(),
                    label,
                    prepared,
                }
            })
            .collect();

        Self::from_recordings(recordings, config)
    }

    /// Prepare already decoded waveforms, given as `(name, waveform)` pairs
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load).
    pub fn from_waveforms(
        good: Vec<(String, Waveform)>,
        bad: Vec<(String, Waveform)>,
        config: &AttackConfig,
    ) -> Result<Self, AttackError> {
        let estimator = AttackEstimator::new(config.clone())?;
        let recordings = good
            .into_iter()
            .map(|(name, w)| (Label::Good, name, w))
            .chain(bad.into_iter().map(|(name, w)| (Label::Bad, name, w)))
            .map(|(label, name, waveform)| {
                let prepared = estimator
                    .spectrogram(&waveform)
                    .map(|spectrogram| (waveform, spectrogram));
                Recording {
                    name,
                    label,
                    prepared,
                }
            })
            .collect();

        Self::from_recordings(recordings, config)
    }

    fn from_recordings(recordings: Vec<Recording>, config: &AttackConfig) -> Result<Self, AttackError> {
        let mut seen = std::collections::HashSet::new();
        for recording in &recordings {
            if !seen.insert(recording.name.as_str()) {
                return Err(AttackError::InvalidInput(format!(
                    "Duplicate recording name in corpus: {}",
                    recording.name
                )));
            }
        }

        log::debug!(
            "Calibration corpus: {} good, {} bad, {} unusable",
            recordings.iter().filter(|r| r.label == Label::Good).count(),
            recordings.iter().filter(|r| r.label == Label::Bad).count(),
            recordings.iter().filter(|r| r.prepared.is_err()).count()
        );

        Ok(Self {
            config: config.clone(),
            recordings,
        })
    }

    /// Configuration the spectrograms were built with
    pub fn config(&self) -> &AttackConfig {
        &self.config
    }

    /// All recordings, good first, in input order
    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    /// Number of recordings
    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    /// Whether the corpus has no recordings
    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }
}

/// Outcome of one grid point
///
/// Serialises flat: the four parameters, then `durations` (recording name to
/// duration in ms, `null` on failure), `any_error` (0 or 1) and `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRow {
    /// Parameters evaluated
    #[serde(flatten)]
    pub parameters: GridPoint,
    /// Attack duration per recording
    pub durations: BTreeMap<String, Option<u64>>,
    /// 1 if any recording failed at this grid point, else 0
    pub any_error: u8,
    /// Separation of good and bad durations
    pub score: SeparationScore,
}

/// Evaluate every grid point over the corpus
///
/// Grid points are evaluated in parallel on the current rayon pool. The
/// corpus configuration supplies every non-grid parameter.
///
/// # Errors
///
/// Returns `AttackError::Configuration` if any grid point yields an invalid
/// configuration. Per-file failures are recorded in the rows instead.
pub fn sweep<E: PitchEstimator>(
    corpus: &Corpus,
    grid: &ParameterGrid,
    pitch_estimator: &E,
) -> Result<Vec<CalibrationRow>, AttackError> {
    let points = grid.points();
    let estimators = points
        .iter()
        .map(|point| AttackEstimator::with_pitch_estimator(point.apply(corpus.config()), pitch_estimator))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "Calibration sweep: {} grid points x {} recordings",
        points.len(),
        corpus.len()
    );

    let cache = PitchCache::build(
        corpus,
        &points,
        &AttackEstimator::with_pitch_estimator(corpus.config().clone(), pitch_estimator)?,
    );

    let rows: Vec<CalibrationRow> = points
        .par_iter()
        .zip(estimators.par_iter())
        .map(|(point, estimator)| evaluate_point(corpus, &cache, point, estimator))
        .collect();

    let failed = rows.iter().filter(|r| r.any_error != 0).count();
    if failed > 0 {
        log::debug!("Calibration sweep: {} of {} grid points had failures", failed, rows.len());
    }

    Ok(rows)
}

/// Sweep with the default YIN pitch tracker
pub fn sweep_default(corpus: &Corpus, grid: &ParameterGrid) -> Result<Vec<CalibrationRow>, AttackError> {
    sweep(corpus, grid, &YinEstimator::default())
}

type PitchTrack = Result<TimeSeries<Option<f32>>, AttackError>;

/// Onsets per (recording, onset ratio) and pitch per (recording, onset frame)
struct PitchCache {
    onsets: HashMap<(usize, u32), Result<Onset, AttackError>>,
    pitch: HashMap<(usize, usize), PitchTrack>,
}

impl PitchCache {
    fn build<E: PitchEstimator>(
        corpus: &Corpus,
        points: &[GridPoint],
        estimator: &AttackEstimator<E>,
    ) -> Self {
        let mut ratios: Vec<f32> = points.iter().map(|p| p.onset_energy_ratio).collect();
        ratios.sort_by(|a, b| a.total_cmp(b));
        ratios.dedup_by(|a, b| a.to_bits() == b.to_bits());

        let onsets: HashMap<(usize, u32), Result<Onset, AttackError>> = corpus
            .recordings()
            .par_iter()
            .enumerate()
            .flat_map_iter(|(index, recording)| {
                ratios.iter().map(move |&ratio| {
                    let onset = recording.prepared.as_ref().map_err(Clone::clone).and_then(
                        |(waveform, spectrogram)| {
                            estimator.check_spectrogram(waveform, spectrogram)?;
                            detect_onset(spectrogram, ratio)
                        },
                    );
                    ((index, ratio.to_bits()), onset)
                })
            })
            .collect();

        let mut frames: Vec<(usize, usize)> = onsets
            .iter()
            .filter_map(|(&(index, _), onset)| onset.as_ref().ok().map(|o| (index, o.frame)))
            .collect();
        frames.sort_unstable();
        frames.dedup();

        let recordings = corpus.recordings();
        let pitch: HashMap<(usize, usize), PitchTrack> = frames
            .par_iter()
            .filter_map(|&(index, frame)| {
                let (waveform, _) = recordings[index].prepared.as_ref().ok()?;
                Some(((index, frame), estimator.pitch_after_onset(waveform, frame)))
            })
            .collect();

        log::debug!(
            "Calibration sweep: {} onset ratios, {} pitch tracks for {} grid points",
            ratios.len(),
            pitch.len(),
            points.len()
        );

        Self { onsets, pitch }
    }

    fn lookup(
        &self,
        recording: usize,
        ratio: f32,
    ) -> Result<(Onset, &TimeSeries<Option<f32>>), AttackError> {
        let onset = self
            .onsets
            .get(&(recording, ratio.to_bits()))
            .ok_or_else(|| AttackError::InvalidInput(format!("No onset cached for ratio {}", ratio)))?
            .clone()?;
        let pitch = self
            .pitch
            .get(&(recording, onset.frame))
            .ok_or_else(|| {
                AttackError::InvalidInput(format!("No pitch cached for onset frame {}", onset.frame))
            })?
            .as_ref()
            .map_err(Clone::clone)?;
        Ok((onset, pitch))
    }
}

fn evaluate_point<E: PitchEstimator>(
    corpus: &Corpus,
    cache: &PitchCache,
    point: &GridPoint,
    estimator: &AttackEstimator<E>,
) -> CalibrationRow {
    let mut durations = BTreeMap::new();
    let mut good = Vec::new();
    let mut bad = Vec::new();
    let mut any_error = false;

    for (index, recording) in corpus.recordings().iter().enumerate() {
        let outcome = recording
            .prepared
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|(_, spectrogram)| {
                let (onset, pitch) = cache.lookup(index, point.onset_energy_ratio)?;
                estimator.analyze_with_pitch(spectrogram, &onset, pitch.clone())
            })
            .map(|analysis| analysis.result.duration_ms);

        match outcome {
            Ok(duration_ms) => {
                match recording.label {
                    Label::Good => good.push(duration_ms as f64),
                    Label::Bad => bad.push(duration_ms as f64),
                }
                durations.insert(recording.name.clone(), Some(duration_ms));
            }
            Err(e) => {
                log::debug!("Calibration {:?}: {} failed: {}", point, recording.name, e);
                any_error = true;
                durations.insert(recording.name.clone(), None);
            }
        }
    }

    CalibrationRow {
        parameters: *point,
        durations,
        any_error: u8::from(any_error),
        score: separation_score(&good, &bad),
    }
}
