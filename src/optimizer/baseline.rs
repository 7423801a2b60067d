//! Monte-Carlo baselines: for every (slot, result band) the mean and spread
//! of times posted by randomly drawn legal teams. Scores compare a team only
//! against teams of its own band.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{Composition, ResultBand, Slot, BAND_COUNT};
use crate::optimizer::eligibility::{eligible_for_slot, partition_by_gender};
use crate::optimizer::meet::Meet;
use crate::optimizer::rng::Rng;
use crate::optimizer::team_builder::build_team;
use crate::parallel::{progress_batches, WorkerPool};

/// Progress batches used while generating baselines.
const BASELINE_PROGRESS_BATCH_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub samples: usize,
}

impl Baseline {
    /// `None` when fewer than `min_samples` times were collected.
    pub fn from_samples(times: &[f64], min_samples: usize) -> Option<Self> {
        if times.is_empty() || times.len() < min_samples {
            return None;
        }
        let n = times.len() as f64;
        let mean = times.iter().sum::<f64>() / n;
        let variance = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            samples: times.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineEntry {
    pub slot_id: u32,
    pub band: ResultBand,
    #[serde(flatten)]
    pub baseline: Baseline,
}

#[derive(Debug, Clone, Default)]
pub struct BaselineTable {
    by_slot: HashMap<u32, [Option<Baseline>; BAND_COUNT]>,
}

impl BaselineTable {
    pub fn get(&self, slot_id: u32, band: ResultBand) -> Option<&Baseline> {
        self.by_slot
            .get(&slot_id)
            .and_then(|bands| bands[band.index()].as_ref())
    }

    pub fn insert(&mut self, slot_id: u32, band: ResultBand, baseline: Baseline) {
        self.by_slot.entry(slot_id).or_insert([None; BAND_COUNT])[band.index()] = Some(baseline);
    }

    pub fn len(&self) -> usize {
        self.by_slot.values().flatten().filter(|b| b.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries ordered by slot id, then band.
    pub fn entries(&self) -> Vec<BaselineEntry> {
        let mut slot_ids: Vec<u32> = self.by_slot.keys().copied().collect();
        slot_ids.sort_unstable();
        let mut entries = Vec::new();
        for slot_id in slot_ids {
            for band in ResultBand::ALL {
                if let Some(baseline) = self.get(slot_id, band) {
                    entries.push(BaselineEntry {
                        slot_id,
                        band,
                        baseline: *baseline,
                    });
                }
            }
        }
        entries
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BaselineSettings {
    pub samples: usize,
    pub retry_cap: usize,
    pub min_samples: usize,
    pub parallel: bool,
    pub seed: u64,
}

impl Default for BaselineSettings {
    fn default() -> Self {
        Self {
            samples: 100,
            retry_cap: 50,
            min_samples: 10,
            parallel: true,
            seed: 0,
        }
    }
}

/// Eligible pool for one slot, pre-split for 2+2 draws.
#[derive(Debug)]
struct SlotPool {
    flat: Vec<usize>,
    male: Vec<usize>,
    female: Vec<usize>,
}

pub fn generate_baselines(meet: &Meet<'_>, settings: &BaselineSettings) -> BaselineTable {
    generate_baselines_with_progress(meet, settings, &WorkerPool::default(), |_, _| {})
}

/// Like [generate_baselines] but runs in batches and calls `on_progress(done, total)`
/// with (slot, band) work items completed. Output does not depend on `parallel`
/// or the worker count: each item draws from its own derived stream.
pub fn generate_baselines_with_progress<F>(
    meet: &Meet<'_>,
    settings: &BaselineSettings,
    pool: &WorkerPool,
    mut on_progress: F,
) -> BaselineTable
where
    F: FnMut(usize, usize),
{
    let pools: Vec<SlotPool> = meet
        .slots
        .iter()
        .map(|slot| {
            let flat = eligible_for_slot(meet, slot);
            let (male, female) = partition_by_gender(meet, &flat);
            SlotPool { flat, male, female }
        })
        .collect();

    let work: Vec<(usize, ResultBand)> = (0..meet.slots.len())
        .flat_map(|slot_pos| ResultBand::ALL.into_iter().map(move |band| (slot_pos, band)))
        .collect();
    let total = work.len();
    info!(slots = meet.slots.len(), work_items = total, parallel = settings.parallel, "generating baselines");
    on_progress(0, total);

    let run_one = |&(slot_pos, band): &(usize, ResultBand)| {
        let slot = &meet.slots[slot_pos];
        let mut rng = Rng::derive(settings.seed, stream_id(slot.id, band));
        let times = sample_band(meet, slot, &pools[slot_pos], band, settings, &mut rng);
        (slot.id, band, Baseline::from_samples(&times, settings.min_samples))
    };

    let mut table = BaselineTable::default();
    for (batch, done) in progress_batches(&work, BASELINE_PROGRESS_BATCH_COUNT) {
        let results: Vec<(u32, ResultBand, Option<Baseline>)> = if settings.parallel {
            pool.install(|| batch.par_iter().map(run_one).collect())
        } else {
            batch.iter().map(run_one).collect()
        };
        for (slot_id, band, baseline) in results {
            match baseline {
                Some(baseline) => table.insert(slot_id, band, baseline),
                None => debug!(slot = slot_id, band = %band, "too few samples, band left without baseline"),
            }
        }
        on_progress(done, total);
    }

    info!(baselines = table.len(), "baselines ready");
    table
}

/// Times of up to `settings.samples` distinct random legal teams landing in
/// `band`. A quartet drawn twice is only recorded once.
fn sample_band(
    meet: &Meet<'_>,
    slot: &Slot,
    pool: &SlotPool,
    band: ResultBand,
    settings: &BaselineSettings,
    rng: &mut Rng,
) -> Vec<f64> {
    let mut times = Vec::with_capacity(settings.samples);
    if !can_draw(slot, pool) {
        return times;
    }
    let mut seen: HashSet<[usize; 4]> = HashSet::new();
    for _ in 0..settings.samples {
        for _ in 0..settings.retry_cap {
            let Some(members) = draw_quartet(slot, pool, rng) else {
                return times;
            };
            let Ok(team) = build_team(meet, slot, members) else {
                continue;
            };
            let mut key = members;
            key.sort_unstable();
            if team.band == band && seen.insert(key) {
                times.push(team.time());
                break;
            }
        }
    }
    times
}

fn can_draw(slot: &Slot, pool: &SlotPool) -> bool {
    match slot.composition {
        Composition::Mixed => pool.male.len() >= 2 && pool.female.len() >= 2,
        Composition::Male | Composition::Female => pool.flat.len() >= 4,
    }
}

fn draw_quartet(slot: &Slot, pool: &SlotPool, rng: &mut Rng) -> Option<[usize; 4]> {
    match slot.composition {
        Composition::Mixed => {
            let male = rng.sample(&pool.male, 2)?;
            let female = rng.sample(&pool.female, 2)?;
            Some([male[0], male[1], female[0], female[1]])
        }
        Composition::Male | Composition::Female => {
            let picked = rng.sample(&pool.flat, 4)?;
            Some([picked[0], picked[1], picked[2], picked[3]])
        }
    }
}

fn stream_id(slot_id: u32, band: ResultBand) -> u64 {
    (u64::from(slot_id) << 8) | band.index() as u64
}
