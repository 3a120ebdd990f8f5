use crate::classifiers::proximity_tree::split::{CandidatePool, Split, SplitBuildCursor, SplitOptions};
use crate::classifiers::proximity_tree::split_criteria::SplitCriterion;
use crate::core::instances::TimeSeriesInstances;
use crate::error::TreeError;
use log::{debug, trace};
use rand::Rng;

/// The winning split and what it cost to find it.
#[derive(Debug)]
pub struct SplitSelection {
    pub split: Split,
    pub score: f64,
    /// Instances assigned across all candidates.
    pub steps: usize,
    pub eliminated: usize,
}

/// Builds `r` candidate splits over `unbuilt`'s data and returns the best.
///
/// Candidate `i` draws from its own stream, seeded by the `i`-th value taken
/// from `rng`, so both modes see identical candidates. With
/// `early_abandon_splits` the candidates race one instance at a time and
/// those whose bounds show they cannot win stop early.
pub fn select_best_split<R: Rng + ?Sized>(
    unbuilt: &Split,
    data: &TimeSeriesInstances,
    options: &SplitOptions,
    criterion: &dyn SplitCriterion,
    r: usize,
    early_abandon_splits: bool,
    rng: &mut R,
) -> Result<SplitSelection, TreeError> {
    if r == 0 {
        return Err(TreeError::Configuration("r must be at least 1".into()));
    }
    let seeds: Vec<u64> = (0..r).map(|_| rng.random()).collect();
    let selection = if early_abandon_splits {
        tournament(unbuilt, data, options, criterion, &seeds, rng)?
    } else {
        sequential(unbuilt, data, options, criterion, &seeds)?
    };
    debug!(
        "selected split over {} instances: mode={} candidates={} steps={} eliminated={} score={:.6}",
        unbuilt.len(),
        if early_abandon_splits { "tournament" } else { "sequential" },
        r,
        selection.steps,
        selection.eliminated,
        selection.score
    );
    Ok(selection)
}

fn sequential(
    unbuilt: &Split,
    data: &TimeSeriesInstances,
    options: &SplitOptions,
    criterion: &dyn SplitCriterion,
    seeds: &[u64],
) -> Result<SplitSelection, TreeError> {
    let mut best: Option<(f64, Split)> = None;
    let mut steps = 0;
    for &seed in seeds {
        let mut cursor = SplitBuildCursor::begin(unbuilt.fresh(), data, options, seed)?;
        steps += cursor.finish(data)?;
        let score = cursor.split().score(criterion)?;
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, cursor.into_split()));
        }
    }
    let (score, split) = best.ok_or(TreeError::Exhausted)?;
    Ok(SplitSelection {
        split,
        score,
        steps,
        eliminated: 0,
    })
}

fn tournament<R: Rng + ?Sized>(
    unbuilt: &Split,
    data: &TimeSeriesInstances,
    options: &SplitOptions,
    criterion: &dyn SplitCriterion,
    seeds: &[u64],
    rng: &mut R,
) -> Result<SplitSelection, TreeError> {
    let mut cursors = Vec::with_capacity(seeds.len());
    let mut pool = CandidatePool::new();
    for (i, &seed) in seeds.iter().enumerate() {
        let cursor = SplitBuildCursor::begin(unbuilt.fresh(), data, options, seed)?;
        pool.insert(i, cursor.split().best_potential_score(criterion)?);
        cursors.push(cursor);
    }

    // (score, candidate) of the best split built to completion so far
    let mut best: Option<(f64, usize)> = None;
    let mut steps = 0;
    let mut eliminated = 0;
    while let Some((i, before)) = pool.pop_best(rng) {
        let cursor = &mut cursors[i];
        if cursor.has_next() {
            cursor.advance(data)?;
            steps += 1;
        }
        let optimistic = cursor.split().best_potential_score(criterion)?;
        let pessimistic = cursor.split().worst_potential_score(criterion)?;
        let finished = !cursor.has_next();

        if optimistic >= before {
            let dropped = pool.retain(|_, bound| bound > pessimistic);
            for &j in &dropped {
                trace!("candidate {j} dropped: bound at most candidate {i}'s worst {pessimistic:.6}");
                cursors[j].eliminate();
            }
            eliminated += dropped.len();
        } else {
            let beaten_by_complete = best.is_some_and(|(score, _)| optimistic <= score);
            let beaten_by_live = pool.iter().try_fold(false, |beaten, (j, _)| {
                if beaten {
                    return Ok(true);
                }
                cursors[j]
                    .split()
                    .worst_potential_score(criterion)
                    .map(|worst| optimistic <= worst)
            })?;
            if beaten_by_complete || beaten_by_live {
                trace!("candidate {i} eliminated at bound {optimistic:.6}");
                cursors[i].eliminate();
                eliminated += 1;
                continue;
            }
        }

        if finished {
            let score = cursors[i].split().score(criterion)?;
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, i));
            }
        } else {
            pool.insert(i, optimistic);
        }
    }

    let (score, winner) = best.ok_or_else(|| {
        TreeError::Invariant("every candidate split was eliminated".into())
    })?;
    let split = cursors.swap_remove(winner).into_split();
    Ok(SplitSelection {
        split,
        score,
        steps,
        eliminated,
    })
}
