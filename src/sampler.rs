//! Stratified random sampling of the directory.
//!
//! The listing is split into US and non-US papers, each group is shuffled,
//! a quota is drawn from each, and the union is shuffled again so the posting
//! order mixes both groups.

use crate::models::PaperListing;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

/// Per-group quotas for a sample of `n` papers with `usa_proportion` from the USA.
///
/// Both quotas round down, so they may sum to less than `n`.
pub fn quotas(n: usize, usa_proportion: f64) -> (usize, usize) {
    let usa = (n as f64 * usa_proportion).floor() as usize;
    let world = (n as f64 * (1.0 - usa_proportion)).floor() as usize;
    (usa, world)
}

/// Draw a stratified random sample from `papers`.
///
/// A group smaller than its quota contributes everything it has; the sample is
/// never padded from the other group.
pub fn sample_papers<R: Rng + ?Sized>(
    papers: Vec<PaperListing>,
    n: usize,
    usa_proportion: f64,
    rng: &mut R,
) -> Vec<PaperListing> {
    let total = papers.len();
    let (mut usa, mut world): (Vec<_>, Vec<_>) = papers.into_iter().partition(PaperListing::is_usa);
    info!(
        total,
        usa = usa.len(),
        world = world.len(),
        "Partitioned papers by origin"
    );

    let (usa_quota, world_quota) = quotas(n, usa_proportion);

    usa.shuffle(rng);
    usa.truncate(usa_quota);
    world.shuffle(rng);
    world.truncate(world_quota);

    let (usa_count, world_count) = (usa.len(), world.len());
    let mut sample = usa;
    sample.append(&mut world);
    sample.shuffle(rng);

    info!(
        sampled = sample.len(),
        usa = usa_count,
        world = world_count,
        "Sampled papers"
    );
    sample
}
