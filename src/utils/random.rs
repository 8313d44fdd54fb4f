use rand::seq::SliceRandom;

/// In-place Fisher-Yates shuffle.
pub fn shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut rand::thread_rng());
}

/// Picks `count` items uniformly at random without replacement; returns every
/// item (in random order) when fewer are available.
pub fn sample_without_replacement<T>(mut items: Vec<T>, count: usize) -> Vec<T> {
    items.shuffle(&mut rand::thread_rng());
    items.truncate(count);
    items
}
