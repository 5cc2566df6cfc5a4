//! Bounded worker pool for the rendering stage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;

use super::pipeline::CancelHandle;

/// Apply `work` to every item on at most `workers` scoped threads.
///
/// Results land in the slot of their item, so the output order matches
/// `items` whatever order the work finishes in. Once `cancel` is set no new
/// item is started, and results finishing afterwards are discarded; their
/// slots stay `None`.
pub fn run_ordered<T, R, F>(
    items: &[T],
    workers: usize,
    cancel: &CancelHandle,
    work: F,
) -> Vec<Option<R>>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync,
{
    let workers = workers.max(1).min(items.len().max(1));
    let next = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<R>>> = Mutex::new((0..items.len()).map(|_| None).collect());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                if cancel.is_cancelled() {
                    break;
                }
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(item) = items.get(index) else {
                    break;
                };

                let result = work(index, item);
                if cancel.is_cancelled() {
                    break;
                }
                slots.lock()[index] = Some(result);
            });
        }
    });

    slots.into_inner()
}
