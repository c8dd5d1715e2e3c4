use crate::identity::{IdentityOracle, IdentityRecord, Liveness};
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

/// Liveness answers shared by every fake process in a test.
///
/// Unregistered owners are `Unknown`. A scripted owner answers from its
/// queue front, repeating the last answer once the queue runs dry.
#[derive(Default)]
pub(crate) struct FakeWorld {
    answers: Mutex<HashMap<IdentityRecord, VecDeque<Liveness>>>,
    delays: Mutex<HashMap<IdentityRecord, Duration>>,
    hooks: Mutex<HashMap<IdentityRecord, QueryHook>>,
    queries: AtomicUsize,
}

type QueryHook = Box<dyn FnOnce() + Send>;

impl FakeWorld {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn set(&self, owner: &IdentityRecord, liveness: Liveness) {
        self.script(owner, &[liveness]);
    }

    pub(crate) fn script(&self, owner: &IdentityRecord, answers: &[Liveness]) {
        lock(&self.answers).insert(owner.clone(), answers.iter().copied().collect());
    }

    /// Make liveness queries about `owner` take `delay`.
    pub(crate) fn slow_down(&self, owner: &IdentityRecord, delay: Duration) {
        lock(&self.delays).insert(owner.clone(), delay);
    }

    /// Run `hook` once, during the next liveness query about `owner`.
    pub(crate) fn on_query(&self, owner: &IdentityRecord, hook: impl FnOnce() + Send + 'static) {
        lock(&self.hooks).insert(owner.clone(), Box::new(hook));
    }

    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

/// An oracle for a fake process with identity `me`, registered as alive.
pub(crate) fn fake_process(world: &Arc<FakeWorld>, me: IdentityRecord) -> Arc<dyn IdentityOracle> {
    world.set(&me, Liveness::Alive);
    Arc::new(FakeOracle {
        me,
        world: Arc::clone(world),
    })
}

struct FakeOracle {
    me: IdentityRecord,
    world: Arc<FakeWorld>,
}

impl IdentityOracle for FakeOracle {
    fn current_identity(&self) -> IdentityRecord {
        self.me.clone()
    }

    fn liveness(&self, record: &IdentityRecord) -> Liveness {
        self.world.queries.fetch_add(1, Ordering::SeqCst);

        let delay = lock(&self.world.delays).get(record).copied();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let hook = lock(&self.world.hooks).remove(record);
        if let Some(hook) = hook {
            hook();
        }

        let mut answers = lock(&self.world.answers);
        match answers.get_mut(record) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Liveness::Unknown),
            Some(queue) => queue.front().copied().unwrap_or(Liveness::Unknown),
            None => Liveness::Unknown,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison| poison.into_inner())
}

/// Write claim content as if another process held the lock.
pub(crate) fn write_claim(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}

/// Set the modification time of `path` to `age` ago.
pub(crate) fn backdate(path: &Path, age: Duration) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}
