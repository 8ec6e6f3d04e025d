//! A simulated [`Platform`] on which every core is a host thread.
//!
//! Divergence is modelled with unwinding: entering the kernel unwinds with [`EnteredKernel`] and
//! halting unwinds with [`Halted`], so a test can observe how a boot path ended.

use std::{
    boxed::Box,
    cell::Cell,
    ops::Range,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Condvar, Mutex, Once, Weak,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
    vec::Vec,
};

use boot_abi::{HartId, ImageInfo, KernelArguments, KernelEntry, PlatformDescriptor};

use crate::{
    boot::secondary_main,
    episode::{BootEpisode, HandoffInfo},
    platform::{LoadedImages, LoaderStatus, Platform, SecondaryEntry, StartError},
};

/// The entry address handed to started secondary cores in tests.
// SAFETY:
// Simulated cores run the secondary boot path directly and never execute this address.
pub const SECONDARY_ENTRY: SecondaryEntry = unsafe { SecondaryEntry::new(0x8020_0100) };

/// The kernel image every simulated load reports.
pub const KERNEL: ImageInfo = ImageInfo {
    phys_region_start: 0x8400_0000,
    phys_region_end: 0x8440_0000,
    virt_region_start: 0xFFFF_FFC0_0000_0000,
    virt_region_end: 0xFFFF_FFC0_0040_0000,
    virt_entry: 0xFFFF_FFC0_0000_0000,
    phys_virt_offset: 0x8400_0000_usize.wrapping_sub(0xFFFF_FFC0_0000_0000),
};

/// The user image every simulated load reports.
pub const USER: ImageInfo = ImageInfo {
    phys_region_start: 0x1000,
    phys_region_end: 0x2000,
    virt_region_start: 0x1000,
    virt_region_end: 0x2000,
    virt_entry: 0x1000,
    phys_virt_offset: 0,
};

/// The platform description every simulated load reports.
pub const DESCRIPTOR: PlatformDescriptor = PlatformDescriptor {
    address: 0x8220_0000,
    size: 0x2000,
};

/// Returns the result of a load that found `app_count` user images.
pub fn loaded_images(app_count: usize) -> LoadedImages {
    LoadedImages {
        kernel: KERNEL,
        user: USER,
        app_count,
        descriptor: DESCRIPTOR,
    }
}

/// Returns the [`HandoffInfo`] matching [`loaded_images()`].
pub fn handoff_info() -> HandoffInfo {
    HandoffInfo {
        kernel: KERNEL,
        user: USER,
        descriptor: DESCRIPTOR,
    }
}

/// The unwind payload of a core that entered the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnteredKernel;

/// The unwind payload of a core that halted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Halted;

/// How a simulated boot path ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Outcome {
    /// The core entered the kernel and the kernel kept control.
    EnteredKernel,
    /// The core halted.
    Halted,
}

/// Runs a boot path that must diverge and reports how it ended.
///
/// Panics other than the simulation's own markers are propagated.
pub fn outcome<R>(f: impl FnOnce() -> R) -> Outcome {
    silence_markers();

    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => panic!("boot path returned"),
        Err(payload) if payload.is::<EnteredKernel>() => Outcome::EnteredKernel,
        Err(payload) if payload.is::<Halted>() => Outcome::Halted,
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// Runs `f` and asserts that it halted.
pub fn expect_halt<R>(f: impl FnOnce() -> R) -> Halted {
    match outcome(f) {
        Outcome::Halted => Halted,
        other => panic!("expected a halt, got {other:?}"),
    }
}

/// Keeps the default panic hook from reporting the simulation's unwinds.
fn silence_markers() {
    static HOOK: Once = Once::new();

    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let payload = info.payload();
            if !payload.is::<EnteredKernel>() && !payload.is::<Halted>() {
                previous(info);
            }
        }));
    });
}

/// The behaviour of a [`SimPlatform`].
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// What [`Platform::load_images()`] returns.
    pub load: Result<LoadedImages, LoaderStatus>,
    /// Whether [`Platform::enter_kernel()`] returns instead of diverging.
    pub kernel_returns: bool,
    /// What [`Platform::hart_start_supported()`] returns.
    pub hart_start_supported: bool,
    /// Cores whose start fails, and how.
    pub start_failures: Vec<(HartId, StartError)>,
    /// How many times [`Platform::wait_for_interrupt()`] wakes up before a core stays halted.
    pub spurious_wakeups: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            load: Ok(loaded_images(1)),
            kernel_returns: false,
            hart_start_supported: true,
            start_failures: Vec::new(),
            spurious_wakeups: 0,
        }
    }
}

/// A recorded [`Platform::start_hart()`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartRecord {
    /// The core that was asked to start.
    pub hart: HartId,
    /// Where it was asked to start.
    pub entry: SecondaryEntry,
    /// The argument it was given.
    pub argument: usize,
    /// Whether the go signal had been published when the call was made.
    pub go_was_published: bool,
    /// What the call returned.
    pub result: Result<(), StartError>,
}

/// A recorded [`Platform::enter_kernel()`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JumpRecord {
    /// The address the core jumped to.
    pub entry: KernelEntry,
    /// The arguments it passed.
    pub arguments: KernelArguments,
    /// Whether the core had enabled virtual memory beforehand.
    pub virtual_memory: bool,
    /// The core that jumped, if the platform started it.
    pub caller: Option<HartId>,
}

/// The connection between a [`SimPlatform`] and the episode its cores take part in.
struct Attachment {
    /// Spawns a thread running the secondary boot path as the given core.
    spawn: Box<dyn Fn(HartId) -> JoinHandle<Outcome> + Send + Sync>,
    /// Returns whether the episode's go signal is set.
    go_published: Box<dyn Fn() -> bool + Send + Sync>,
}

thread_local! {
    /// Whether the current simulated core has enabled virtual memory.
    static VIRTUAL_MEMORY: Cell<bool> = const { Cell::new(false) };
    /// The core the platform started on the current thread.
    static STARTED_HART: Cell<Option<HartId>> = const { Cell::new(None) };
}

/// A [`Platform`] that records every call and runs secondary cores on threads.
pub struct SimPlatform {
    /// The configured behaviour.
    config: SimConfig,
    /// The episode secondary cores join, once attached.
    attachment: Mutex<Option<Attachment>>,
    /// Secondary cores that are running or finished.
    secondaries: Mutex<Vec<JoinHandle<Outcome>>>,
    /// Every start request in order.
    starts: Mutex<Vec<StartRecord>>,
    /// Every kernel entry in order.
    jumps: Mutex<Vec<JumpRecord>>,
    /// The number of [`Platform::initialize_devices()`] calls.
    devices_initialized: AtomicUsize,
    /// The number of [`Platform::wait_for_interrupt()`] calls across all cores.
    pub wakeups: AtomicUsize,
}

impl SimPlatform {
    /// Creates a [`SimPlatform`] behaving as described by `config`.
    pub fn new(config: SimConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            attachment: Mutex::new(None),
            secondaries: Mutex::new(Vec::new()),
            starts: Mutex::new(Vec::new()),
            jumps: Mutex::new(Vec::new()),
            devices_initialized: AtomicUsize::new(0),
            wakeups: AtomicUsize::new(0),
        })
    }

    /// Makes cores started on this platform run [`secondary_main()`] in `episode`.
    pub fn attach<const CORES: usize>(self: &Arc<Self>, episode: &Arc<BootEpisode<CORES>>) {
        let platform = Arc::downgrade(self);
        let spawn_episode = Arc::clone(episode);
        let go_episode = Arc::clone(episode);

        let attachment = Attachment {
            spawn: Box::new(move |hart| {
                let platform = Weak::clone(&platform);
                let episode = Arc::clone(&spawn_episode);
                thread::spawn(move || {
                    let Some(platform) = platform.upgrade() else {
                        return Outcome::Halted;
                    };
                    STARTED_HART.set(Some(hart));
                    outcome(|| secondary_main(&*episode, &*platform, hart))
                })
            }),
            go_published: Box::new(move || go_episode.go_published()),
        };

        *self.attachment.lock().unwrap() = Some(attachment);
    }

    /// Starts a core the way firmware does when it releases every core at reset.
    pub fn release_at_reset(&self, hart: HartId) {
        self.spawn_secondary(hart);
    }

    /// Waits for every secondary core to finish and returns how each one ended.
    pub fn join_secondaries(&self) -> Vec<Outcome> {
        let handles = core::mem::take(&mut *self.secondaries.lock().unwrap());

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    }

    /// Returns every start request made so far.
    pub fn starts(&self) -> Vec<StartRecord> {
        self.starts.lock().unwrap().clone()
    }

    /// Returns every kernel entry made so far.
    pub fn jumps(&self) -> Vec<JumpRecord> {
        self.jumps.lock().unwrap().clone()
    }

    /// Returns how often the devices were initialized.
    pub fn devices_initialized(&self) -> usize {
        self.devices_initialized.load(Ordering::Relaxed)
    }

    /// Spawns a thread running the secondary boot path as `hart`.
    fn spawn_secondary(&self, hart: HartId) {
        let attachment = self.attachment.lock().unwrap();
        let attachment = attachment
            .as_ref()
            .expect("platform must be attached to an episode before starting cores");

        let handle = (attachment.spawn)(hart);
        self.secondaries.lock().unwrap().push(handle);
    }

    /// Returns whether the attached episode's go signal is set.
    fn go_published(&self) -> bool {
        self.attachment
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|attachment| (attachment.go_published)())
    }
}

// SAFETY:
// No memory is ever executed: loading is simulated and kernel entry is recorded instead of
// performed, and `start_hart()` either fails or runs the secondary boot path.
unsafe impl Platform for SimPlatform {
    fn initialize_devices(&self) {
        self.devices_initialized.fetch_add(1, Ordering::Relaxed);
    }

    fn loader_image(&self) -> Range<usize> {
        0x8020_0000..0x8030_0000
    }

    fn load_images(
        &self,
        _max_apps: usize,
        _boot_blob: usize,
    ) -> Result<LoadedImages, LoaderStatus> {
        self.config.load
    }

    fn hart_start_supported(&self) -> bool {
        self.config.hart_start_supported
    }

    fn start_hart(
        &self,
        hart: HartId,
        entry: SecondaryEntry,
        argument: usize,
    ) -> Result<(), StartError> {
        let result = self
            .config
            .start_failures
            .iter()
            .find(|&&(failing, _)| failing == hart)
            .map_or(Ok(()), |&(_, error)| Err(error));

        self.starts.lock().unwrap().push(StartRecord {
            hart,
            entry,
            argument,
            go_was_published: self.go_published(),
            result,
        });

        if result.is_ok() {
            self.spawn_secondary(hart);
        }

        result
    }

    fn enable_virtual_memory(&self) {
        VIRTUAL_MEMORY.set(true);
    }

    unsafe fn enter_kernel(&self, entry: KernelEntry, arguments: &KernelArguments) {
        self.jumps.lock().unwrap().push(JumpRecord {
            entry,
            arguments: *arguments,
            virtual_memory: VIRTUAL_MEMORY.get(),
            caller: STARTED_HART.get(),
        });

        if !self.config.kernel_returns {
            panic::panic_any(EnteredKernel);
        }
    }

    fn wait_for_interrupt(&self) {
        let wakeups = self.wakeups.fetch_add(1, Ordering::Relaxed) + 1;
        if wakeups > self.config.spurious_wakeups {
            panic::panic_any(Halted);
        }
    }
}

/// Lets simulated cores take turns in a fixed order.
#[derive(Debug)]
pub struct Turnstile {
    /// The cores in the order they are let through.
    order: Vec<usize>,
    /// The index into `order` of the core whose turn it is.
    position: Mutex<usize>,
    /// Signalled whenever a turn ends.
    turn_ended: Condvar,
}

impl Turnstile {
    /// Creates a [`Turnstile`] letting cores through in `order`.
    pub fn new(order: &[usize]) -> Self {
        Self {
            order: order.to_vec(),
            position: Mutex::new(0),
            turn_ended: Condvar::new(),
        }
    }

    /// Blocks until it is `core`'s turn.
    pub fn wait_turn(&self, core: usize) {
        let position = self.position.lock().unwrap();
        let _position = self
            .turn_ended
            .wait_while(position, |position| self.order.get(*position) != Some(&core))
            .unwrap();
    }

    /// Ends the current turn.
    pub fn finish_turn(&self) {
        *self.position.lock().unwrap() += 1;
        self.turn_ended.notify_all();
    }
}

/// Returns every ordering of `0..n`.
pub fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn extend(prefix: &mut Vec<usize>, n: usize, out: &mut Vec<Vec<usize>>) {
        if prefix.len() == n {
            out.push(prefix.clone());
            return;
        }

        for next in 0..n {
            if !prefix.contains(&next) {
                prefix.push(next);
                extend(prefix, n, out);
                prefix.pop();
            }
        }
    }

    let mut out = Vec::new();
    extend(&mut Vec::with_capacity(n), n, &mut out);
    out
}

#[cfg(test)]
mod test {
    use super::permutations;

    #[test]
    fn permutations_cover_every_order() {
        assert_eq!(permutations(1), [[0]]);
        assert_eq!(permutations(3).len(), 6);
        assert_eq!(permutations(4).len(), 24);
        assert!(permutations(3).contains(&std::vec![2, 0, 1]));
    }
}
