//! The listener support facade and its builder.

use crate::handle::Handle;
use chorus_core::{
    Capability, CapabilityDescription, CollectionHolder, ConstructionError, DesignatedExecutor,
    DispatchPolicy, ListenerFilter, Listeners, Policy, ReadOnlyViolation, validate,
};
use chorus_std::{
    executors::DesignatedThread,
    holders::{FilteredHolder, StrongHolder, WeakHolder},
    policies::{
        DeferredAsync, DeferredWait, Direct, ParallelAsync, WorkerAsync,
        parallel::default_parallelism,
    },
};
use once_cell::sync::OnceCell;
use std::{array, fmt, num::NonZeroUsize, sync::Arc};

// ============================================================================
// ListenerSupport
// ============================================================================

/// Multicasts calls on a capability `T` to a managed set of listeners.
///
/// `T` is a trait object type (`dyn MyListener`) annotated with
/// `#[chorus::capability]`. Listeners are registered as `Arc<T>` and calls
/// are made on the [`Handle`]s returned by [`handle_for`](Self::handle_for)
/// and its shortcuts:
///
/// | Shortcut | Policy |
/// |---|---|
/// | [`fire`](Self::fire) | [`Policy::Direct`] |
/// | [`fire_on_designated_and_wait`](Self::fire_on_designated_and_wait) | [`Policy::DeferredWait`] |
/// | [`fire_on_designated_later`](Self::fire_on_designated_later) | [`Policy::DeferredAsync`] |
/// | [`fire_on_worker`](Self::fire_on_worker) | [`Policy::WorkerAsync`] |
/// | [`fire_in_parallel`](Self::fire_in_parallel) | [`Policy::ParallelAsync`] |
///
/// # Example
///
/// ```rust,ignore
/// #[chorus::capability]
/// trait Progress {
///     fn advanced(&self, percent: u8) -> ListenerResult;
/// }
///
/// let support = ListenerSupport::<dyn Progress>::new()?;
/// support.register(Arc::new(ProgressBar::default()))?;
/// support.fire().advanced(40)?;
/// ```
pub struct ListenerSupport<T: ?Sized> {
    description: CapabilityDescription,
    holder: Arc<dyn CollectionHolder<T>>,
    resources: Arc<Resources>,
    handles: [OnceCell<Arc<Handle<T>>>; Policy::ALL.len()],
}

/// Execution resources shared by a support and the views filtered from it.
struct Resources {
    designated: Arc<dyn DesignatedExecutor>,
    worker_thread_name: String,
    parallel: Arc<ParallelAsync>,
}

impl<T: ?Sized + Capability> ListenerSupport<T> {
    /// Creates a support that holds its listeners strongly.
    pub fn new() -> Result<Self, ConstructionError> {
        Self::builder().build()
    }

    /// Creates a support that does not keep its listeners alive.
    ///
    /// A listener disappears from the set once the last `Arc` to it
    /// elsewhere is dropped.
    pub fn new_weak() -> Result<Self, ConstructionError> {
        Self::builder().weak().build()
    }

    /// Creates a support over a caller-supplied holder.
    pub fn with_holder(holder: Arc<dyn CollectionHolder<T>>) -> Result<Self, ConstructionError> {
        Self::builder().holder(holder).build()
    }

    /// Starts configuring a support.
    pub fn builder() -> SupportBuilder<T> {
        SupportBuilder::new()
    }

    /// The description of the capability this support dispatches.
    pub fn description(&self) -> &CapabilityDescription {
        &self.description
    }

    /// Adds a listener. Registering the same listener twice is a no-op.
    pub fn register(&self, listener: Arc<T>) -> Result<(), ReadOnlyViolation> {
        self.holder.register(listener)
    }

    /// Removes a listener. Removing an unknown listener is a no-op.
    pub fn unregister(&self, listener: &Arc<T>) -> Result<(), ReadOnlyViolation> {
        self.holder.unregister(listener)
    }

    /// Number of listeners a dispatch would reach right now.
    pub fn size(&self) -> usize {
        self.holder.size()
    }

    /// Returns `true` if a dispatch would reach no listener.
    pub fn is_empty(&self) -> bool {
        self.holder.is_empty()
    }

    /// A snapshot of the current listeners.
    pub fn iter(&self) -> Listeners<T> {
        self.holder.iter()
    }

    /// A read-only view of the listeners `predicate` accepts.
    ///
    /// The view is re-evaluated on every iteration and follows later
    /// registrations on this support. It shares this support's designated
    /// executor and parallel pool but has its own handles.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Arc<T>) -> bool + Send + Sync + 'static,
    {
        self.filter_with(Arc::new(predicate))
    }

    /// Like [`filter`](Self::filter), for filters that are not closures.
    pub fn filter_with(&self, filter: Arc<dyn ListenerFilter<T>>) -> Self {
        Self {
            description: self.description,
            holder: Arc::new(FilteredHolder::new(Arc::clone(&self.holder), filter)),
            resources: Arc::clone(&self.resources),
            handles: array::from_fn(|_| OnceCell::new()),
        }
    }

    /// The handle dispatching with `policy`.
    ///
    /// Every call with the same policy returns the same handle.
    pub fn handle_for(&self, policy: Policy) -> Arc<Handle<T>> {
        let handle = self.handles[policy.index()].get_or_init(|| {
            tracing::debug!(
                capability = self.description.name,
                %policy,
                "creating dispatch handle"
            );
            Arc::new(Handle::new(Arc::clone(&self.holder), self.policy(policy)))
        });
        Arc::clone(handle)
    }

    /// A handle dispatching with a caller-supplied policy.
    ///
    /// These handles are not cached.
    pub fn handle_with(&self, policy: Arc<dyn DispatchPolicy<T>>) -> Arc<Handle<T>> {
        Arc::new(Handle::new(Arc::clone(&self.holder), policy))
    }

    /// Calls every listener on the caller's thread; the first failure is
    /// returned and stops the rest.
    pub fn fire(&self) -> Arc<Handle<T>> {
        self.handle_for(Policy::Direct)
    }

    /// Calls every listener on the designated thread and waits for the
    /// result.
    pub fn fire_on_designated_and_wait(&self) -> Arc<Handle<T>> {
        self.handle_for(Policy::DeferredWait)
    }

    /// Queues the calls on the designated thread and returns immediately.
    pub fn fire_on_designated_later(&self) -> Arc<Handle<T>> {
        self.handle_for(Policy::DeferredAsync)
    }

    /// Calls every listener on a new worker thread and returns immediately.
    pub fn fire_on_worker(&self) -> Arc<Handle<T>> {
        self.handle_for(Policy::WorkerAsync)
    }

    /// Calls every listener as its own task on the parallel pool and returns
    /// immediately.
    pub fn fire_in_parallel(&self) -> Arc<Handle<T>> {
        self.handle_for(Policy::ParallelAsync)
    }

    /// Returns `true` when called from this support's designated thread.
    ///
    /// A waiting dispatch from that thread is refused, so listeners that
    /// may run there can check first.
    pub fn is_designated_thread(&self) -> bool {
        self.resources.designated.is_designated_thread()
    }

    fn policy(&self, policy: Policy) -> Arc<dyn DispatchPolicy<T>> {
        let resources = &self.resources;
        match policy {
            Policy::Direct => Arc::new(Direct),
            Policy::DeferredWait => Arc::new(DeferredWait::new(Arc::clone(&resources.designated))),
            Policy::DeferredAsync => {
                Arc::new(DeferredAsync::new(Arc::clone(&resources.designated)))
            }
            Policy::WorkerAsync => Arc::new(WorkerAsync::with_name(
                resources.worker_thread_name.clone(),
            )),
            Policy::ParallelAsync => Arc::clone(&resources.parallel) as Arc<dyn DispatchPolicy<T>>,
        }
    }
}

impl<'a, T: ?Sized + Capability> IntoIterator for &'a ListenerSupport<T> {
    type Item = Arc<T>;
    type IntoIter = Listeners<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: ?Sized> fmt::Debug for ListenerSupport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSupport")
            .field("capability", &self.description.name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SupportBuilder
// ============================================================================

enum HolderKind<T: ?Sized> {
    Strong,
    Weak,
    Custom(Arc<dyn CollectionHolder<T>>),
}

/// Builder for [`ListenerSupport`].
///
/// # Example
///
/// ```rust,ignore
/// let support = ListenerSupport::<dyn Progress>::builder()
///     .weak()
///     .designated_thread_name("ui")
///     .parallelism(NonZeroUsize::new(4).unwrap())
///     .build()?;
/// ```
pub struct SupportBuilder<T: ?Sized> {
    holder: HolderKind<T>,
    designated: Option<Arc<dyn DesignatedExecutor>>,
    designated_thread_name: String,
    worker_thread_name: String,
    parallelism: NonZeroUsize,
}

impl<T: ?Sized + Capability> SupportBuilder<T> {
    /// Creates a builder with the defaults: strong holder, a lazily started
    /// designated thread, one pool thread per available core.
    pub fn new() -> Self {
        Self {
            holder: HolderKind::Strong,
            designated: None,
            designated_thread_name: DesignatedThread::DEFAULT_NAME.to_owned(),
            worker_thread_name: WorkerAsync::DEFAULT_NAME.to_owned(),
            parallelism: default_parallelism(),
        }
    }

    /// Holds listeners strongly. This is the default.
    pub fn strong(mut self) -> Self {
        self.holder = HolderKind::Strong;
        self
    }

    /// Holds listeners weakly.
    pub fn weak(mut self) -> Self {
        self.holder = HolderKind::Weak;
        self
    }

    /// Uses a caller-supplied holder.
    pub fn holder(mut self, holder: Arc<dyn CollectionHolder<T>>) -> Self {
        self.holder = HolderKind::Custom(holder);
        self
    }

    /// Runs deferred dispatches on `executor` instead of a dedicated thread.
    ///
    /// Overrides [`designated_thread_name`](Self::designated_thread_name).
    pub fn designated_executor(mut self, executor: Arc<dyn DesignatedExecutor>) -> Self {
        self.designated = Some(executor);
        self
    }

    /// Names the designated thread.
    pub fn designated_thread_name(mut self, name: impl Into<String>) -> Self {
        self.designated_thread_name = name.into();
        self
    }

    /// Names the threads spawned by worker dispatches.
    pub fn worker_thread_name(mut self, name: impl Into<String>) -> Self {
        self.worker_thread_name = name.into();
        self
    }

    /// Sets the number of parallel pool threads.
    pub fn parallelism(mut self, threads: NonZeroUsize) -> Self {
        self.parallelism = threads;
        self
    }

    /// Validates the capability and builds the support.
    ///
    /// No thread is started here; the designated thread and the pool start
    /// on first use.
    pub fn build(self) -> Result<ListenerSupport<T>, ConstructionError> {
        let description = validate::<T>()?;

        let Self {
            holder,
            designated,
            designated_thread_name,
            worker_thread_name,
            parallelism,
        } = self;

        let holder: Arc<dyn CollectionHolder<T>> = match holder {
            HolderKind::Strong => Arc::new(StrongHolder::new()),
            HolderKind::Weak => Arc::new(WeakHolder::new()),
            HolderKind::Custom(holder) => holder,
        };
        let designated = designated
            .unwrap_or_else(|| Arc::new(DesignatedThread::with_name(designated_thread_name)));

        tracing::debug!(
            capability = description.name,
            methods = description.methods.len(),
            parallelism = parallelism.get(),
            "listener support created"
        );

        Ok(ListenerSupport {
            description,
            holder,
            resources: Arc::new(Resources {
                designated,
                worker_thread_name,
                parallel: Arc::new(ParallelAsync::with_threads(parallelism)),
            }),
            handles: array::from_fn(|_| OnceCell::new()),
        })
    }
}

impl<T: ?Sized + Capability> Default for SupportBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
