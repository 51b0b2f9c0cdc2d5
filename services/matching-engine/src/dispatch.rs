//! Symbol dispatcher
//!
//! Owns one book, one inbound queue, and one worker thread per symbol.
//! Actions for the same symbol are applied strictly in submission order;
//! actions for different symbols proceed in parallel with no ordering
//! between them. Submitters never block: enqueue is bounded only by memory
//! and the worker is woken through the shard's condvar.
//!
//! Shutdown is cooperative: the running flag flips, every worker is woken
//! with a sentinel, in-flight actions complete, leftover queued actions are
//! discarded, and all workers are joined.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use dashmap::DashMap;
use tracing::{debug, info, warn};
use types::errors::DispatchError;
use types::ids::{OrderId, Symbol};
use types::order::Order;

use crate::engine::OrderBook;
use crate::events::FillSink;

/// Dispatcher tuning knobs
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Per-symbol queue depth above which a backlog warning is logged
    pub queue_warn_depth: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_warn_depth: 10_000,
        }
    }
}

/// An action routed to a symbol worker
enum Action {
    Add { order: Order, sink: Arc<dyn FillSink> },
    Cancel { order_id: OrderId },
    Shutdown,
}

/// Per-symbol inbound queue, wake primitive, and worker handle
struct Shard {
    queue: Mutex<VecDeque<Action>>,
    available: Condvar,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Shard {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            worker: Mutex::new(None),
        }
    }

    /// Enqueue an action and wake the worker; returns the new queue depth
    fn enqueue(&self, action: Action) -> usize {
        let mut queue = lock(&self.queue);
        queue.push_back(action);
        let depth = queue.len();
        drop(queue);
        self.available.notify_one();
        depth
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Multi-symbol dispatcher
///
/// Each symbol's book is exclusive to its worker thread, so the matching
/// code needs no internal synchronization; the dispatcher serializes all
/// operations per symbol.
pub struct BookDispatcher {
    shards: DashMap<Symbol, Arc<Shard>>,
    running: Arc<AtomicBool>,
    default_sink: Arc<dyn FillSink>,
    config: DispatcherConfig,
}

impl BookDispatcher {
    /// Create a dispatcher with the given default fill sink
    pub fn new(default_sink: Arc<dyn FillSink>) -> Self {
        Self::with_config(default_sink, DispatcherConfig::default())
    }

    /// Create a dispatcher with explicit configuration
    pub fn with_config(default_sink: Arc<dyn FillSink>, config: DispatcherConfig) -> Self {
        info!(queue_warn_depth = config.queue_warn_depth, "dispatcher started");
        Self {
            shards: DashMap::new(),
            running: Arc::new(AtomicBool::new(true)),
            default_sink,
            config,
        }
    }

    /// Route an order to its symbol worker; fills go to the default sink
    ///
    /// Returns false once shutdown has begun.
    pub fn submit(&self, order: Order) -> bool {
        self.try_submit(order).is_ok()
    }

    /// Like [`submit`](Self::submit) but reports the refusal reason
    pub fn try_submit(&self, order: Order) -> Result<(), DispatchError> {
        let sink = Arc::clone(&self.default_sink);
        self.try_submit_with_sink(order, sink)
    }

    /// Route an order with a per-order fill sink override
    pub fn submit_with_sink(&self, order: Order, sink: Arc<dyn FillSink>) -> bool {
        self.try_submit_with_sink(order, sink).is_ok()
    }

    /// Like [`submit_with_sink`](Self::submit_with_sink) but reports the
    /// refusal reason
    pub fn try_submit_with_sink(
        &self,
        order: Order,
        sink: Arc<dyn FillSink>,
    ) -> Result<(), DispatchError> {
        if !self.running.load(Ordering::Acquire) {
            warn!(symbol = %order.symbol, order_id = %order.id, "submit refused: dispatcher stopped");
            return Err(DispatchError::Stopped);
        }

        let symbol = order.symbol.clone();
        let depth = self.shard(&symbol).enqueue(Action::Add { order, sink });
        if depth > self.config.queue_warn_depth {
            warn!(symbol = %symbol, depth, "symbol queue backlog");
        }
        Ok(())
    }

    /// Route a cancel to the symbol worker
    ///
    /// Returns false once shutdown has begun. A cancel for a never-seen
    /// symbol still materializes the shard; the worker then reports the
    /// unknown id.
    pub fn cancel(&self, order_id: OrderId, symbol: &Symbol) -> bool {
        self.try_cancel(order_id, symbol).is_ok()
    }

    /// Like [`cancel`](Self::cancel) but reports the refusal reason
    pub fn try_cancel(&self, order_id: OrderId, symbol: &Symbol) -> Result<(), DispatchError> {
        if !self.running.load(Ordering::Acquire) {
            warn!(symbol = %symbol, order_id = %order_id, "cancel refused: dispatcher stopped");
            return Err(DispatchError::Stopped);
        }

        let depth = self.shard(symbol).enqueue(Action::Cancel { order_id });
        if depth > self.config.queue_warn_depth {
            warn!(symbol = %symbol, depth, "symbol queue backlog");
        }
        Ok(())
    }

    /// Number of symbols with a live worker
    pub fn symbol_count(&self) -> usize {
        self.shards.len()
    }

    /// Check whether the dispatcher still accepts actions
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop accepting actions, wake every worker, and join them all
    ///
    /// In-flight actions complete; actions still queued are discarded.
    /// Idempotent — later calls return immediately.
    pub fn shutdown(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        info!("dispatcher shutting down");

        let symbols: Vec<Symbol> = self.shards.iter().map(|entry| entry.key().clone()).collect();
        for symbol in &symbols {
            if let Some(shard) = self.shards.get(symbol) {
                shard.enqueue(Action::Shutdown);
            }
        }

        for symbol in &symbols {
            if let Some((_, shard)) = self.shards.remove(symbol) {
                let handle = lock(&shard.worker).take();
                if let Some(handle) = handle {
                    if handle.join().is_err() {
                        warn!(symbol = %symbol, "symbol worker panicked");
                    } else {
                        info!(symbol = %symbol, "symbol worker joined");
                    }
                }
            }
        }
    }

    /// Get or create the shard for a symbol, spawning its worker on first use
    fn shard(&self, symbol: &Symbol) -> Arc<Shard> {
        if let Some(shard) = self.shards.get(symbol) {
            return Arc::clone(shard.value());
        }

        let entry = self.shards.entry(symbol.clone()).or_insert_with(|| {
            let shard = Arc::new(Shard::new());
            let worker_shard = Arc::clone(&shard);
            let worker_symbol = symbol.clone();
            let running = Arc::clone(&self.running);
            let handle = thread::Builder::new()
                .name(format!("book-{symbol}"))
                .spawn(move || worker_loop(worker_symbol, worker_shard, running))
                .expect("failed to spawn symbol worker");
            *lock(&shard.worker) = Some(handle);
            shard
        });
        Arc::clone(entry.value())
    }
}

impl Drop for BookDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Worker body: drain the shard queue serially into this symbol's book
///
/// The book lives on the worker's stack and is never shared. The worker
/// re-checks the running flag before blocking, so a shard created
/// concurrently with shutdown exits on its own even if shutdown never saw
/// it.
fn worker_loop(symbol: Symbol, shard: Arc<Shard>, running: Arc<AtomicBool>) {
    info!(symbol = %symbol, "symbol worker started");
    let mut book = OrderBook::new(symbol.clone());

    loop {
        let action = {
            let mut queue = lock(&shard.queue);
            while queue.is_empty() && running.load(Ordering::Acquire) {
                queue = shard
                    .available
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if !running.load(Ordering::Acquire) {
                break;
            }
            match queue.pop_front() {
                Some(action) => action,
                None => continue,
            }
        };

        match action {
            Action::Add { order, sink } => {
                let order_id = order.id;
                if let Err(err) = book.add(order, sink.as_ref()) {
                    debug!(symbol = %symbol, order_id = %order_id, %err, "order rejected");
                }
            }
            Action::Cancel { order_id } => {
                if let Err(err) = book.cancel(order_id) {
                    debug!(symbol = %symbol, order_id = %order_id, %err, "cancel rejected");
                }
            }
            Action::Shutdown => break,
        }
    }

    info!(symbol = %symbol, "symbol worker stopped");
}
