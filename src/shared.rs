//! Late registration behind an atomically swapped snapshot.
//!
//! A plain [`Router`] is built at startup and then only read. When routes
//! must be added while traffic is flowing, wrap the table in a
//! [`SharedRouter`]: readers take a snapshot per request and resolve against
//! it; a registration copies the table, extends the copy and publishes it in
//! one atomic store. Readers see the table before or after a registration,
//! never halfway. Writers queue on a mutex.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::Error;
use crate::method::MethodFilter;
use crate::router::Router;

pub struct SharedRouter<H> {
    current: ArcSwap<Router<H>>,
    writer: Mutex<()>,
}

impl<H: Clone> SharedRouter<H> {
    pub fn new(router: Router<H>) -> Self {
        Self { current: ArcSwap::from_pointee(router), writer: Mutex::new(()) }
    }

    /// The table as of now. Hold it for the duration of one resolution.
    pub fn snapshot(&self) -> Arc<Router<H>> {
        self.current.load_full()
    }

    /// Register one route and publish the extended table. Returns its order.
    pub fn register(
        &self,
        method: impl Into<MethodFilter>,
        pattern: &str,
        handler: H,
    ) -> Result<u64, Error> {
        let _guard = self.writer.lock();

        let mut next = Router::clone(&self.current.load());
        let order = next.register(method, pattern, handler)?.order();
        self.current.store(Arc::new(next));
        Ok(order)
    }

    /// Publish a whole new table, e.g. a reloaded manifest. Returns the old one.
    pub fn replace(&self, router: Router<H>) -> Arc<Router<H>> {
        let _guard = self.writer.lock();
        debug!(routes = router.len(), "route table replaced");
        self.current.swap(Arc::new(router))
    }
}

impl<H: Clone> From<Router<H>> for SharedRouter<H> {
    fn from(router: Router<H>) -> Self {
        Self::new(router)
    }
}

impl<H: Clone> Default for SharedRouter<H> {
    fn default() -> Self {
        Self::new(Router::new())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;
    use crate::method::Method;
    use crate::router::MatchResult;

    #[test]
    fn snapshots_are_isolated_from_later_registrations() {
        let shared = SharedRouter::new(Router::new().on(Method::Get, "/a", 1));
        let before = shared.snapshot();

        shared.register(Method::Get, "/b", 2).unwrap();

        assert_eq!(before.resolve("GET", "/b"), MatchResult::NoMatch);
        assert_eq!(shared.snapshot().resolve("GET", "/b").handler(), Some(&2));
    }

    #[test]
    fn failed_registration_publishes_nothing() {
        let shared = SharedRouter::new(Router::new().on(Method::Get, "/a", 1));
        assert!(shared.register(Method::Get, "/{*x}/y", 2).is_err());
        assert_eq!(shared.snapshot().len(), 1);
    }

    #[test]
    fn concurrent_writers_are_serialized() {
        let shared = SharedRouter::<usize>::default();

        thread::scope(|s| {
            for i in 0..8 {
                let shared = &shared;
                s.spawn(move || shared.register(Method::Get, &format!("/r{i}"), i).unwrap());
            }
        });

        let table = shared.snapshot();
        assert_eq!(table.len(), 8);
        let orders: HashSet<u64> = table.routes().map(|r| r.order()).collect();
        assert_eq!(orders, (0..8).collect());
    }

    #[test]
    fn readers_never_observe_partial_tables() {
        let shared = SharedRouter::<usize>::default();

        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..200 {
                    shared.register(Method::Get, &format!("/n/{i}"), i).unwrap();
                }
            });
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let table = shared.snapshot();
                        let n = table.len();
                        // every registered route is fully resolvable
                        for i in 0..n {
                            let path = format!("/n/{i}");
                            assert_eq!(table.resolve("GET", &path).handler(), Some(&i));
                        }
                    }
                });
            }
        });
    }

    #[test]
    fn replace_swaps_whole_table() {
        let shared = SharedRouter::new(Router::new().on(Method::Get, "/old", 1));
        let old = shared.replace(Router::new().on(Method::Get, "/new", 2));
        assert_eq!(old.len(), 1);
        assert!(shared.snapshot().resolve("GET", "/old") == MatchResult::NoMatch);
        assert!(shared.snapshot().resolve("GET", "/new").is_match());
    }
}
