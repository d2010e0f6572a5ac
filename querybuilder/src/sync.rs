//! Shared access to a builder from several threads

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::builder::QueryBuilder;
use crate::data::{QueryError, RuleGroup};
use crate::domain::format::{OutputFormat, ValueProcessor};
use crate::domain::query::Mutation;
use crate::notify::Notifier;

/// Cloneable handle serializing every operation on one [`QueryBuilder`]
///
/// Listeners run after the lock is released, so a listener may read or even
/// mutate the tree through a clone of the handle. Changes reach listeners in
/// version order.
#[derive(Clone)]
pub struct SharedQueryBuilder {
    inner: Arc<Mutex<QueryBuilder>>,
    notifier: Arc<Notifier>,
}

impl fmt::Debug for SharedQueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedQueryBuilder")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl SharedQueryBuilder {
    pub fn new(mut builder: QueryBuilder) -> Self {
        let notifier = builder.defer_notifications();
        Self {
            inner: Arc::new(Mutex::new(builder)),
            notifier,
        }
    }

    /// Run `f` with exclusive access to the builder
    ///
    /// Notifications raised inside `f` are delivered after it returns.
    pub fn with<R>(&self, f: impl FnOnce(&mut QueryBuilder) -> R) -> R {
        let result = {
            let mut builder = self.inner.lock();
            f(&mut builder)
        };
        self.notifier.deliver();
        result
    }

    pub fn apply(&self, mutation: Mutation) -> Result<bool, QueryError> {
        self.with(|builder| builder.apply(mutation))
    }

    pub fn subscribe(&self, listener: impl FnMut(RuleGroup) + Send + 'static) {
        self.with(|builder| builder.subscribe(listener));
    }

    pub fn snapshot(&self) -> Arc<RuleGroup> {
        self.inner.lock().snapshot()
    }

    pub fn version(&self) -> u64 {
        self.inner.lock().version()
    }

    pub fn format(
        &self,
        format: OutputFormat,
        processor: Option<&dyn ValueProcessor>,
    ) -> Result<String, QueryError> {
        self.inner.lock().format(format, processor)
    }
}

impl From<QueryBuilder> for SharedQueryBuilder {
    fn from(builder: QueryBuilder) -> Self {
        Self::new(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BuilderConfig;
    use crate::data::Field;
    use crate::domain::query::SequentialIdGenerator;
    use std::collections::HashSet;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn shared() -> SharedQueryBuilder {
        let config = BuilderConfig::new(vec![Field::new("firstName", "First Name")]);
        QueryBuilder::with_id_generator(config, SequentialIdGenerator::new())
            .unwrap()
            .into()
    }

    #[test]
    fn test_concurrent_mutations() {
        let builder = shared();
        let root_id = builder.snapshot().id.clone();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let builder = builder.clone();
                let parent_id = root_id.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        builder
                            .apply(Mutation::AddRule {
                                parent_id: parent_id.clone(),
                                rule: None,
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let root = builder.snapshot();
        assert_eq!(root.len(), 80);
        assert_eq!(builder.version(), 80);
        let ids: HashSet<_> = root.rules.iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), 80);
    }

    #[test]
    fn test_with_gives_exclusive_access() {
        let builder = shared();
        let count = builder.with(|b| {
            let group = b.create_group().unwrap();
            let root_id = b.root().id.clone();
            b.add_group(group, &root_id).unwrap();
            b.root().len()
        });
        assert_eq!(count, 1);
        assert_eq!(builder.format(OutputFormat::Sql, None).unwrap(), "(())");
    }

    #[test]
    fn test_listener_can_read_handle() {
        let builder = shared();
        let (tx, rx) = mpsc::channel();

        let worker = builder.clone();
        thread::spawn(move || {
            let observer = worker.clone();
            let rendered = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&rendered);
            worker.with(|b| {
                b.subscribe(move |_| {
                    let sql = observer.format(OutputFormat::Sql, None).unwrap();
                    sink.lock().push((observer.version(), sql));
                })
            });
            let root_id = worker.snapshot().id.clone();
            worker
                .apply(Mutation::AddRule {
                    parent_id: root_id,
                    rule: None,
                })
                .unwrap();
            let _ = tx.send(rendered.lock().clone());
        });

        let rendered = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("listener blocked on the handle");
        assert_eq!(
            rendered,
            vec![
                (0, "()".to_string()),
                (1, "(firstName is null)".to_string())
            ]
        );
    }

    #[test]
    fn test_listener_can_mutate_handle() {
        let builder = shared();
        let (tx, rx) = mpsc::channel();

        let worker = builder.clone();
        thread::spawn(move || {
            let editor = worker.clone();
            let versions = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&versions);
            worker.subscribe(move |query| {
                sink.lock().push(query.len());
                if query.len() == 1 {
                    editor
                        .apply(Mutation::AddRule {
                            parent_id: query.id.clone(),
                            rule: None,
                        })
                        .unwrap();
                }
            });
            let root_id = worker.snapshot().id.clone();
            worker
                .apply(Mutation::AddRule {
                    parent_id: root_id,
                    rule: None,
                })
                .unwrap();
            let _ = tx.send(versions.lock().clone());
        });

        let seen = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("listener blocked on the handle");
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(builder.version(), 2);
    }
}
