//! Query builder controller
//!
//! [`QueryBuilder`] holds the current query tree together with the
//! configuration that drives defaults, and is the single entry point a UI
//! layer drives. Every successful mutation replaces the root with a new
//! persistent tree, bumps [`QueryBuilder::version`], and hands each listener a
//! deep copy of the new tree.
//!
//! ```
//! use querybuilder::{BuilderConfig, Field, OutputFormat, QueryBuilder};
//!
//! let config = BuilderConfig::new(vec![Field::new("firstName", "First Name")]);
//! let mut builder = QueryBuilder::new(config).unwrap();
//!
//! let rule = builder.create_rule().unwrap();
//! let root_id = builder.root().id.clone();
//! builder.add_rule(rule, &root_id).unwrap();
//!
//! let sql = builder.format(OutputFormat::Sql, None).unwrap();
//! assert_eq!(sql, "(firstName is null)");
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::core::config::{BuilderConfig, CombinatorProvider, FieldProvider, OperatorProvider};
use crate::data::{
    NameLabelPair, NodeKind, NodeRef, QueryError, Rule, RuleGroup, RuleOrGroup, ValueEditorType,
};
use crate::domain::format::{OutputFormat, ValueProcessor, format_query, format_query_as};
use crate::domain::query::{
    self, IdGenerator, Mutation, UuidIdGenerator, next_free_id, normalize_query, normalize_within,
};
use crate::notify::Notifier;

pub use crate::notify::QueryListener;

pub struct QueryBuilder {
    config: BuilderConfig,
    ids: Box<dyn IdGenerator>,
    root: Arc<RuleGroup>,
    version: u64,
    notifier: Arc<Notifier>,
    /// Set when an outer handle delivers notifications after releasing its lock
    deferred: bool,
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("config", &self.config)
            .field("root", &self.root)
            .field("version", &self.version)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}

impl QueryBuilder {
    /// Create a builder with UUID-based ids
    pub fn new(config: BuilderConfig) -> Result<Self, QueryError> {
        Self::with_id_generator(config, UuidIdGenerator)
    }

    /// Create a builder with a custom id source
    ///
    /// The initial tree is `config.query` normalized, or an empty group using
    /// the first combinator when no query is configured.
    pub fn with_id_generator(
        config: BuilderConfig,
        ids: impl IdGenerator + 'static,
    ) -> Result<Self, QueryError> {
        let ids: Box<dyn IdGenerator> = Box::new(ids);
        let root = match &config.query {
            Some(raw) => normalize_query(raw, ids.as_ref())?,
            None => RuleGroup::new(ids.next_id(NodeKind::Group), first_combinator(&config)?),
        };

        tracing::debug!(
            root_id = %root.id,
            fields = config.fields.len(),
            "Query builder initialized"
        );

        Ok(Self {
            config,
            ids,
            root: Arc::new(root),
            version: 0,
            notifier: Arc::default(),
            deferred: false,
        })
    }

    // ========================================================================
    // Node creation
    // ========================================================================

    /// A fresh rule on the first field, with that field's first operator
    /// and an empty value
    pub fn create_rule(&self) -> Result<Rule, QueryError> {
        let field = self
            .config
            .fields()
            .first()
            .map(|f| f.name.clone())
            .ok_or(QueryError::NoFields)?;
        let operator = self
            .config
            .operators(&field)
            .first()
            .map(|op| op.name.clone())
            .unwrap_or_default();

        Ok(Rule::new(self.fresh_id(NodeKind::Rule), field, operator, ""))
    }

    /// A fresh empty group using the first combinator
    pub fn create_group(&self) -> Result<RuleGroup, QueryError> {
        let combinator = first_combinator(&self.config)?;
        Ok(RuleGroup::new(self.fresh_id(NodeKind::Group), combinator))
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub fn add_rule(&mut self, rule: Rule, parent_id: &str) -> Result<bool, QueryError> {
        let changed = query::add_rule(&mut self.root, rule, parent_id)?;
        Ok(self.commit("add_rule", changed))
    }

    pub fn add_group(&mut self, group: RuleGroup, parent_id: &str) -> Result<bool, QueryError> {
        let changed = query::add_group(&mut self.root, group, parent_id)?;
        Ok(self.commit("add_group", changed))
    }

    pub fn remove_rule(&mut self, rule_id: &str, parent_id: &str) -> Result<bool, QueryError> {
        let changed = query::remove_rule(&mut self.root, rule_id, parent_id)?;
        Ok(self.commit("remove_rule", changed))
    }

    pub fn remove_group(&mut self, group_id: &str, parent_id: &str) -> Result<bool, QueryError> {
        let changed = query::remove_group(&mut self.root, group_id, parent_id)?;
        Ok(self.commit("remove_group", changed))
    }

    /// Set one property on a node; see [`query::set_property`]
    pub fn set_property(
        &mut self,
        property: &str,
        value: JsonValue,
        node_id: &str,
    ) -> Result<bool, QueryError> {
        let changed =
            query::set_property(&mut self.root, property, value, node_id, &self.config)?;
        Ok(self.commit("set_property", changed))
    }

    /// Apply a mutation command
    ///
    /// Raw nodes carried by `AddRule` / `AddGroup` are normalized first and
    /// must be of the matching kind; absent nodes are created with defaults.
    pub fn apply(&mut self, mutation: Mutation) -> Result<bool, QueryError> {
        tracing::trace!(mutation = mutation.name(), "Applying mutation");
        match mutation {
            Mutation::AddRule { parent_id, rule } => {
                let rule = match rule {
                    Some(raw) => self.normalize_rule(&raw)?,
                    None => self.create_rule()?,
                };
                self.add_rule(rule, &parent_id)
            }
            Mutation::AddGroup { parent_id, group } => {
                let group = match group {
                    Some(raw) => self.normalize_group(&raw)?,
                    None => self.create_group()?,
                };
                self.add_group(group, &parent_id)
            }
            Mutation::RemoveRule { rule_id, parent_id } => self.remove_rule(&rule_id, &parent_id),
            Mutation::RemoveGroup {
                group_id,
                parent_id,
            } => self.remove_group(&group_id, &parent_id),
            Mutation::SetProperty {
                property,
                value,
                node_id,
            } => self.set_property(&property, value, &node_id),
        }
    }

    /// Replace the whole tree from raw input
    ///
    /// Counts as a new version but does not notify listeners: the caller
    /// supplied the tree and already knows about it.
    pub fn set_query(&mut self, raw: &JsonValue) -> Result<(), QueryError> {
        let root = normalize_query(raw, self.ids.as_ref())?;
        self.root = Arc::new(root);
        self.version += 1;
        tracing::debug!(root_id = %self.root.id, version = self.version, "Query replaced");
        Ok(())
    }

    /// Register a listener; it is called right away with the current tree
    ///
    /// Behind a [`SharedQueryBuilder`](crate::sync::SharedQueryBuilder) the
    /// call happens once the handle's lock is released.
    pub fn subscribe(&mut self, listener: impl FnMut(RuleGroup) + Send + 'static) {
        self.notifier
            .subscribe(Box::new(listener), Arc::clone(&self.root));
        self.flush();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn root(&self) -> &Arc<RuleGroup> {
        &self.root
    }

    /// A cheap handle on the current tree that later mutations never change
    pub fn snapshot(&self) -> Arc<RuleGroup> {
        Arc::clone(&self.root)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn find(&self, id: &str) -> Option<NodeRef<'_>> {
        query::find_node(id, &self.root)
    }

    pub fn level(&self, id: &str) -> Option<usize> {
        query::level(id, &self.root)
    }

    pub fn format(
        &self,
        format: OutputFormat,
        processor: Option<&dyn ValueProcessor>,
    ) -> Result<String, QueryError> {
        format_query(&self.root, format, processor)
    }

    /// Format by name; unknown names yield `Ok(None)`
    pub fn format_as(
        &self,
        format: &str,
        processor: Option<&dyn ValueProcessor>,
    ) -> Result<Option<String>, QueryError> {
        format_query_as(&self.root, format, processor)
    }

    pub fn operators(&self, field: &str) -> &[NameLabelPair] {
        self.config.operators(field)
    }

    pub fn combinators(&self) -> &[NameLabelPair] {
        self.config.combinators()
    }

    pub fn value_editor_type(&self, field: &str) -> ValueEditorType {
        self.config.value_editor_type(field)
    }

    pub fn input_type(&self, field: &str) -> &str {
        self.config.input_type(field)
    }

    pub fn values(&self, field: &str) -> &[NameLabelPair] {
        self.config.values(field)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn commit(&mut self, operation: &str, changed: bool) -> bool {
        if !changed {
            tracing::debug!(operation, "Mutation target not found, query unchanged");
            return false;
        }

        self.version += 1;
        tracing::debug!(operation, version = self.version, "Query changed");
        self.notifier.changed(Arc::clone(&self.root));
        self.flush();
        true
    }

    fn flush(&self) {
        if !self.deferred {
            self.notifier.deliver();
        }
    }

    /// Stop delivering inline; the returned notifier must be drained by the
    /// caller once it no longer holds the builder
    pub(crate) fn defer_notifications(&mut self) -> Arc<Notifier> {
        self.deferred = true;
        Arc::clone(&self.notifier)
    }

    /// A new id that no node in the current tree uses
    fn fresh_id(&self, kind: NodeKind) -> String {
        next_free_id(self.ids.as_ref(), kind, |id| {
            query::find_node(id, &self.root).is_some()
        })
    }

    fn normalize_rule(&self, raw: &JsonValue) -> Result<Rule, QueryError> {
        match normalize_within(raw, self.ids.as_ref(), &self.root)? {
            RuleOrGroup::Rule(rule) => Ok(Arc::unwrap_or_clone(rule)),
            RuleOrGroup::Group(group) => Err(QueryError::kind_mismatch(&group.id, NodeKind::Rule)),
        }
    }

    fn normalize_group(&self, raw: &JsonValue) -> Result<RuleGroup, QueryError> {
        match normalize_within(raw, self.ids.as_ref(), &self.root)? {
            RuleOrGroup::Group(group) => Ok(Arc::unwrap_or_clone(group)),
            RuleOrGroup::Rule(rule) => Err(QueryError::kind_mismatch(&rule.id, NodeKind::Group)),
        }
    }
}

fn first_combinator(config: &BuilderConfig) -> Result<String, QueryError> {
    config
        .combinators()
        .first()
        .map(|c| c.name.clone())
        .ok_or(QueryError::NoCombinators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Field;
    use crate::domain::query::SequentialIdGenerator;
    use parking_lot::Mutex;
    use serde_json::json;

    fn config() -> BuilderConfig {
        BuilderConfig::new(vec![
            Field::new("firstName", "First Name"),
            Field::new("age", "Age")
                .with_operators(vec![NameLabelPair::new(">", "greater than")])
                .with_input_type("number"),
        ])
    }

    fn builder() -> QueryBuilder {
        QueryBuilder::with_id_generator(config(), SequentialIdGenerator::new()).unwrap()
    }

    fn recorder(builder: &mut QueryBuilder) -> Arc<Mutex<Vec<RuleGroup>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        builder.subscribe(move |query| sink.lock().push(query));
        seen
    }

    #[test]
    fn test_starts_with_empty_group() {
        let b = builder();
        assert_eq!(b.root().id, "g-1");
        assert_eq!(b.root().combinator, "and");
        assert!(b.root().is_empty());
        assert_eq!(b.version(), 0);
    }

    #[test]
    fn test_initial_query_is_normalized() {
        let config = config().with_query(json!({
            "combinator": "or",
            "rules": [{"field": "age", "operator": ">", "value": 3}]
        }));
        let b = QueryBuilder::with_id_generator(config, SequentialIdGenerator::new()).unwrap();
        assert_eq!(b.root().id, "g-1");
        assert_eq!(b.root().rules[0].id(), "r-2");
    }

    #[test]
    fn test_initial_rule_root_is_rejected() {
        let config = config().with_query(json!({"field": "age"}));
        let err = QueryBuilder::new(config).unwrap_err();
        assert!(matches!(err, QueryError::RootNotGroup));
    }

    #[test]
    fn test_create_rule_defaults() {
        let b = builder();
        let rule = b.create_rule().unwrap();
        assert_eq!(rule.id, "r-2");
        assert_eq!(rule.field(), "firstName");
        assert_eq!(rule.operator(), "null");
        assert_eq!(rule.value(), &json!(""));
    }

    #[test]
    fn test_create_rule_without_fields() {
        let b = QueryBuilder::new(BuilderConfig::default()).unwrap();
        assert!(matches!(b.create_rule(), Err(QueryError::NoFields)));
    }

    #[test]
    fn test_create_group_without_combinators() {
        let config = BuilderConfig {
            combinators: Vec::new(),
            query: Some(json!({"combinator": "and", "rules": []})),
            ..config()
        };
        let b = QueryBuilder::new(config).unwrap();
        assert!(matches!(b.create_group(), Err(QueryError::NoCombinators)));
    }

    #[test]
    fn test_subscribe_notifies_immediately() {
        let mut b = builder();
        let seen = recorder(&mut b);
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(seen.lock()[0].id, "g-1");
    }

    #[test]
    fn test_mutation_bumps_version_and_notifies() {
        let mut b = builder();
        let seen = recorder(&mut b);

        let rule = b.create_rule().unwrap();
        assert!(b.add_rule(rule, "g-1").unwrap());

        assert_eq!(b.version(), 1);
        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].len(), 1);
    }

    #[test]
    fn test_noop_mutation_is_silent() {
        let mut b = builder();
        let seen = recorder(&mut b);

        assert!(!b.remove_rule("r-404", "g-1").unwrap());
        assert_eq!(b.version(), 0);
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_failed_mutation_is_silent() {
        let mut b = builder();
        let rule = b.create_rule().unwrap();
        b.add_rule(rule, "g-1").unwrap();
        let seen = recorder(&mut b);

        let group = b.create_group().unwrap();
        let err = b.add_group(group, "r-2").unwrap_err();
        assert!(err.is_shape_violation());
        assert_eq!(b.version(), 1);
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_listener_copy_is_independent() {
        let mut b = builder();
        let seen = recorder(&mut b);
        b.apply(Mutation::AddRule {
            parent_id: "g-1".into(),
            rule: None,
        })
        .unwrap();

        seen.lock()[1].combinator = "changed".into();
        assert_eq!(b.root().combinator, "and");
    }

    #[test]
    fn test_apply_with_raw_nodes() {
        let mut b = builder();
        b.apply(Mutation::AddGroup {
            parent_id: "g-1".into(),
            group: Some(json!({"combinator": "or", "rules": [{"field": "age"}]})),
        })
        .unwrap();

        let inner = b.root().rules[0].as_group().unwrap();
        assert_eq!(inner.id, "g-2");
        assert_eq!(inner.rules[0].id(), "r-3");
        assert_eq!(b.level("r-3"), Some(1));
    }

    #[test]
    fn test_apply_rejects_wrong_raw_kind() {
        let mut b = builder();
        let err = b
            .apply(Mutation::AddRule {
                parent_id: "g-1".into(),
                rule: Some(json!({"combinator": "and", "rules": []})),
            })
            .unwrap_err();
        assert!(matches!(err, QueryError::KindMismatch { .. }));
        assert!(b.root().is_empty());
    }

    #[test]
    fn test_field_change_resets_operator_and_value() {
        let mut b = builder();
        b.apply(Mutation::AddRule {
            parent_id: "g-1".into(),
            rule: Some(json!({"id": "r-x", "field": "firstName", "operator": "=", "value": "Jo"})),
        })
        .unwrap();

        b.set_property("field", json!("age"), "r-x").unwrap();
        let rule = b.find("r-x").unwrap().as_rule().unwrap();
        assert_eq!(rule.field(), "age");
        assert_eq!(rule.operator(), ">");
        assert_eq!(rule.value(), &json!(""));
    }

    #[test]
    fn test_set_query_bumps_version_without_notify() {
        let mut b = builder();
        let seen = recorder(&mut b);

        b.set_query(&json!({"id": "g-new", "combinator": "or", "rules": []}))
            .unwrap();
        assert_eq!(b.root().id, "g-new");
        assert_eq!(b.version(), 1);
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_snapshot_is_history() {
        let mut b = builder();
        let before = b.snapshot();
        let rule = b.create_rule().unwrap();
        b.add_rule(rule, "g-1").unwrap();

        assert!(before.is_empty());
        assert_eq!(b.root().len(), 1);
    }

    #[test]
    fn test_field_lookups() {
        let b = builder();
        assert_eq!(b.operators("age").len(), 1);
        assert_eq!(b.operators("firstName").len(), 10);
        assert_eq!(b.combinators().len(), 2);
        assert_eq!(b.input_type("age"), "number");
        assert_eq!(b.input_type("firstName"), "text");
        assert_eq!(b.value_editor_type("age"), ValueEditorType::Text);
        assert!(b.values("age").is_empty());
    }

    #[test]
    fn test_created_ids_skip_ids_in_tree() {
        let mut b = builder();
        b.set_query(&json!({"id": "g-x", "combinator": "and", "rules": [{"id": "r-2"}]}))
            .unwrap();

        let rule = b.create_rule().unwrap();
        assert_eq!(rule.id, "r-3");
        assert!(b.add_rule(rule, "g-x").unwrap());
    }

    #[test]
    fn test_apply_raw_node_skips_ids_in_tree() {
        let mut b = builder();
        b.set_query(&json!({"id": "g-x", "combinator": "and", "rules": [{"id": "g-2"}]}))
            .unwrap();

        b.apply(Mutation::AddGroup {
            parent_id: "g-x".into(),
            group: Some(json!({"combinator": "or", "rules": []})),
        })
        .unwrap();
        assert_eq!(b.root().rules[1].id(), "g-3");
    }

    #[test]
    fn test_format_by_name() {
        let b = builder();
        assert_eq!(b.format_as("sql", None).unwrap().as_deref(), Some("()"));
        assert_eq!(b.format_as("toml", None).unwrap(), None);
    }
}
