//! # Descriptor Kind Integration Tests
//!
//! Builds a small column descriptor on top of `DescriptorNode` the way a
//! concrete descriptor kind would: by composition, overriding `initialise()`
//! to derive its own fields before handing off to the base transition. The
//! kinds live in a `NodeTable` and are driven through a loading pass that
//! skips user errors and stops at the first fatal one.

use metanode_core::{MetaDataError, NodeId, Severity};
use metanode_state::{
    ClassLoaderResolver, Descriptor, DescriptorNode, ExtensionSet, HasExtensions, HasLifecycle,
    Lifecycle, LifecycleState, MetaDataManager, NodeTable,
};

struct Resolver;
impl ClassLoaderResolver for Resolver {}

struct Manager;
impl MetaDataManager for Manager {}

/// Column descriptor whose length comes from the `column-length` extension.
#[derive(Debug)]
struct ColumnDescriptor {
    node: DescriptorNode,
    name: String,
    length: Option<u32>,
}

impl ColumnDescriptor {
    fn new(parent: Option<NodeId>, name: &str) -> Self {
        Self {
            node: DescriptorNode::with_parent(parent),
            name: name.to_string(),
            length: None,
        }
    }
}

impl HasLifecycle for ColumnDescriptor {
    fn lifecycle(&self) -> &Lifecycle {
        self.node.lifecycle()
    }
}

impl HasExtensions for ColumnDescriptor {
    fn extension_set(&self) -> &ExtensionSet {
        self.node.extension_set()
    }
}

impl Descriptor for ColumnDescriptor {
    fn node(&self) -> &DescriptorNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut DescriptorNode {
        &mut self.node
    }

    fn initialise(
        &mut self,
        _clr: &dyn ClassLoaderResolver,
        _mmgr: &dyn MetaDataManager,
    ) -> Result<(), MetaDataError> {
        if let Some(raw) = self.value_for_extension("column-length") {
            let length = raw.parse::<u32>().map_err(|e| {
                MetaDataError::user(format!("column {}: bad column-length {raw:?}: {e}", self.name))
            })?;
            self.length = Some(length);
        }
        if self.value_for_extension("datastore") == Some("unreachable") {
            return Err(MetaDataError::datastore_initialisation(
                format!("column {} needs a datastore that is not available", self.name),
                None,
            ));
        }
        self.node.mark_initialised();
        Ok(())
    }
}

/// Initialise every node in `order`, skipping user errors and aborting on
/// the first fatal one. Returns the ids that failed recoverably.
fn initialise_pass(
    table: &mut NodeTable<ColumnDescriptor>,
    order: &[NodeId],
) -> Result<Vec<NodeId>, MetaDataError> {
    let mut skipped = Vec::new();
    for id in order {
        let Some(column) = table.get_mut(*id) else {
            continue;
        };
        match column.initialise(&Resolver, &Manager) {
            Ok(()) => {}
            Err(e) if e.severity() == Severity::User => skipped.push(*id),
            Err(e) => return Err(e),
        }
    }
    Ok(skipped)
}

#[test]
fn derived_initialise_runs_setup_then_base_transition() {
    let mut column = ColumnDescriptor::new(None, "name");
    column.node_mut().add_extension("column-length", "255");
    column.initialise(&Resolver, &Manager).unwrap();
    assert_eq!(column.length, Some(255));
    assert!(column.is_initialised());
    assert!(column.node_mut().set_parent(None).is_err());
}

#[test]
fn failed_setup_leaves_node_created() {
    let mut column = ColumnDescriptor::new(None, "age");
    column.node_mut().add_extension("column-length", "many");
    let err = column.initialise(&Resolver, &Manager).unwrap_err();
    assert!(!err.is_fatal());
    assert_eq!(column.lifecycle_state(), LifecycleState::Created);
    assert!(column.node_mut().set_parent(Some(NodeId::new())).is_ok());
}

#[test]
fn loading_pass_skips_user_errors() {
    let mut table = NodeTable::new();
    let table_id = NodeId::new();

    let mut good = ColumnDescriptor::new(Some(table_id), "id");
    good.node_mut().add_extension("column-length", "10");
    let mut bad = ColumnDescriptor::new(Some(table_id), "title");
    bad.node_mut().add_extension("column-length", "-1");

    let good_id = table.insert(good);
    let bad_id = table.insert(bad);

    let skipped = initialise_pass(&mut table, &[good_id, bad_id]).unwrap();
    assert_eq!(skipped, vec![bad_id]);
    assert!(table.get(good_id).unwrap().is_initialised());
    assert!(!table.get(bad_id).unwrap().is_populated());
}

#[test]
fn loading_pass_aborts_on_fatal_error() {
    let mut table = NodeTable::new();
    let mut broken = ColumnDescriptor::new(None, "blob");
    broken.node_mut().add_extension("datastore", "unreachable");
    let later = ColumnDescriptor::new(None, "after");

    let broken_id = table.insert(broken);
    let later_id = table.insert(later);

    let err = initialise_pass(&mut table, &[broken_id, later_id]).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, MetaDataError::DatastoreInitialisation { .. }));
    assert!(!table.get(later_id).unwrap().is_initialised());
}

#[test]
fn copies_of_initialised_kinds_start_over() {
    let mut table = NodeTable::new();
    let parent = table.insert(ColumnDescriptor::new(None, "owner"));

    let mut source = ColumnDescriptor::new(Some(parent), "src");
    source.node_mut().add_extension("a", "1").add_extension("b", "2");
    source
        .node_mut()
        .add_vendor_extension(Some("acme"), Some("hint"), Some("fast"))
        .unwrap();
    source.initialise(&Resolver, &Manager).unwrap();

    let copy = ColumnDescriptor {
        node: DescriptorNode::copy_from(None, source.node()),
        name: "copy".to_string(),
        length: None,
    };
    assert_eq!(copy.lifecycle_state(), LifecycleState::Created);
    assert_eq!(copy.no_of_extensions(), 3);
    assert_eq!(copy.node().parent(), None);

    let copy_id = table.insert(copy);
    assert!(table.ancestors(copy_id).is_empty());
    table.get_mut(copy_id).unwrap().node_mut().set_parent(Some(parent)).unwrap();
    assert_eq!(table.ancestors(copy_id), vec![parent]);
}

#[test]
fn used_marker_is_terminal() {
    let mut column = ColumnDescriptor::new(None, "c");
    column.initialise(&Resolver, &Manager).unwrap();
    assert!(!column.is_used());
    column.node_mut().mark_used();
    assert!(column.is_used());
    column.node_mut().mark_populated();
    assert_eq!(column.lifecycle_state(), LifecycleState::Used);
    assert_eq!(column.node().transitions().len(), 2);
}
