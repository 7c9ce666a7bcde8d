//! Netlist and topology management.
//!
//! The [`Circuit`] exclusively owns the device collection and the node
//! bookkeeping: the name↔id bimap, the ground set, and label sets. Node ids
//! are allocated monotonically and never reissued; merging two nets (wire
//! connects or shared labels) rewrites every device terminal, label set, and
//! ground entry to the surviving id in one pass.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use indexmap::IndexMap;
use voltlab_core::mna::MnaIndex;
use voltlab_core::{Error, Node, NodeId, Result};
use voltlab_devices::Device;

/// A circuit: devices plus node topology.
#[derive(Debug, Default)]
pub struct Circuit {
    devices: Vec<Device>,
    /// Live nodes in creation order (ascending id; merges leave gaps).
    nodes: IndexMap<NodeId, Node>,
    /// Every user-visible name, including names redirected by merges.
    names: HashMap<String, NodeId>,
    /// Node ids held at the reference potential.
    grounds: BTreeSet<NodeId>,
    /// Label name -> co-labeled node ids, unified before assembly.
    labels: BTreeMap<String, BTreeSet<NodeId>>,
    next_node_id: u32,
    has_nonlinear: bool,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    // ────────────────────── nodes ──────────────────────

    /// Get the id for a node name, allocating a fresh id if new.
    pub fn get_or_create_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.names.get(name) {
            return id;
        }
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(id, Node::new(id, name));
        self.names.insert(name.to_string(), id);
        id
    }

    /// Look up a node by name without creating it.
    pub fn lookup_node(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// The primary name of a live node id.
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.name())
    }

    /// Iterate live nodes in ascending id order.
    pub fn live_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Rename a node. Fails with `UnknownNode` if `old` is absent and
    /// `DuplicateName` if `new` is already taken. Renaming never alters
    /// any solution.
    pub fn rename_node(&mut self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        let id = self
            .names
            .get(old)
            .copied()
            .ok_or_else(|| Error::UnknownNode(old.to_string()))?;
        if self.names.contains_key(new) {
            return Err(Error::DuplicateName(new.to_string()));
        }
        self.names.remove(old);
        self.names.insert(new.to_string(), id);
        if let Some(node) = self.nodes.get_mut(&id) {
            if node.name() == old {
                node.set_name(new);
            }
        }
        Ok(())
    }

    // ────────────────────── ground set ──────────────────────

    /// Mark a node as ground, creating it if necessary.
    pub fn add_ground(&mut self, name: &str) {
        let id = self.get_or_create_node(name);
        self.grounds.insert(id);
    }

    /// Unmark a ground node.
    pub fn remove_ground(&mut self, name: &str) -> Result<()> {
        let id = self
            .names
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownNode(name.to_string()))?;
        self.grounds.remove(&id);
        Ok(())
    }

    /// Whether an id belongs to the ground set.
    pub fn is_ground(&self, id: NodeId) -> bool {
        self.grounds.contains(&id)
    }

    /// Fail with `NoGround` unless at least one ground is marked.
    pub fn require_ground(&self) -> Result<()> {
        if self.grounds.is_empty() {
            Err(Error::NoGround)
        } else {
            Ok(())
        }
    }

    // ────────────────────── devices ──────────────────────

    /// Add a device. Rejects duplicate names and devices whose two terminals
    /// are the same node.
    pub fn add_device(&mut self, device: Device) -> Result<()> {
        if self.devices.iter().any(|d| d.name() == device.name()) {
            return Err(Error::DuplicateName(device.name().to_string()));
        }
        let (n1, n2) = device.terminals();
        if n1 == n2 {
            return Err(Error::DegenerateDevice(device.name().to_string()));
        }
        self.has_nonlinear |= device.is_nonlinear();
        self.devices.push(device);
        Ok(())
    }

    /// Remove a device by name, dropping its history.
    pub fn delete_device(&mut self, name: &str) -> Result<()> {
        let pos = self
            .devices
            .iter()
            .position(|d| d.name() == name)
            .ok_or_else(|| Error::UnknownDevice(name.to_string()))?;
        self.devices.remove(pos);
        self.has_nonlinear = self.devices.iter().any(|d| d.is_nonlinear());
        Ok(())
    }

    /// Borrow a device by name.
    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name() == name)
    }

    /// Borrow a device mutably by name.
    pub fn device_mut(&mut self, name: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.name() == name)
    }

    /// All devices in insertion order.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// All devices, mutably.
    pub fn devices_mut(&mut self) -> &mut [Device] {
        &mut self.devices
    }

    /// Whether any nonlinear device is present.
    pub fn has_nonlinear(&self) -> bool {
        self.has_nonlinear
    }

    /// Whether an AC stimulus source is present.
    pub fn has_ac_source(&self) -> bool {
        self.devices.iter().any(|d| d.is_ac_source())
    }

    // ────────────────────── merging ──────────────────────

    /// Merge the nets of two named nodes: the larger id folds into the
    /// smaller. Idempotent and order-independent on the merged class.
    pub fn connect_nodes(&mut self, a: &str, b: &str) -> Result<()> {
        let ia = self
            .names
            .get(a)
            .copied()
            .ok_or_else(|| Error::UnknownNode(a.to_string()))?;
        let ib = self
            .names
            .get(b)
            .copied()
            .ok_or_else(|| Error::UnknownNode(b.to_string()))?;
        if ia == ib {
            return Ok(());
        }
        let (dst, src) = if ia < ib { (ia, ib) } else { (ib, ia) };
        self.merge_ids(dst, src);
        Ok(())
    }

    /// Associate a node with a label. All co-labeled nodes are merged by
    /// [`process_label_merges`](Self::process_label_merges) before assembly.
    pub fn label(&mut self, label: &str, node: &str) {
        let id = self.get_or_create_node(node);
        self.labels.entry(label.to_string()).or_default().insert(id);
    }

    /// Unify every label set by merging all its members into the minimum id.
    /// Equivalent to wire connections between all co-labeled nodes.
    pub fn process_label_merges(&mut self) {
        let label_names: Vec<String> = self.labels.keys().cloned().collect();
        for name in label_names {
            // Re-read each set: earlier merges may have rewritten its ids.
            let ids: Vec<NodeId> = match self.labels.get(&name) {
                Some(set) => set.iter().copied().collect(),
                None => continue,
            };
            let Some(&dst) = ids.first() else { continue };
            for src in ids.into_iter().skip(1) {
                if src != dst {
                    self.merge_ids(dst, src);
                }
            }
        }
    }

    // ────────────────────── dense index ──────────────────────

    /// Materialize the dense MNA index for the current topology: non-ground
    /// nodes in ascending live-id order take rows `0..N`, then every
    /// current-unknown device takes a branch row in device-iteration order.
    ///
    /// Recomputed for every assembly; old indices are never reused across
    /// assemblies. Controlling references of CCVS/CCCS devices are validated
    /// here so a dangling name fails the analysis up front instead of
    /// mid-sweep.
    pub fn dense_index(&self) -> Result<MnaIndex> {
        let mut index = MnaIndex::new();
        for node in self.live_nodes() {
            if !self.is_ground(node.id()) {
                index.push_node(node.id());
            }
        }
        for device in &self.devices {
            if device.needs_current_unknown() {
                index.push_branch(device.name());
            }
        }

        for device in &self.devices {
            let ctrl = match device {
                Device::Ccvs(h) => Some(&h.ctrl_name),
                Device::Cccs(f) => Some(&f.ctrl_name),
                _ => None,
            };
            if let Some(name) = ctrl {
                if index.branch(name).is_none() {
                    return Err(Error::UnknownDevice(name.clone()));
                }
            }
        }

        Ok(index)
    }

    /// Fold `src` into `dst`: one pass over devices, labels, grounds, and
    /// the name maps. The id->name entry for `src` is dropped; its names
    /// redirect to `dst`.
    fn merge_ids(&mut self, dst: NodeId, src: NodeId) {
        for device in &mut self.devices {
            device.rewrite_node(src, dst);
        }
        for set in self.labels.values_mut() {
            if set.remove(&src) {
                set.insert(dst);
            }
        }
        if self.grounds.remove(&src) {
            self.grounds.insert(dst);
        }
        for id in self.names.values_mut() {
            if *id == src {
                *id = dst;
            }
        }
        self.nodes.shift_remove(&src);
    }
}
