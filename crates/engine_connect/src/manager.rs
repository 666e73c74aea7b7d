//! The per-world connections directory.
//!
//! The [`ConnectionsManager`] maps every registered port to its owner,
//! direction, kind and element type, and records which outputs feed which
//! inputs. It is the only place links are created or removed; the typed ports
//! themselves never see it after construction.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::PortError;
use crate::port::{ComponentId, Direction, ElementType, PortId, PortInfo, PortKind};

/// One registered port.
struct PortRecord {
    info: PortInfo,
    endpoint: Rc<dyn Endpoint>,
}

/// One live output → input binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    output: PortId,
    input: PortId,
}

/// Type-checked directory of ports and the links between them.
///
/// One instance per world. All methods run on the frame thread; nothing here
/// is shared across threads.
pub struct ConnectionsManager {
    next_port: u64,
    next_owner: u64,
    ports: HashMap<PortId, PortRecord>,
    by_owner: HashMap<ComponentId, Vec<PortId>>,
    links: Vec<Link>,
}

impl ConnectionsManager {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_port: 1,
            next_owner: 1,
            ports: HashMap::new(),
            by_owner: HashMap::new(),
            links: Vec::new(),
        }
    }

    /// Allocate a new owner identity for a component about to create ports.
    pub fn register_component(&mut self) -> ComponentId {
        let id = ComponentId(self.next_owner);
        self.next_owner += 1;
        id
    }

    /// Borrow a registrar that creates ports on behalf of `owner`.
    pub fn registrar(&mut self, owner: ComponentId) -> PortRegistrar<'_> {
        PortRegistrar {
            connections: self,
            owner,
        }
    }

    pub(crate) fn register(
        &mut self,
        owner: ComponentId,
        direction: Direction,
        kind: PortKind,
        element: ElementType,
        endpoint: Rc<dyn Endpoint>,
    ) -> PortId {
        let id = PortId(self.next_port);
        self.next_port += 1;

        let info = PortInfo {
            id,
            owner,
            direction,
            kind,
            element,
        };
        self.ports.insert(id, PortRecord { info, endpoint });
        self.by_owner.entry(owner).or_default().push(id);

        debug!(port = id.0, owner = owner.0, %direction, %kind, element = element.name, "registered port");
        id
    }

    /// Link `output` to `input`.
    ///
    /// The check order is: both registered, out → in, same kind, same element
    /// type, input not already fed. On any failure neither port is touched.
    ///
    /// # Errors
    ///
    /// Returns the first [`PortError`] the check order above hits.
    pub fn connect(&mut self, output: PortId, input: PortId) -> Result<(), PortError> {
        let result = self.try_connect(output, input);
        match &result {
            Ok(()) => debug!(output = output.0, input = input.0, "linked ports"),
            Err(error) => warn!(output = output.0, input = input.0, %error, "rejected port link"),
        }
        result
    }

    fn try_connect(&mut self, output: PortId, input: PortId) -> Result<(), PortError> {
        let out = self.ports.get(&output).ok_or(PortError::UnknownPort(output))?;
        let inp = self.ports.get(&input).ok_or(PortError::UnknownPort(input))?;

        if out.info.direction != Direction::Out || inp.info.direction != Direction::In {
            return Err(PortError::DirectionMismatch {
                output,
                output_direction: out.info.direction,
                input,
                input_direction: inp.info.direction,
            });
        }
        if out.info.kind != inp.info.kind {
            return Err(PortError::KindMismatch {
                output,
                output_kind: out.info.kind,
                input,
                input_kind: inp.info.kind,
            });
        }
        let mismatch = PortError::TypeMismatch {
            output,
            output_type: out.info.element.name,
            input,
            input_type: inp.info.element.name,
        };
        if out.info.element.id != inp.info.element.id {
            return Err(mismatch);
        }

        let already = match inp.info.kind {
            PortKind::Property => self.links.iter().any(|l| l.input == input),
            PortKind::Message => self.links.iter().any(|l| l.input == input && l.output == output),
        };
        if already {
            return Err(PortError::AlreadyConnected(input));
        }

        if !inp.endpoint.attach(out.endpoint.as_ref(), input) {
            return Err(mismatch);
        }
        self.links.push(Link { output, input });
        Ok(())
    }

    /// Remove every link that involves `port`, in either role.
    ///
    /// Returns the number of links removed.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnknownPort`] if `port` is not registered.
    pub fn disconnect(&mut self, port: PortId) -> Result<usize, PortError> {
        if !self.ports.contains_key(&port) {
            return Err(PortError::UnknownPort(port));
        }

        let (dropped, kept): (Vec<Link>, Vec<Link>) = std::mem::take(&mut self.links)
            .into_iter()
            .partition(|l| l.output == port || l.input == port);
        self.links = kept;

        for link in &dropped {
            if let (Some(out), Some(inp)) = (self.ports.get(&link.output), self.ports.get(&link.input)) {
                inp.endpoint.detach(out.endpoint.as_ref(), link.input);
            }
        }

        if !dropped.is_empty() {
            debug!(port = port.0, links = dropped.len(), "unlinked port");
        }
        Ok(dropped.len())
    }

    /// Disconnect `port` and drop its directory entry.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnknownPort`] if `port` is not registered.
    pub fn unregister(&mut self, port: PortId) -> Result<(), PortError> {
        self.disconnect(port)?;
        if let Some(record) = self.ports.remove(&port) {
            let owner = record.info.owner;
            if let Some(owned) = self.by_owner.get_mut(&owner) {
                owned.retain(|id| *id != port);
                if owned.is_empty() {
                    self.by_owner.remove(&owner);
                }
            }
        }
        Ok(())
    }

    /// Disconnect and unregister every port owned by `owner`.
    ///
    /// Called when a component is torn down, before its destroy hook runs.
    /// Returns the number of ports released.
    pub fn release_component(&mut self, owner: ComponentId) -> usize {
        let owned = self.by_owner.get(&owner).cloned().unwrap_or_default();
        for port in &owned {
            // Ports listed under an owner are always registered.
            let _ = self.unregister(*port);
        }
        if !owned.is_empty() {
            debug!(owner = owner.0, ports = owned.len(), "released component ports");
        }
        owned.len()
    }

    /// Unlink and forget every port. Used at world teardown.
    pub fn clear(&mut self) {
        let ports: Vec<PortId> = self.ports.keys().copied().collect();
        for port in ports {
            let _ = self.unregister(port);
        }
    }

    /// Registration record of `port`, if registered.
    #[must_use]
    pub fn info(&self, port: PortId) -> Option<&PortInfo> {
        self.ports.get(&port).map(|r| &r.info)
    }

    /// Returns `true` if `port` takes part in at least one link.
    #[must_use]
    pub fn is_connected(&self, port: PortId) -> bool {
        self.links.iter().any(|l| l.output == port || l.input == port)
    }

    /// Ports on the other end of every link involving `port`.
    #[must_use]
    pub fn peers(&self, port: PortId) -> Vec<PortId> {
        self.links
            .iter()
            .filter_map(|l| {
                if l.output == port {
                    Some(l.input)
                } else if l.input == port {
                    Some(l.output)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Ports currently registered to `owner`.
    #[must_use]
    pub fn ports_of(&self, owner: ComponentId) -> &[PortId] {
        self.by_owner.get(&owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of registered ports.
    #[must_use]
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Number of live links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

impl Default for ConnectionsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionsManager")
            .field("ports", &self.ports.len())
            .field("owners", &self.by_owner.len())
            .field("links", &self.links)
            .finish()
    }
}

/// Registration capability handed to port constructors.
///
/// Ports created through one registrar all belong to the same owner.
pub struct PortRegistrar<'a> {
    connections: &'a mut ConnectionsManager,
    owner: ComponentId,
}

impl PortRegistrar<'_> {
    /// The owner new ports are registered under.
    #[must_use]
    pub fn owner(&self) -> ComponentId {
        self.owner
    }

    pub(crate) fn register(
        &mut self,
        direction: Direction,
        kind: PortKind,
        element: ElementType,
        endpoint: Rc<dyn Endpoint>,
    ) -> PortId {
        self.connections
            .register(self.owner, direction, kind, element, endpoint)
    }
}
