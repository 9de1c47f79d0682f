use crate::{client::ComputeClient, server::ComputeServer};
use hashbrown::HashMap;

/// The compute type has the responsibility to retrieve the correct compute client based on the
/// given device.
pub struct ComputeRuntime<Device, Server: ComputeServer> {
    clients: spin::Mutex<Option<HashMap<Device, ComputeClient<Server>>>>,
}

impl<Device, Server> Default for ComputeRuntime<Device, Server>
where
    Device: core::hash::Hash + PartialEq + Eq + Clone + core::fmt::Debug,
    Server: ComputeServer,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Device, Server> ComputeRuntime<Device, Server>
where
    Device: core::hash::Hash + PartialEq + Eq + Clone + core::fmt::Debug,
    Server: ComputeServer,
{
    /// Create a new compute.
    pub const fn new() -> Self {
        Self {
            clients: spin::Mutex::new(None),
        }
    }

    /// Get the compute client for the given device.
    ///
    /// Provide the init function to create a new client if it isn't already initialized.
    pub fn client<Init>(&self, device: &Device, init: Init) -> ComputeClient<Server>
    where
        Init: FnOnce() -> ComputeClient<Server>,
    {
        let mut clients = self.clients.lock();
        let clients = clients.get_or_insert_with(HashMap::new);

        clients
            .entry(device.clone())
            .or_insert_with(init)
            .clone()
    }
}
