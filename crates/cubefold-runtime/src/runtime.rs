use crate::{client::ComputeClient, server::ComputeServer};
use cubefold_common::device::Device;

/// Runtime for the cubefold reduction engine.
pub trait Runtime: Send + Sync + 'static + core::fmt::Debug {
    /// The compute server used to run kernels and manage memory.
    type Server: ComputeServer;
    /// The device used to retrieve the compute client.
    type Device: Device;

    /// Retrieve the compute client from the runtime device.
    fn client(device: &Self::Device) -> ComputeClient<Self::Server>;

    /// The runtime name on the given device.
    fn name(client: &ComputeClient<Self::Server>) -> &'static str;
}
