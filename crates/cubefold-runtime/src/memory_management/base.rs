use serde::{Deserialize, Serialize};

/// Amount of memory in use by this allocator and statistics on how much memory is reserved and
/// wasted in total.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    /// The number of live allocations.
    pub number_allocs: u64,
    /// The number of bytes currently allocated.
    pub bytes_in_use: u64,
    /// The highest number of bytes allocated at once.
    pub bytes_peak: u64,
}

impl MemoryUsage {
    pub(crate) fn register_alloc(&mut self, size: u64) {
        self.number_allocs += 1;
        self.bytes_in_use += size;
        self.bytes_peak = self.bytes_peak.max(self.bytes_in_use);
    }

    pub(crate) fn register_dealloc(&mut self, size: u64) {
        self.number_allocs -= 1;
        self.bytes_in_use -= size;
    }
}

fn bytes_format(bytes: u64) -> String {
    let unit = 1000;

    if bytes < unit {
        format!("{bytes} B")
    } else {
        let size = bytes as f64;
        let exp = match size.log(1000.0).floor() as usize {
            0 => 1,
            e => e,
        };
        let unit_prefix = "KMGTPEZY".as_bytes();
        format!(
            "{:.2} {}B",
            (size / unit.pow(exp as u32) as f64),
            unit_prefix[exp - 1] as char,
        )
    }
}

impl core::fmt::Display for MemoryUsage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Memory Usage Report:")?;
        writeln!(f, "  Number of allocations: {}", self.number_allocs)?;
        writeln!(f, "  Bytes in use: {}", bytes_format(self.bytes_in_use))?;
        write!(f, "  Peak bytes in use: {}", bytes_format(self.bytes_peak))
    }
}

/// Memory limits of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDeviceProperties {
    /// The maximum number of bytes that can be allocated at once.
    pub max_memory: u64,
    /// The required memory offset alignment in bytes.
    pub alignment: u64,
}
