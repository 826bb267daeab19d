use ahash::{HashMap, HashMapExt};
use clap::ValueEnum;
use tracing::debug;

use crate::error::BenchError;
use crate::input::QueryDescriptor;

pub const MAX_WORKERS: usize = 50;

/// How a host seen for the first time is given a slot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Balance {
    /// Next slot after the previously assigned one, wrapping at the worker count.
    /// Once distinct hosts outnumber workers the early slots get more hosts.
    #[default]
    RoundRobin,
    /// Slot currently holding the fewest descriptors, lowest index on ties.
    LeastLoaded,
}

/// The descriptors one worker executes, in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub slot: usize,
    pub descriptors: Vec<QueryDescriptor>,
}

/// Routes descriptors to worker slots so that each host stays on one slot.
pub struct Partitioner {
    balance: Balance,
    slots: HashMap<String, usize>,
    cursor: usize,
    partitions: Vec<Vec<QueryDescriptor>>,
}

impl Partitioner {
    pub fn new(workers: usize, balance: Balance) -> Result<Partitioner, BenchError> {
        if workers == 0 || workers > MAX_WORKERS {
            return Err(BenchError::Argument(format!(
                "invalid number of workers: {} (expected 1 to {})",
                workers, MAX_WORKERS
            )));
        }
        Ok(Partitioner {
            balance,
            slots: HashMap::new(),
            cursor: 0,
            partitions: vec![Vec::new(); workers],
        })
    }

    pub fn push(&mut self, descriptor: QueryDescriptor) {
        let slot = match self.slots.get(&descriptor.host) {
            Some(&slot) => slot,
            None => {
                let slot = self.next_slot();
                self.slots.insert(descriptor.host.clone(), slot);
                slot
            }
        };
        debug!(
            "adding to slot {}: {}, {}, {}",
            slot, descriptor.host, descriptor.start_time, descriptor.end_time
        );
        self.partitions[slot].push(descriptor);
    }

    fn next_slot(&mut self) -> usize {
        match self.balance {
            Balance::RoundRobin => {
                let slot = self.cursor;
                self.cursor = (self.cursor + 1) % self.partitions.len();
                slot
            }
            Balance::LeastLoaded => self
                .partitions
                .iter()
                .enumerate()
                .min_by_key(|(slot, partition)| (partition.len(), *slot))
                .map(|(slot, _)| slot)
                .unwrap_or(0),
        }
    }

    /// Drops the host map and any slot that never received a descriptor.
    /// The surviving partitions are numbered densely from 0.
    pub fn finish(self) -> Vec<Partition> {
        self.partitions
            .into_iter()
            .filter(|descriptors| !descriptors.is_empty())
            .enumerate()
            .map(|(slot, descriptors)| Partition { slot, descriptors })
            .collect()
    }
}

pub fn partition_descriptors(
    descriptors: impl IntoIterator<Item = Result<QueryDescriptor, BenchError>>,
    workers: usize,
    balance: Balance,
) -> Result<Vec<Partition>, BenchError> {
    let mut partitioner = Partitioner::new(workers, balance)?;
    for descriptor in descriptors {
        partitioner.push(descriptor?);
    }
    Ok(partitioner.finish())
}
