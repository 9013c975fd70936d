//! # Execution Universe
//!
//! A [`World`] is the distributed-rank topology the process runs under. It is
//! shared: several Contexts may use the same world one after another, and no
//! Context ever tears it down. At most one Context is live on a world at a
//! time; [`World::claim`] enforces that with an RAII [`WorldClaim`].
//!
//! A [`Universe`] is one Context's view of its world after `-partition`
//! has split it.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::ContextError;

/// Distributed-rank topology handle.
#[derive(Debug)]
pub struct World {
    id: Uuid,
    size: usize,
    rank: usize,
    live: Mutex<Option<Uuid>>,
}

static GLOBAL_WORLD: OnceLock<Arc<World>> = OnceLock::new();

impl World {
    /// The process-wide world: one rank, rank 0.
    pub fn global() -> Arc<World> {
        GLOBAL_WORLD
            .get_or_init(|| Arc::new(Self::unchecked(1, 0)))
            .clone()
    }

    /// An independent world of `size` ranks seen from `rank`.
    pub fn new(size: usize, rank: usize) -> Result<Arc<World>, ContextError> {
        if size == 0 {
            return Err(ContextError::InvalidWorld("world size must be positive".into()));
        }
        if rank >= size {
            return Err(ContextError::InvalidWorld(format!(
                "rank {rank} outside world of {size}"
            )));
        }
        Ok(Arc::new(Self::unchecked(size, rank)))
    }

    fn unchecked(size: usize, rank: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            size,
            rank,
            live: Mutex::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Whether a Context currently holds this world.
    pub fn is_claimed(&self) -> bool {
        self.live.lock().is_some()
    }

    /// Mark `context` as the live Context on this world.
    pub fn claim(self: &Arc<Self>, context: Uuid) -> Result<WorldClaim, ContextError> {
        let mut live = self.live.lock();
        if live.is_some() {
            return Err(ContextError::UniverseInUse);
        }
        *live = Some(context);
        debug!("[Universe] Context {} claimed world {}", context, self.id);
        Ok(WorldClaim {
            world: Arc::clone(self),
            context,
        })
    }
}

/// Releases the world when dropped.
#[derive(Debug)]
pub struct WorldClaim {
    world: Arc<World>,
    context: Uuid,
}

impl WorldClaim {
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }
}

impl Drop for WorldClaim {
    fn drop(&mut self) {
        let mut live = self.world.live.lock();
        if *live == Some(self.context) {
            *live = None;
            debug!(
                "[Universe] Context {} released world {}",
                self.context, self.world.id
            );
        }
    }
}

/// One Context's partitioned view of its world.
#[derive(Debug, Clone, Serialize)]
pub struct Universe {
    #[serde(skip)]
    world: Arc<World>,
    /// Ranks per partition.
    partitions: Vec<usize>,
    /// Partition this rank belongs to.
    iworld: usize,
    /// Rank within the partition.
    me: usize,
}

impl Universe {
    /// Split `world` into `partitions`; empty means one partition spanning
    /// the world.
    pub fn new(world: Arc<World>, partitions: &[usize]) -> Result<Self, ContextError> {
        let partitions = if partitions.is_empty() {
            vec![world.size()]
        } else {
            partitions.to_vec()
        };
        let requested = partitions
            .iter()
            .try_fold(0usize, |total, size| total.checked_add(*size))
            .ok_or_else(|| ContextError::InvalidWorld("partition sizes overflow".into()))?;
        if requested != world.size() {
            return Err(ContextError::PartitionMismatch {
                requested,
                world: world.size(),
            });
        }

        let mut first = 0;
        let mut placement = None;
        for (index, size) in partitions.iter().enumerate() {
            if world.rank() < first + size {
                placement = Some((index, world.rank() - first));
                break;
            }
            first += size;
        }
        let (iworld, me) = placement
            .ok_or_else(|| ContextError::InvalidWorld("rank not covered by partitions".into()))?;

        Ok(Self {
            world,
            partitions,
            iworld,
            me,
        })
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn nworlds(&self) -> usize {
        self.partitions.len()
    }

    pub fn partitions(&self) -> &[usize] {
        &self.partitions
    }

    pub fn iworld(&self) -> usize {
        self.iworld
    }

    pub fn me(&self) -> usize {
        self.me
    }

    /// Ranks in this rank's partition.
    pub fn partition_size(&self) -> usize {
        self.partitions[self.iworld]
    }

    /// Rank 0 of the world writes the banner and the summary.
    pub fn is_root(&self) -> bool {
        self.world.rank() == 0
    }
}
