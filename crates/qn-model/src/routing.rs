//! Class-based routing: what happens to a job after each visit.
//!
//! The table is total over the pairs the network can actually produce.  A
//! lookup for any other pair is an error that halts the run; quietly sending
//! the job to the sink would skew throughput and response time with no sign
//! that anything went wrong.

use std::collections::{BTreeSet, VecDeque};

use qn_core::{CenterId, ClassId, Destination, NetworkConfig};

use crate::{Job, ModelError, ModelResult};

/// Dense `[center][class] → Destination` table plus the entry center.
#[derive(Clone, Debug)]
pub struct RoutingTable {
    table:   Vec<Vec<Option<Destination>>>,
    entry:   CenterId,
    classes: usize,
}

impl RoutingTable {
    /// Build from the configured rules.  Rejects out-of-range ids, duplicate
    /// rules, and class switches out of the last class.
    pub fn from_config(config: &NetworkConfig) -> ModelResult<Self> {
        let centers = config.center_count();
        let classes = config.class_count();
        if config.entry.index() >= centers {
            return Err(ModelError::UnknownCenter(config.entry));
        }

        let mut table = vec![vec![None; classes]; centers];
        for rule in &config.routes {
            if rule.center.index() >= centers {
                return Err(ModelError::UnknownCenter(rule.center));
            }
            if rule.class.index() >= classes {
                return Err(ModelError::UnknownClass(rule.class));
            }
            match rule.next {
                Destination::Center(c) if c.index() >= centers => {
                    return Err(ModelError::UnknownCenter(c));
                }
                Destination::ClassSwitch if rule.class.index() + 1 >= classes => {
                    return Err(ModelError::ClassOverflow { class: rule.class });
                }
                _ => {}
            }
            let cell = &mut table[rule.center.index()][rule.class.index()];
            if cell.is_some() {
                return Err(ModelError::InvalidRoute(format!(
                    "duplicate rule for {} at {}",
                    rule.class, rule.center
                )));
            }
            *cell = Some(rule.next);
        }

        Ok(Self {
            table,
            entry: config.entry,
            classes,
        })
    }

    /// Center where new and class-switched jobs are admitted.
    #[inline]
    pub fn entry(&self) -> CenterId {
        self.entry
    }

    /// Next step for `job` after finishing a visit at `center`.
    pub fn next_destination(&self, center: CenterId, job: &Job) -> ModelResult<Destination> {
        self.lookup(center, job.class)
    }

    fn lookup(&self, center: CenterId, class: ClassId) -> ModelResult<Destination> {
        self.table
            .get(center.index())
            .and_then(|row| row.get(class.index()))
            .copied()
            .flatten()
            .ok_or(ModelError::Unroutable { center, class })
    }

    /// Move `job` one step along the class sequence and return its new class.
    pub fn class_switch(&self, job: &mut Job) -> ModelResult<ClassId> {
        let next = job.class.next();
        if next.index() >= self.classes || next == job.class {
            return Err(ModelError::ClassOverflow { class: job.class });
        }
        job.class = next;
        Ok(next)
    }

    /// Every `(center, class)` pair a job can occupy, in discovery order,
    /// starting from `(entry, first class)`.
    ///
    /// Fails if a reachable pair has no rule, or if the sink is never
    /// reached (jobs would circulate forever).
    pub fn reachable(&self) -> ModelResult<Vec<(CenterId, ClassId)>> {
        let start = (self.entry, ClassId::FIRST);
        let mut seen = BTreeSet::from([start]);
        let mut order = vec![start];
        let mut queue = VecDeque::from([start]);
        let mut sink = false;

        while let Some((center, class)) = queue.pop_front() {
            let next = match self.lookup(center, class)? {
                Destination::Center(c) => (c, class),
                Destination::ClassSwitch => (self.entry, class.next()),
                Destination::Sink => {
                    sink = true;
                    continue;
                }
            };
            if seen.insert(next) {
                order.push(next);
                queue.push_back(next);
            }
        }

        if !sink {
            return Err(ModelError::NoSink);
        }
        Ok(order)
    }
}
