//! Egalitarian processor-sharing service center.
//!
//! All `n` jobs present are served simultaneously, each at rate `1/n`.  There
//! is no waiting line: a job is either absent or in service.
//!
//! # Progress accounting
//!
//! Service progress is applied lazily by [`Center::advance_to`], which must
//! run before every membership change or statistics query.  Between two calls
//! the population is constant, so each member loses exactly `dt / n` of its
//! remaining requirement and the area under the population curve grows by
//! `n * dt`.
//!
//! # Generation stamps
//!
//! Every admission and removal bumps `generation`.  A departure event carries
//! the generation it was scheduled under and is honored only if that still
//! matches, so superseded events can sit in the agenda until popped instead
//! of being searched for and removed.

use qn_core::{CenterId, JobId, SimTime};

use crate::Job;

#[derive(Debug)]
pub struct Center {
    pub id:   CenterId,
    pub name: String,

    /// Members in arrival order.  Order never affects service (all members
    /// are symmetric); it only breaks ties between equal remaining work.
    members: Vec<Job>,

    last_update: SimTime,
    busy_time:   SimTime,
    area:        f64,
    arrivals:    u64,
    departures:  u64,
    generation:  u64,
}

impl Center {
    pub fn new(id: CenterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name:        name.into(),
            members:     Vec::new(),
            last_update: 0.0,
            busy_time:   0.0,
            area:        0.0,
            arrivals:    0,
            departures:  0,
            generation:  0,
        }
    }

    // ── Progress ──────────────────────────────────────────────────────────

    /// Apply service progress and statistics for `(last_update, now]`.
    ///
    /// `now` earlier than the last update is a driver bug; it is ignored in
    /// release builds rather than rewinding the center.
    pub fn advance_to(&mut self, now: SimTime) {
        let dt = now - self.last_update;
        debug_assert!(dt >= 0.0, "{} advanced backwards: {} -> {now}", self.name, self.last_update);
        if dt <= 0.0 {
            if dt == 0.0 {
                self.last_update = now;
            }
            return;
        }

        let n = self.members.len();
        if n > 0 {
            let per_job = dt / n as f64;
            for job in &mut self.members {
                if let Some(r) = job.remaining.as_mut() {
                    *r -= per_job;
                }
            }
            self.busy_time += dt;
        }
        self.area += n as f64 * dt;
        self.last_update = now;
    }

    // ── Membership ────────────────────────────────────────────────────────

    /// Start serving `job` with `requirement` units of work.
    ///
    /// The caller must already have called `advance_to(now)` for the same
    /// instant so the elapsed interval is charged to the old population.
    pub fn admit(&mut self, mut job: Job, requirement: f64) {
        job.remaining = Some(requirement);
        job.center = Some(self.id);
        self.members.push(job);
        self.arrivals += 1;
        self.generation += 1;
    }

    /// Absolute time of the next departure if membership stays unchanged.
    ///
    /// Every member drains at the same rate `1/n`, so the member with least
    /// remaining work leaves first, `remaining * n` seconds from now.
    pub fn next_departure_time(&self, now: SimTime) -> Option<SimTime> {
        let n = self.members.len() as f64;
        self.members
            .iter()
            .map(|j| j.remaining.unwrap_or(0.0).max(0.0))
            .min_by(f64::total_cmp)
            .map(|least| now + least * n)
    }

    /// Remove and return the member with least remaining work, provided
    /// `generation` is still current.  A stale stamp returns `None` and
    /// changes nothing.
    ///
    /// Ties go to the earliest-admitted member.
    pub fn complete(&mut self, generation: u64) -> Option<Job> {
        if generation != self.generation {
            return None;
        }
        let idx = self.least_remaining()?;
        let mut job = self.members.remove(idx);
        job.remaining = None;
        job.center = None;
        self.departures += 1;
        self.generation += 1;
        Some(job)
    }

    fn least_remaining(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, job) in self.members.iter().enumerate() {
            let r = job.remaining.unwrap_or(0.0);
            // Strict `<` keeps the first of equal candidates.
            if best.is_none_or(|(_, b)| r < b) {
                best = Some((i, r));
            }
        }
        best.map(|(i, _)| i)
    }

    // ── Statistics ────────────────────────────────────────────────────────

    /// Zero the accumulators while keeping members, timestamp, and
    /// generation.  Used at batch boundaries.
    pub fn reset_statistics(&mut self) {
        self.busy_time = 0.0;
        self.area = 0.0;
        self.arrivals = 0;
        self.departures = 0;
    }

    #[inline]
    pub fn population(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        !self.members.is_empty()
    }

    /// Accumulated time with at least one member present.
    pub fn busy_time(&self) -> SimTime {
        self.busy_time
    }

    /// Time integral of the population.
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn departures(&self) -> u64 {
        self.departures
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_update(&self) -> SimTime {
        self.last_update
    }

    pub fn members(&self) -> &[Job] {
        &self.members
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.members.iter().find(|j| j.id == id)
    }
}
