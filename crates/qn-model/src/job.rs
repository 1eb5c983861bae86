//! The lifecycle record of one request.
//!
//! A `Job` is passive: the center and the driver mutate it.  It is owned by
//! exactly one place at a time (the center serving it, or the completed-jobs
//! collection once it reaches the sink) and is moved, never shared.
//!
//! # Visit state machine
//!
//! ```text
//!            begin_visit             end_visit
//!  Routing ──────────────▶ InVisit ─────────────▶ Routing ──▶ … ──▶ finish
//! ```
//!
//! `open_visit` holds the index of the single history entry whose exit time
//! is still pending, so closing a visit never scans the history.

use qn_core::{CenterId, ClassId, JobId, SimTime};

/// One visit to a center.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Visit {
    pub center:  CenterId,
    /// Class the job held while in this visit.
    pub class:   ClassId,
    /// 1-based count of visits this job has made to `center`.
    pub number:  u32,
    pub entered: SimTime,
    /// `None` while the visit is in progress.
    pub exited:  Option<SimTime>,
}

impl Visit {
    /// Time spent in this visit, once closed.
    pub fn duration(&self) -> Option<SimTime> {
        self.exited.map(|t| t - self.entered)
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    pub id:        JobId,
    pub birth:     SimTime,
    pub class:     ClassId,

    /// Service still owed at the current center; `None` outside service.
    pub remaining: Option<f64>,
    /// Center currently serving the job.
    pub center:    Option<CenterId>,
    /// Set once, when the job reaches the sink.
    pub finish:    Option<SimTime>,

    // Per-center accumulators, indexed by `CenterId`, grown on demand.
    residence:    Vec<SimTime>,
    requested:    Vec<f64>,
    visit_counts: Vec<u32>,

    history:    Vec<Visit>,
    open_visit: Option<usize>,
}

impl Job {
    /// A fresh job born at `birth` in the first class.
    pub fn new(id: JobId, birth: SimTime) -> Self {
        Self {
            id,
            birth,
            class:        ClassId::FIRST,
            remaining:    None,
            center:       None,
            finish:       None,
            residence:    Vec::new(),
            requested:    Vec::new(),
            visit_counts: Vec::new(),
            history:      Vec::new(),
            open_visit:   None,
        }
    }

    /// Open a history entry for a visit to `center` starting at `now` with
    /// the given sampled service `requirement`.  Returns the visit number.
    pub fn begin_visit(&mut self, center: CenterId, now: SimTime, requirement: f64) -> u32 {
        debug_assert!(
            self.open_visit.is_none(),
            "job {} opened a visit while another is pending",
            self.id
        );
        let i = center.index();
        *slot(&mut self.requested, i) += requirement;
        let count = slot(&mut self.visit_counts, i);
        *count += 1;
        let number = *count;

        self.open_visit = Some(self.history.len());
        self.history.push(Visit {
            center,
            class: self.class,
            number,
            entered: now,
            exited: None,
        });
        number
    }

    /// Close the pending visit at `now` and add its duration to the
    /// per-center residence.  Returns the duration, or `None` if no visit
    /// was open.
    pub fn end_visit(&mut self, now: SimTime) -> Option<SimTime> {
        let idx = self.open_visit.take()?;
        let visit = &mut self.history[idx];
        visit.exited = Some(now);
        let spent = now - visit.entered;
        *slot(&mut self.residence, visit.center.index()) += spent;
        Some(spent)
    }

    /// Record arrival at the sink.
    pub fn finish(&mut self, now: SimTime) {
        debug_assert!(self.finish.is_none(), "job {} finished twice", self.id);
        debug_assert!(self.open_visit.is_none(), "job {} finished mid-visit", self.id);
        self.finish = Some(now);
    }

    /// End-to-end response time, once finished.
    pub fn response_time(&self) -> Option<SimTime> {
        self.finish.map(|f| f - self.birth)
    }

    /// Total time spent at `center` over all closed visits.
    pub fn residence_at(&self, center: CenterId) -> SimTime {
        self.residence.get(center.index()).copied().unwrap_or(0.0)
    }

    /// Total service requirement sampled for `center` over all visits.
    pub fn requested_at(&self, center: CenterId) -> f64 {
        self.requested.get(center.index()).copied().unwrap_or(0.0)
    }

    /// Number of visits begun at `center`.
    pub fn visits_at(&self, center: CenterId) -> u32 {
        self.visit_counts.get(center.index()).copied().unwrap_or(0)
    }

    pub fn history(&self) -> &[Visit] {
        &self.history
    }

    /// The visit in progress, if any.
    pub fn open_visit(&self) -> Option<&Visit> {
        self.open_visit.map(|i| &self.history[i])
    }
}

#[inline]
fn slot<T: Default + Clone>(v: &mut Vec<T>, i: usize) -> &mut T {
    if v.len() <= i {
        v.resize(i + 1, T::default());
    }
    &mut v[i]
}
