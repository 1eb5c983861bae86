//! The `Sim` struct and its event loop.

use rustc_hash::FxHashMap;
use tracing::{debug, info, trace};

use qn_core::{
    BatchConfig, CenterId, Destination, JobId, NetworkConfig, SampleGrid, SimTime, StreamRng,
    VariateSource,
};
use qn_model::{Center, Job, ModelError, RoutingTable};
use qn_stats::{CompletionTally, MetricRecord, batch_record, finite_sample};

use crate::event::{Agenda, Event, EventKind, UnifiedAgenda};
use crate::{SimError, SimObserver, SimResult};

/// One closed batch of a chained batch-means run.
#[derive(Clone, Debug)]
pub struct Batch {
    pub index:  u64,
    pub record: MetricRecord,
    /// Jobs completed in the batch; empty unless the sim retains them.
    pub jobs:   Vec<Job>,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The discrete-event driver.
///
/// Every step:
///
/// 1. **Pop** the earliest event from the agenda.
/// 2. **Advance** *every* center to the event time, so no interval of
///    service progress or statistics is skipped.
/// 3. **Dispatch**:
///    - *Arrival* → create a job, admit it at the entry center, schedule the
///      next arrival.
///    - *Departure* → if the generation stamp is current, remove the job,
///      close its visit, reschedule the center, and route it: to another
///      center, through a class switch back to the entry center, or to the
///      sink.  A stale stamp is dropped without side effects.
///
/// Three run modes share this loop: [`run_until`](Self::run_until)
/// (fixed duration with grid sampling), [`run_batch`](Self::run_batch)
/// (fixed completion count, chained across calls), and replicated finite
/// horizon ([`crate::replicate`]).
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<V: VariateSource = StreamRng, A: Agenda = UnifiedAgenda> {
    /// The validated network description.
    pub config: NetworkConfig,

    routing:  RoutingTable,
    centers:  Vec<Center>,
    agenda:   A,
    variates: V,
    now:      SimTime,

    /// Per-run job sequence.
    next_job: u64,

    /// Where each job in the system is being served.
    in_flight: FxHashMap<JobId, CenterId>,

    /// Finished jobs of the current window, kept only when requested.
    completed:        Vec<Job>,
    retain_completed: bool,

    // Current observation window.
    tally:           CompletionTally,
    window_start:    SimTime,
    window_arrivals: u64,
    batches_closed:  u64,
}

impl<V: VariateSource, A: Agenda> Sim<V, A> {
    pub(crate) fn from_parts(
        config:           NetworkConfig,
        routing:          RoutingTable,
        variates:         V,
        retain_completed: bool,
    ) -> Self {
        let centers = config
            .centers
            .iter()
            .enumerate()
            .map(|(i, name)| Center::new(CenterId(i as u16), name.clone()))
            .collect();
        let tally = CompletionTally::new(config.center_count());
        Self {
            config,
            routing,
            centers,
            agenda: A::default(),
            variates,
            now: 0.0,
            next_job: 0,
            in_flight: FxHashMap::default(),
            completed: Vec::new(),
            retain_completed,
            tally,
            window_start: 0.0,
            window_arrivals: 0,
            batches_closed: 0,
        }
    }

    // ── Run modes ─────────────────────────────────────────────────────────

    /// Run every event due at or before `stop_time`, sampling metrics on the
    /// grid `0, step, 2·step, … ≤ stop_time`.
    ///
    /// A tick is sampled when the first event at or after it is reached,
    /// after centers are advanced but before the event is handled, with the
    /// window `[0, now]`.  Ticks left when the loop ends are flushed with
    /// the window `[0, stop_time]`.
    pub fn run_until<O: SimObserver>(
        &mut self,
        stop_time:   SimTime,
        sample_step: SimTime,
        observer:    &mut O,
    ) -> SimResult<Vec<MetricRecord>> {
        if !(sample_step > 0.0) || !(stop_time >= 0.0) {
            return Err(SimError::Config(format!(
                "finite horizon needs step > 0 and stop >= 0, got step={sample_step} stop={stop_time}"
            )));
        }
        self.ensure_arrival()?;

        let mut grid = SampleGrid::new(sample_step, stop_time);
        let mut samples = Vec::with_capacity(grid.len());

        while let Some(t) = self.agenda.peek_time() {
            if t > stop_time {
                break;
            }
            let Some(event) = self.agenda.pop() else { break };
            self.advance(event.time);
            self.flush_samples(&mut grid, event.time, &mut samples, observer);
            self.dispatch(event, observer)?;
        }

        if stop_time > self.now {
            self.advance(stop_time);
        }
        self.flush_samples(&mut grid, stop_time, &mut samples, observer);

        info!(
            stop_time,
            samples = samples.len(),
            completions = self.tally.count(),
            in_flight = self.in_flight.len(),
            "finite horizon reached"
        );
        Ok(samples)
    }

    /// Run until `batch.batch_size` jobs complete (and, if set, at least
    /// `batch.min_arrivals` jobs arrive) in the current window, then close
    /// the window.
    ///
    /// State carries over between calls: jobs in service, pending events,
    /// and center timestamps are kept; only the statistics restart.
    pub fn run_batch<O: SimObserver>(
        &mut self,
        batch:    &BatchConfig,
        observer: &mut O,
    ) -> SimResult<Batch> {
        if batch.batch_size == 0 {
            return Err(SimError::Config("batch size must be > 0".into()));
        }
        self.ensure_arrival()?;

        let min_arrivals = batch.min_arrivals.unwrap_or(0);
        while self.tally.count() < batch.batch_size || self.window_arrivals < min_arrivals {
            if !self.step(observer)? {
                return Err(SimError::Stalled(self.now));
            }
        }

        let duration = self.now - self.window_start;
        let record = batch_record(self.now, duration, &self.centers, &self.tally);
        let index = self.batches_closed;
        self.batches_closed += 1;
        observer.on_batch_end(index, &record);
        debug!(
            batch = index,
            completions = record.completions,
            duration,
            rt = record.response_time,
            "batch closed"
        );

        let jobs = std::mem::take(&mut self.completed);
        self.reset_window();
        Ok(Batch { index, record, jobs })
    }

    /// Process the next event.  Returns `false` if the agenda is empty.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<bool> {
        let Some(event) = self.agenda.pop() else {
            return Ok(false);
        };
        self.advance(event.time);
        self.dispatch(event, observer)?;
        Ok(true)
    }

    /// Restart statistics at the current instant without touching jobs,
    /// pending events, or timestamps.
    pub fn reset_window(&mut self) {
        for c in &mut self.centers {
            c.reset_statistics();
        }
        self.tally.reset();
        self.window_start = self.now;
        self.window_arrivals = 0;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    pub fn center(&self, id: CenterId) -> Option<&Center> {
        self.centers.get(id.index())
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    /// Jobs currently in the system.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Center currently serving `job`, if it is in the system.
    pub fn location(&self, job: JobId) -> Option<CenterId> {
        self.in_flight.get(&job).copied()
    }

    /// Jobs created since the run began.
    pub fn jobs_created(&self) -> u64 {
        self.next_job
    }

    /// Retained finished jobs of the current window.
    pub fn completed(&self) -> &[Job] {
        &self.completed
    }

    pub fn take_completed(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.completed)
    }

    pub fn tally(&self) -> &CompletionTally {
        &self.tally
    }

    pub fn window_start(&self) -> SimTime {
        self.window_start
    }

    pub fn window_arrivals(&self) -> u64 {
        self.window_arrivals
    }

    /// Pending events, stale departures included.
    pub fn pending_events(&self) -> usize {
        self.agenda.len()
    }

    pub fn variates_mut(&mut self) -> &mut V {
        &mut self.variates
    }

    // ── Event handling ────────────────────────────────────────────────────

    fn ensure_arrival(&mut self) -> SimResult<()> {
        if !self.agenda.has_arrival() {
            let gap = self
                .variates
                .sample_interarrival(self.config.arrival_rate, self.config.streams.arrivals)?;
            self.agenda.schedule_arrival(self.now + gap);
        }
        Ok(())
    }

    fn advance(&mut self, t: SimTime) {
        self.now = t;
        for c in &mut self.centers {
            c.advance_to(t);
        }
    }

    fn flush_samples<O: SimObserver>(
        &self,
        grid:     &mut SampleGrid,
        now:      SimTime,
        out:      &mut Vec<MetricRecord>,
        observer: &mut O,
    ) {
        while let Some(tick) = grid.take_due(now) {
            let record = finite_sample(tick, now, &self.centers, &self.tally, self.in_flight.len());
            observer.on_sample(&record);
            out.push(record);
        }
    }

    fn dispatch<O: SimObserver>(&mut self, event: Event, observer: &mut O) -> SimResult<()> {
        trace!(t = event.time, kind = ?event.kind, "event");
        match event.kind {
            EventKind::Arrival => self.handle_arrival(event.time, observer),
            EventKind::Departure { center, generation } => {
                self.handle_departure(center, generation, event.time, observer)
            }
        }
    }

    fn handle_arrival<O: SimObserver>(&mut self, t: SimTime, observer: &mut O) -> SimResult<()> {
        let id = JobId(self.next_job);
        self.next_job += 1;
        self.window_arrivals += 1;
        observer.on_arrival(id, t);

        self.admit(Job::new(id, t), self.routing.entry(), t)?;

        let gap = self
            .variates
            .sample_interarrival(self.config.arrival_rate, self.config.streams.arrivals)?;
        self.agenda.schedule_arrival(t + gap);
        Ok(())
    }

    fn handle_departure<O: SimObserver>(
        &mut self,
        center:     CenterId,
        generation: u64,
        t:          SimTime,
        observer:   &mut O,
    ) -> SimResult<()> {
        let station = self
            .centers
            .get_mut(center.index())
            .ok_or(ModelError::UnknownCenter(center))?;
        let Some(mut job) = station.complete(generation) else {
            debug!(%center, generation, t, "stale departure discarded");
            observer.on_stale(center, generation, t);
            return Ok(());
        };

        job.end_visit(t);
        observer.on_departure(center, job.id, t);
        self.schedule_departure(center, t);

        match self.routing.next_destination(center, &job)? {
            Destination::Center(next) => self.admit(job, next, t)?,
            Destination::ClassSwitch => {
                self.routing.class_switch(&mut job)?;
                self.admit(job, self.routing.entry(), t)?;
            }
            Destination::Sink => {
                job.finish(t);
                self.in_flight.remove(&job.id);
                self.tally.record(&job);
                observer.on_completion(&job);
                if self.retain_completed {
                    self.completed.push(job);
                }
            }
        }
        Ok(())
    }

    /// Sample a service requirement for `job` at `center`, open its visit,
    /// and hand it to the center.  Centers are already advanced to `t`.
    fn admit(&mut self, mut job: Job, center: CenterId, t: SimTime) -> SimResult<()> {
        let mean = self
            .config
            .service_mean(center, job.class)
            .ok_or(ModelError::MissingServiceMean { center, class: job.class })?;
        let stream = *self
            .config
            .streams
            .service
            .get(center.index())
            .ok_or(ModelError::UnknownCenter(center))?;
        let requirement = self.variates.sample_exponential(mean, stream)?;

        job.begin_visit(center, t, requirement);
        self.in_flight.insert(job.id, center);
        self.centers[center.index()].admit(job, requirement);
        self.schedule_departure(center, t);
        Ok(())
    }

    /// Schedule the next departure at `center` under its current generation.
    /// Any earlier departure event for the center is now stale.
    fn schedule_departure(&mut self, center: CenterId, t: SimTime) {
        let station = &self.centers[center.index()];
        if let Some(at) = station.next_departure_time(t) {
            self.agenda.schedule_departure(at, center, station.generation());
        }
    }
}
