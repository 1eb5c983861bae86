//! Unit tests for jobs, processor-sharing centers, and routing.

#[cfg(test)]
mod helpers {
    use qn_core::{CenterId, JobId};

    use crate::{Center, Job};

    pub fn center() -> Center {
        Center::new(CenterId(0), "A")
    }

    pub fn job(id: u64, birth: f64) -> Job {
        Job::new(JobId(id), birth)
    }

    pub fn remaining(center: &Center, id: u64) -> f64 {
        center
            .job(JobId(id))
            .and_then(|j| j.remaining)
            .expect("job in service")
    }

    pub fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }
}

// ── Processor sharing ─────────────────────────────────────────────────────────

#[cfg(test)]
mod processor_sharing {
    use super::helpers::*;

    #[test]
    fn single_job_drains_at_full_rate() {
        let mut c = center();
        c.admit(job(0, 0.0), 10.0);
        c.advance_to(5.0);
        assert!(close(remaining(&c, 0), 5.0));
        assert_eq!(c.next_departure_time(5.0), Some(10.0));
    }

    #[test]
    fn two_jobs_share_equally() {
        let mut c = center();
        c.admit(job(0, 0.0), 15.0);
        c.admit(job(1, 0.0), 10.0);
        c.advance_to(10.0);
        assert!(close(remaining(&c, 0), 10.0));
        assert!(close(remaining(&c, 1), 5.0));
        // Least remaining finishes first: 5 units at rate 1/2.
        assert_eq!(c.next_departure_time(10.0), Some(20.0));

        let current = c.generation();
        let first = c.complete(current).unwrap();
        assert_eq!(first.id.0, 1);
    }

    #[test]
    fn staggered_arrivals_share_piecewise() {
        let mut c = center();
        c.admit(job(0, 0.0), 7.6);
        c.advance_to(0.8);
        c.admit(job(1, 0.8), 8.0);
        c.advance_to(1.3);
        c.admit(job(2, 1.3), 6.5);
        c.advance_to(13.0);

        assert!(close(remaining(&c, 0), 2.65));
        assert!(close(remaining(&c, 1), 3.85));
        assert!(close(remaining(&c, 2), 2.6));
        assert!(close(c.next_departure_time(13.0).unwrap(), 20.8));
        assert_eq!(c.complete(c.generation()).unwrap().id.0, 2);
    }

    #[test]
    fn empty_center_has_no_departure() {
        let mut c = center();
        assert_eq!(c.next_departure_time(3.0), None);
        assert!(c.complete(c.generation()).is_none());
        c.advance_to(3.0);
        assert_eq!(c.busy_time(), 0.0);
        assert_eq!(c.area(), 0.0);
        assert_eq!(c.last_update(), 3.0);
    }

    #[test]
    fn zero_dt_only_refreshes() {
        let mut c = center();
        c.admit(job(0, 0.0), 2.0);
        c.advance_to(1.0);
        let area = c.area();
        c.advance_to(1.0);
        assert_eq!(c.area(), area);
        assert!(close(remaining(&c, 0), 1.0));
    }

    #[test]
    fn equal_remaining_goes_to_first_admitted() {
        let mut c = center();
        c.admit(job(4, 0.0), 3.0);
        c.admit(job(2, 0.0), 3.0);
        c.admit(job(9, 0.0), 3.0);
        assert_eq!(c.complete(c.generation()).unwrap().id.0, 4);
        assert_eq!(c.complete(c.generation()).unwrap().id.0, 2);
    }

    #[test]
    fn completion_clears_service_fields() {
        let mut c = center();
        c.admit(job(0, 0.0), 1.0);
        c.advance_to(1.0);
        let done = c.complete(c.generation()).unwrap();
        assert_eq!(done.remaining, None);
        assert_eq!(done.center, None);
        assert_eq!(c.departures(), 1);
        assert!(!c.is_busy());
    }
}

// ── Generation stamps ─────────────────────────────────────────────────────────

#[cfg(test)]
mod generations {
    use super::helpers::*;

    #[test]
    fn membership_changes_bump_generation() {
        let mut c = center();
        let g0 = c.generation();
        c.admit(job(0, 0.0), 5.0);
        let g1 = c.generation();
        assert!(g1 > g0);
        c.admit(job(1, 0.0), 5.0);
        let g2 = c.generation();
        assert!(g2 > g1);
        c.complete(g2).unwrap();
        assert!(c.generation() > g2);
    }

    #[test]
    fn stale_stamp_is_a_no_op() {
        let mut c = center();
        c.admit(job(0, 0.0), 5.0);
        let stale = c.generation();
        c.admit(job(1, 0.0), 1.0);
        c.advance_to(2.0);

        let before = (c.population(), c.departures(), c.generation());
        assert!(c.complete(stale).is_none());
        assert_eq!(before, (c.population(), c.departures(), c.generation()));
    }

    #[test]
    fn non_membership_calls_keep_generation() {
        let mut c = center();
        c.admit(job(0, 0.0), 5.0);
        let g = c.generation();
        c.advance_to(1.0);
        let _ = c.next_departure_time(1.0);
        c.reset_statistics();
        assert_eq!(c.generation(), g);
    }
}

// ── Statistics ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod statistics {
    use super::helpers::*;
    use qn_core::CenterId;

    use crate::Center;

    #[test]
    fn busy_time_and_area() {
        let mut c = center();
        c.advance_to(1.0); // idle 1 s
        c.admit(job(0, 1.0), 4.0);
        c.advance_to(2.0); // n = 1 for 1 s
        c.admit(job(1, 2.0), 4.0);
        c.advance_to(4.0); // n = 2 for 2 s
        assert!(close(c.busy_time(), 3.0));
        assert!(close(c.area(), 1.0 + 4.0));
        assert_eq!(c.arrivals(), 2);
    }

    #[test]
    fn analytic_area_matches_fine_stepping() {
        // Same admissions and completions on two centers; one is advanced
        // only at event instants, the other every millisecond.
        let mut coarse = center();
        let mut fine = Center::new(CenterId(1), "fine");
        let admissions = [(0.0, 1.5), (0.25, 0.75), (0.5, 2.0), (1.75, 0.5)];
        let step = 0.001;
        let mut t = 0.0;
        let mut next = 0;

        for k in 0..=4000 {
            let now = k as f64 * step;
            fine.advance_to(now);
            t = now;

            while next < admissions.len() && admissions[next].0 <= now + 1e-12 {
                let (at, req) = admissions[next];
                coarse.advance_to(at);
                coarse.admit(job(next as u64, at), req);
                fine.admit(job(next as u64, at), req);
                next += 1;
            }
        }
        coarse.advance_to(t);

        assert!((coarse.area() - fine.area()).abs() < 1e-6);
        assert!((coarse.busy_time() - fine.busy_time()).abs() < 1e-6);
        for id in 0..admissions.len() as u64 {
            assert!((remaining(&coarse, id) - remaining(&fine, id)).abs() < 1e-6);
        }
    }

    #[test]
    fn area_is_non_decreasing() {
        let mut c = center();
        let mut last = 0.0;
        for i in 0..20 {
            if i % 3 == 0 {
                c.admit(job(i, i as f64), 2.0);
            }
            c.advance_to((i + 1) as f64);
            assert!(c.area() >= last);
            last = c.area();
        }
    }

    #[test]
    fn reset_keeps_members_and_clock() {
        let mut c = center();
        c.admit(job(0, 0.0), 5.0);
        c.advance_to(2.0);
        c.reset_statistics();
        assert_eq!(c.busy_time(), 0.0);
        assert_eq!(c.area(), 0.0);
        assert_eq!(c.arrivals(), 0);
        assert_eq!(c.departures(), 0);
        assert_eq!(c.population(), 1);
        assert_eq!(c.last_update(), 2.0);
        assert!(close(remaining(&c, 0), 3.0));
    }
}

// ── Job visit state machine ───────────────────────────────────────────────────

#[cfg(test)]
mod job_visits {
    use super::helpers::*;
    use qn_core::{CenterId, ClassId};

    #[test]
    fn begin_and_end_visit() {
        let mut j = job(0, 1.0);
        assert_eq!(j.begin_visit(CenterId(0), 1.0, 0.3), 1);
        assert_eq!(j.open_visit().unwrap().exited, None);
        assert_eq!(j.end_visit(1.5), Some(0.5));
        assert!(j.open_visit().is_none());

        j.class = ClassId(1);
        assert_eq!(j.begin_visit(CenterId(0), 2.0, 0.2), 2);
        assert_eq!(j.end_visit(2.25), Some(0.25));

        assert!(close(j.residence_at(CenterId(0)), 0.75));
        assert!(close(j.requested_at(CenterId(0)), 0.5));
        assert_eq!(j.visits_at(CenterId(0)), 2);
        assert_eq!(j.visits_at(CenterId(2)), 0);
        assert_eq!(j.history()[1].class, ClassId(1));
        assert_eq!(j.history()[1].duration(), Some(0.25));
    }

    #[test]
    fn end_without_open_visit_is_none() {
        let mut j = job(0, 0.0);
        assert_eq!(j.end_visit(1.0), None);
    }

    #[test]
    fn response_time_after_finish() {
        let mut j = job(0, 2.0);
        assert_eq!(j.response_time(), None);
        j.finish(5.5);
        assert_eq!(j.response_time(), Some(3.5));
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use super::helpers::*;
    use qn_core::{
        CENTER_A, CENTER_B, CENTER_P, CenterId, ClassId, Destination, NetworkConfig, RouteRule,
    };

    use crate::{ModelError, RoutingTable};

    #[test]
    fn web_app_table() {
        let rt = RoutingTable::from_config(&NetworkConfig::web_app()).unwrap();
        let mut j = job(0, 0.0);

        assert_eq!(rt.next_destination(CENTER_A, &j), Ok(Destination::Center(CENTER_B)));
        assert_eq!(rt.next_destination(CENTER_B, &j), Ok(Destination::ClassSwitch));
        assert_eq!(rt.class_switch(&mut j), Ok(ClassId(1)));
        assert_eq!(rt.next_destination(CENTER_A, &j), Ok(Destination::Center(CENTER_P)));
        assert_eq!(rt.next_destination(CENTER_P, &j), Ok(Destination::ClassSwitch));
        assert_eq!(rt.class_switch(&mut j), Ok(ClassId(2)));
        assert_eq!(rt.next_destination(CENTER_A, &j), Ok(Destination::Sink));
        assert_eq!(
            rt.class_switch(&mut j),
            Err(ModelError::ClassOverflow { class: ClassId(2) })
        );
    }

    #[test]
    fn unmapped_pair_is_an_error() {
        let rt = RoutingTable::from_config(&NetworkConfig::web_app()).unwrap();
        let j = job(0, 0.0);
        assert_eq!(
            rt.next_destination(CENTER_P, &j),
            Err(ModelError::Unroutable { center: CENTER_P, class: ClassId(0) })
        );
    }

    #[test]
    fn reachable_pairs_follow_the_chain() {
        let rt = RoutingTable::from_config(&NetworkConfig::web_app()).unwrap();
        assert_eq!(
            rt.reachable().unwrap(),
            vec![
                (CENTER_A, ClassId(0)),
                (CENTER_B, ClassId(0)),
                (CENTER_A, ClassId(1)),
                (CENTER_P, ClassId(1)),
                (CENTER_A, ClassId(2)),
            ]
        );
    }

    #[test]
    fn rejects_bad_tables() {
        let mut cfg = NetworkConfig::web_app();
        cfg.routes.push(RouteRule {
            center: CENTER_A,
            class:  ClassId(2),
            next:   Destination::ClassSwitch,
        });
        assert!(RoutingTable::from_config(&cfg).is_err());

        let mut cfg = NetworkConfig::web_app();
        cfg.routes[0].next = Destination::Center(CenterId(7));
        assert_eq!(
            RoutingTable::from_config(&cfg).unwrap_err(),
            ModelError::UnknownCenter(CenterId(7))
        );
    }

    #[test]
    fn missing_rule_on_path_fails_reachability() {
        let mut cfg = NetworkConfig::web_app();
        cfg.routes.retain(|r| r.center != CENTER_P);
        let rt = RoutingTable::from_config(&cfg).unwrap();
        assert_eq!(
            rt.reachable().unwrap_err(),
            ModelError::Unroutable { center: CENTER_P, class: ClassId(1) }
        );
    }

    #[test]
    fn cycle_without_sink_is_rejected() {
        let mut cfg = NetworkConfig::web_app();
        cfg.routes[4].next = Destination::Center(CENTER_A);
        // A(C3) → A(C3) loops forever.
        let rt = RoutingTable::from_config(&cfg).unwrap();
        assert_eq!(rt.reachable().unwrap_err(), ModelError::NoSink);
    }
}
