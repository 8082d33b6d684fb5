//! Widget scheduler
//!
//! Owns every widget together with its refresh interval and next deadline.
//! `run_due` ticks each widget whose deadline has passed, in registration
//! order, and reports which ones ran so the caller can draw once for the
//! whole batch. Ticks are plain synchronous calls through `&mut`, so a widget
//! can never be ticked while it is already ticking.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::{debug, error};

use crate::metrics::MetricsProvider;
use crate::panel::Panel;
use crate::widget::Widget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(usize);

thread_local! {
    static TICKING: Cell<bool> = const { Cell::new(false) };
}

/// Whether this thread is inside a widget tick. A panic hook sees `true` for
/// panics the scheduler is about to catch.
pub fn in_widget_tick() -> bool {
    TICKING.with(Cell::get)
}

struct TickGuard;

impl TickGuard {
    fn enter() -> TickGuard {
        TICKING.with(|t| t.set(true));
        TickGuard
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        TICKING.with(|t| t.set(false));
    }
}

struct Entry {
    widget: Box<dyn Widget>,
    interval: Option<Duration>,
    due: Option<Instant>,
    ticks: u64,
}

impl Entry {
    fn tick(&mut self, provider: &mut dyn MetricsProvider) {
        let widget = &mut self.widget;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = TickGuard::enter();
            widget.on_tick(provider)
        }));
        self.ticks += 1;
        if outcome.is_err() {
            error!("widget {} panicked while ticking", self.widget.name());
        }
    }
}

/// Next deadline after `due`, skipping any periods already missed.
fn advance(due: Instant, interval: Duration, now: Instant) -> Instant {
    let next = due + interval;
    if next > now {
        next
    } else {
        now + interval
    }
}

#[derive(Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    stopped: bool,
}

impl Scheduler {
    pub fn new() -> Scheduler {
        Self::default()
    }

    /// Adds a widget, due immediately. Without an interval (or with a zero
    /// one) it ticks once and afterwards only through [`Scheduler::tick_now`].
    pub fn register(
        &mut self,
        widget: Box<dyn Widget>,
        interval: Option<Duration>,
        now: Instant,
    ) -> WidgetId {
        let id = WidgetId(self.entries.len());
        debug!("registered {} every {:?}", widget.name(), interval);
        self.entries.push(Entry {
            widget,
            interval: interval.filter(|d| !d.is_zero()),
            due: if self.stopped { None } else { Some(now) },
            ticks: 0,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().filter_map(|e| e.due).min()
    }

    /// Ticks every widget due at `now` and returns their ids.
    pub fn run_due(&mut self, now: Instant, provider: &mut dyn MetricsProvider) -> Vec<WidgetId> {
        let mut ticked = Vec::new();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            let Some(due) = entry.due else {
                continue;
            };
            if due > now {
                continue;
            }
            entry.tick(provider);
            entry.due = entry.interval.map(|interval| advance(due, interval, now));
            ticked.push(WidgetId(index));
        }
        if !ticked.is_empty() {
            debug!("ticked {} widgets", ticked.len());
        }
        ticked
    }

    /// Ticks one widget out of schedule. Its own deadline is unchanged.
    pub fn tick_now(&mut self, id: WidgetId, provider: &mut dyn MetricsProvider) -> bool {
        if self.stopped {
            return false;
        }
        match self.entries.get_mut(id.0) {
            Some(entry) => {
                entry.tick(provider);
                true
            }
            None => false,
        }
    }

    pub fn panel(&self, id: WidgetId) -> Option<&Panel> {
        self.entries.get(id.0).map(|e| e.widget.panel())
    }

    pub fn name(&self, id: WidgetId) -> Option<&str> {
        self.entries.get(id.0).map(|e| e.widget.name())
    }

    pub fn ticks(&self, id: WidgetId) -> u64 {
        self.entries.get(id.0).map_or(0, |e| e.ticks)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Cancels every timer. Widgets keep their last panel until dropped.
    pub fn shutdown(&mut self) {
        for entry in &mut self.entries {
            entry.due = None;
        }
        self.stopped = true;
        debug!("scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FakeProvider;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counter {
        name: &'static str,
        log: Rc<std::cell::RefCell<Vec<&'static str>>>,
        panics: Rc<Cell<bool>>,
        saw_tick_flag: Rc<Cell<bool>>,
        panel: Panel,
    }

    impl Widget for Counter {
        fn name(&self) -> &str {
            self.name
        }

        fn on_tick(&mut self, _provider: &mut dyn MetricsProvider) {
            self.saw_tick_flag.set(in_widget_tick());
            if self.panics.get() {
                panic!("tick failure");
            }
            self.log.borrow_mut().push(self.name);
        }

        fn panel(&self) -> &Panel {
            &self.panel
        }
    }

    fn counter(
        name: &'static str,
        log: &Rc<std::cell::RefCell<Vec<&'static str>>>,
    ) -> (Box<dyn Widget>, Rc<Cell<bool>>) {
        let panics = Rc::new(Cell::new(false));
        let widget = Counter {
            name,
            log: log.clone(),
            panics: panics.clone(),
            saw_tick_flag: Rc::default(),
            panel: Panel::default(),
        };
        (Box::new(widget), panics)
    }

    #[test]
    fn tick_flag_covers_contained_panics() {
        let log = Rc::default();
        let flag = Rc::new(Cell::new(false));
        let panics = Rc::new(Cell::new(true));
        let widget = Counter {
            name: "bad",
            log: Rc::clone(&log),
            panics: panics.clone(),
            saw_tick_flag: flag.clone(),
            panel: Panel::default(),
        };
        let mut sched = Scheduler::new();
        let t0 = Instant::now();
        sched.register(Box::new(widget), None, t0);

        assert!(!in_widget_tick());
        assert_eq!(sched.run_due(t0, &mut FakeProvider::new()).len(), 1);
        assert!(flag.get());
        // cleared again after the unwind
        assert!(!in_widget_tick());
    }

    #[test]
    fn independent_periods() {
        let log = Rc::default();
        let mut provider = FakeProvider::new();
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let (fast, _) = counter("fast", &log);
        let (slow, _) = counter("slow", &log);
        let fast = sched.register(fast, Some(Duration::from_secs(2)), t0);
        let slow = sched.register(slow, Some(Duration::from_secs(6)), t0);

        assert_eq!(sched.run_due(t0, &mut provider), vec![fast, slow]);
        for s in 1..=6 {
            sched.run_due(t0 + Duration::from_secs(s), &mut provider);
        }
        assert_eq!(sched.ticks(fast), 4);
        assert_eq!(sched.ticks(slow), 2);
        assert_eq!(
            *log.borrow(),
            vec!["fast", "slow", "fast", "fast", "fast", "slow"]
        );
        assert_eq!(sched.next_deadline(), Some(t0 + Duration::from_secs(8)));
    }

    #[test]
    fn missed_periods_are_not_replayed() {
        let log = Rc::default();
        let mut provider = FakeProvider::new();
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let (w, _) = counter("w", &log);
        let id = sched.register(w, Some(Duration::from_secs(2)), t0);
        sched.run_due(t0, &mut provider);

        let late = t0 + Duration::from_secs(11);
        assert_eq!(sched.run_due(late, &mut provider), vec![id]);
        assert!(sched.run_due(late, &mut provider).is_empty());
        assert_eq!(sched.next_deadline(), Some(late + Duration::from_secs(2)));
    }

    #[test]
    fn one_shot_widget() {
        let log = Rc::default();
        let mut provider = FakeProvider::new();
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let (w, _) = counter("net", &log);
        let id = sched.register(w, None, t0);
        sched.run_due(t0, &mut provider);
        assert_eq!(sched.next_deadline(), None);
        assert!(sched.run_due(t0 + Duration::from_secs(60), &mut provider).is_empty());
        assert!(sched.tick_now(id, &mut provider));
        assert_eq!(sched.ticks(id), 2);
    }

    #[test]
    fn panicking_widget_keeps_others_running() {
        let log = Rc::default();
        let mut provider = FakeProvider::new();
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let (bad, panics) = counter("bad", &log);
        let (good, _) = counter("good", &log);
        let bad = sched.register(bad, Some(Duration::from_secs(1)), t0);
        let good = sched.register(good, Some(Duration::from_secs(1)), t0);
        panics.set(true);

        assert_eq!(sched.run_due(t0, &mut provider), vec![bad, good]);
        panics.set(false);
        sched.run_due(t0 + Duration::from_secs(1), &mut provider);
        assert_eq!(*log.borrow(), vec!["good", "bad", "good"]);
    }

    #[test]
    fn shutdown_cancels_timers() {
        let log = Rc::default();
        let mut provider = FakeProvider::new();
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let (w, _) = counter("w", &log);
        let id = sched.register(w, Some(Duration::from_secs(1)), t0);
        sched.shutdown();
        assert_eq!(sched.next_deadline(), None);
        assert!(sched.run_due(t0 + Duration::from_secs(5), &mut provider).is_empty());
        assert!(!sched.tick_now(id, &mut provider));
        assert!(sched.is_stopped());
    }
}
