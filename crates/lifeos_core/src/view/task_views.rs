//! Derived task views: filters, ranking, focus lane and counts.
//!
//! # Invariants
//! - Ranking order: priority ascending, due date ascending with undated
//!   tasks last, newest first, then id ascending.
//! - `today` is supplied by the caller once per render pass.

use crate::model::task::{Task, TaskPriority};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Number of tasks shown in the focus lane.
pub const FOCUS_LANE_LEN: usize = 6;

/// Open tasks in collection order.
pub fn open_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|task| task.is_open()).collect()
}

/// Open critical tasks due exactly on `today`.
pub fn critical_due_today_count(tasks: &[Task], today: NaiveDate) -> usize {
    tasks
        .iter()
        .filter(|task| is_critical_due_today(task, today))
        .count()
}

fn is_critical_due_today(task: &Task, today: NaiveDate) -> bool {
    task.is_open() && task.priority == TaskPriority::Critical && task.is_due_on(today)
}

/// Total order used by every ranked view.
pub fn focus_order(a: &Task, b: &Task) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| due_date_order(a.due_date, b.due_date))
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn due_date_order(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts task references in place by `focus_order`.
pub fn rank(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| focus_order(a, b));
}

/// Top `limit` open tasks by rank.
pub fn focus_lane(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut lane = open_tasks(tasks);
    rank(&mut lane);
    lane.truncate(limit);
    lane
}

/// List filter selectable on the to-do page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskView {
    #[default]
    Open,
    /// Open and due today.
    Today,
    Done,
    All,
}

impl TaskView {
    pub const ALL: [TaskView; 4] = [Self::Open, Self::Today, Self::Done, Self::All];

    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::Open => task.is_open(),
            Self::Today => task.is_open() && task.is_due_on(today),
            Self::Done => task.is_done(),
            Self::All => true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Today => "today",
            Self::Done => "done",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownView(pub String);

impl Display for UnknownView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown view `{}`; expected open|today|done|all", self.0)
    }
}

impl Error for UnknownView {}

impl FromStr for TaskView {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|view| view.label() == normalized)
            .ok_or(UnknownView(normalized))
    }
}

/// Applies the view predicate, then ranks.
pub fn filter_by_view(tasks: &[Task], view: TaskView, today: NaiveDate) -> Vec<&Task> {
    let mut selected: Vec<&Task> = tasks
        .iter()
        .filter(|task| view.matches(task, today))
        .collect();
    rank(&mut selected);
    selected
}

/// Summary tile counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub open: usize,
    pub done: usize,
    pub critical_due_today: usize,
}

impl TaskCounts {
    pub fn summarize(tasks: &[Task], today: NaiveDate) -> Self {
        tasks.iter().fold(Self::default(), |mut counts, task| {
            if task.is_open() {
                counts.open += 1;
            } else {
                counts.done += 1;
            }
            if is_critical_due_today(task, today) {
                counts.critical_due_today += 1;
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.open + self.done
    }
}

#[cfg(test)]
mod tests {
    use super::{due_date_order, TaskView};
    use chrono::NaiveDate;
    use std::cmp::Ordering;
    use std::str::FromStr;

    #[test]
    fn undated_sorts_after_dated() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1);
        assert_eq!(due_date_order(day, None), Ordering::Less);
        assert_eq!(due_date_order(None, day), Ordering::Greater);
        assert_eq!(due_date_order(None, None), Ordering::Equal);
    }

    #[test]
    fn view_parses_case_insensitively() {
        assert_eq!(TaskView::from_str(" Today ").expect("value should parse"), TaskView::Today);
        assert!(TaskView::from_str("later").is_err());
    }
}
