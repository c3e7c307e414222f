use chrono::NaiveDate;

use crate::board::Board;
use crate::task::{Quadrant, Task};

/// Due-date window used by the date filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueBucket {
    #[default]
    All,
    Overdue,
    Today,
    /// Tomorrow through seven days out.
    Week,
    Later,
    NoDate,
}

impl DueBucket {
    pub const fn cycle(self) -> Self {
        match self {
            Self::All => Self::Overdue,
            Self::Overdue => Self::Today,
            Self::Today => Self::Week,
            Self::Week => Self::Later,
            Self::Later => Self::NoDate,
            Self::NoDate => Self::All,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "Any date",
            Self::Overdue => "Overdue",
            Self::Today => "Today",
            Self::Week => "This week",
            Self::Later => "Later",
            Self::NoDate => "No date",
        }
    }

    pub fn contains(self, due: Option<NaiveDate>, today: NaiveDate) -> bool {
        let Some(due) = due else {
            return matches!(self, Self::All | Self::NoDate);
        };
        let diff = (due - today).num_days();
        match self {
            Self::All => true,
            Self::Overdue => diff < 0,
            Self::Today => diff == 0,
            Self::Week => (1..=7).contains(&diff),
            Self::Later => diff > 7,
            Self::NoDate => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub query: String,
    pub bucket: DueBucket,
    pub hide_completed: bool,
}

impl Filter {
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty() || self.bucket != DueBucket::All || self.hide_completed
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if self.hide_completed && task.done {
            return false;
        }
        if !self.bucket.contains(task.due, today) {
            return false;
        }
        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || task.title.to_lowercase().contains(&query)
            || task.notes.to_lowercase().contains(&query)
    }
}

/// Tasks in `quadrant` that pass `filter`, paired with their board index.
pub fn visible<'a>(
    board: &'a Board,
    quadrant: Quadrant,
    filter: &Filter,
    today: NaiveDate,
) -> Vec<(usize, &'a Task)> {
    board
        .tasks(quadrant)
        .iter()
        .enumerate()
        .filter(|(_, task)| filter.matches(task, today))
        .collect()
}
