use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    Bunch,
    Gap,
}

#[derive(Debug, Clone)]
pub struct Problem {
    pub kind: ProblemKind,
    pub time: NaiveDateTime,
    pub duration_seconds: i64,
    pub stop: String,
}
