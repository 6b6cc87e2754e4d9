use super::stream::Outcome;

type Resumption<'a, T> = Box<dyn FnOnce() -> Step<'a, T> + 'a>;

/// A parse that is either finished or paused at a suspension point.
///
/// Every parser invocation suspends once before doing any work, so a driver can advance a
/// parse one step at a time with [`Step::resume`], or all at once with [`Step::run`]. Both go
/// through the same continuations and produce the same outcome.
pub enum Step<'a, T> {
    Done(Outcome<'a, T>),
    Suspended(Resumption<'a, T>),
}

impl<'a, T: 'a> Step<'a, T> {
    pub fn suspend(resume: impl FnOnce() -> Step<'a, T> + 'a) -> Self {
        Step::Suspended(Box::new(resume))
    }

    /// Continues with `f` once this step has an outcome.
    pub fn then<U: 'a, F>(self, f: F) -> Step<'a, U>
    where
        F: FnOnce(Outcome<'a, T>) -> Step<'a, U> + 'a,
    {
        match self {
            Step::Done(outcome) => f(outcome),
            Step::Suspended(resume) => Step::Suspended(Box::new(move || resume().then(f))),
        }
    }

    /// Runs until the next suspension point.
    #[must_use]
    pub fn resume(self) -> Step<'a, T> {
        match self {
            Step::Done(outcome) => Step::Done(outcome),
            Step::Suspended(resume) => resume(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done(_))
    }

    /// Drives the parse to completion.
    pub fn run(self) -> Outcome<'a, T> {
        let mut step = self;
        loop {
            match step {
                Step::Done(outcome) => return outcome,
                Step::Suspended(resume) => step = resume(),
            }
        }
    }
}
