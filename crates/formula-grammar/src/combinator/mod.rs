//! Minimal parser-combinator toolkit the formula grammar is written in.
//!
//! Parsers run over an immutable [`Stream`], so a failed alternative never consumes input
//! visible to its siblings. Every invocation goes through [`Step`], which lets callers either
//! run a parse to completion or advance it one suspension point at a time.

mod primitives;
mod step;
mod stream;

use std::borrow::Cow;
use std::rc::Rc;

pub use primitives::{char, eof, integer, satisfy, string, upper, ws};
pub use step::Step;
pub use stream::{Failure, Outcome, Stream, Success};

use stream::merge_hints;

/// A parser producing `T`, cheap to clone.
pub struct Parser<'a, T>(Rc<dyn Fn(Stream<'a>) -> Step<'a, T> + 'a>);

impl<T> Clone for Parser<'_, T> {
    fn clone(&self) -> Self {
        Parser(Rc::clone(&self.0))
    }
}

impl<'a, T: 'a> Parser<'a, T> {
    pub fn new(f: impl Fn(Stream<'a>) -> Step<'a, T> + 'a) -> Self {
        Parser(Rc::new(f))
    }

    /// A parser that finishes without suspending internally.
    pub fn primitive(f: impl Fn(Stream<'a>) -> Outcome<'a, T> + 'a) -> Self {
        Parser::new(move |input| Step::Done(f(input)))
    }

    /// Starts parsing `input`. The returned step is suspended until resumed.
    pub fn parse(&self, input: Stream<'a>) -> Step<'a, T> {
        let run = Rc::clone(&self.0);
        Step::suspend(move || run(input))
    }

    /// Parses `input` from the beginning and runs to completion.
    pub fn run(&self, input: &'a str) -> Outcome<'a, T> {
        self.parse(Stream::new(input)).run()
    }

    pub fn map<U: 'a>(&self, f: impl Fn(T) -> U + 'a) -> Parser<'a, U> {
        let p = self.clone();
        let f = Rc::new(f);
        Parser::new(move |input| {
            let f = Rc::clone(&f);
            p.parse(input)
                .then(move |outcome| Step::Done(outcome.map(|s| s.map_value(|v| f(v)))))
        })
    }

    /// Like [`Parser::map`], but `f` may reject the value. The failure is reported at the end of
    /// the matched text.
    pub fn try_map<U: 'a, E>(&self, f: impl Fn(T) -> Result<U, E> + 'a) -> Parser<'a, U>
    where
        E: Into<Cow<'static, str>>,
    {
        let p = self.clone();
        let f = Rc::new(f);
        Parser::new(move |input| {
            let f = Rc::clone(&f);
            p.parse(input).then(move |outcome| {
                Step::Done(outcome.and_then(|s| match f(s.value) {
                    Ok(value) => Ok(Success {
                        value,
                        rest: s.rest,
                        furthest: s.furthest,
                    }),
                    Err(reason) => {
                        Err(Failure::new(s.rest.position(), reason).with_hint(s.furthest))
                    }
                }))
            })
        })
    }

    /// Replaces the expectations of a failure that consumed nothing with `expected <name>`.
    pub fn label(&self, name: &'static str) -> Parser<'a, T> {
        let p = self.clone();
        Parser::new(move |input| {
            p.parse(input).then(move |outcome| {
                Step::Done(outcome.map_err(|failure| {
                    if failure.position == input.position() {
                        Failure::new(failure.position, format!("expected {name}"))
                    } else {
                        failure
                    }
                }))
            })
        })
    }
}

/// Always succeeds with `value` without consuming input.
pub fn pure<'a, T: Clone + 'a>(value: T) -> Parser<'a, T> {
    Parser::primitive(move |input| Ok(Success::new(value.clone(), input)))
}

/// Always fails at the current position with `message`.
pub fn fail<'a, T: 'a>(message: impl Into<Cow<'static, str>>) -> Parser<'a, T> {
    let message = message.into();
    Parser::primitive(move |input: Stream<'a>| {
        Err(Failure::new(input.position(), message.clone()))
    })
}

/// Runs `p` then `q`, combining their results with `f`.
pub fn pipe2<'a, A: 'a, B: 'a, V: 'a>(
    p: &Parser<'a, A>,
    q: &Parser<'a, B>,
    f: impl Fn(A, B) -> V + 'a,
) -> Parser<'a, V> {
    let (p, q) = (p.clone(), q.clone());
    let f = Rc::new(f);
    Parser::new(move |input| {
        let q = q.clone();
        let f = Rc::clone(&f);
        p.parse(input).then(move |first| match first {
            Err(failure) => Step::Done(Err(failure)),
            Ok(a) => q.parse(a.rest).then(move |second| {
                Step::Done(match second {
                    Ok(b) => Ok(Success {
                        value: f(a.value, b.value),
                        rest: b.rest,
                        furthest: merge_hints(a.furthest, b.furthest),
                    }),
                    Err(failure) => Err(failure.with_hint(a.furthest)),
                })
            }),
        })
    })
}

pub fn pipe3<'a, A: 'a, B: 'a, C: 'a, V: 'a>(
    p: &Parser<'a, A>,
    q: &Parser<'a, B>,
    r: &Parser<'a, C>,
    f: impl Fn(A, B, C) -> V + 'a,
) -> Parser<'a, V> {
    pipe2(&pipe2(p, q, |a, b| (a, b)), r, move |(a, b), c| f(a, b, c))
}

/// Keeps the result of `p`, discarding `q`'s.
pub fn left<'a, T: 'a, U: 'a>(p: &Parser<'a, T>, q: &Parser<'a, U>) -> Parser<'a, T> {
    pipe2(p, q, |t, _| t)
}

/// Keeps the result of `q`, discarding `p`'s.
pub fn right<'a, T: 'a, U: 'a>(p: &Parser<'a, T>, q: &Parser<'a, U>) -> Parser<'a, U> {
    pipe2(p, q, |_, u| u)
}

pub fn between<'a, O: 'a, C: 'a, T: 'a>(
    open: &Parser<'a, O>,
    close: &Parser<'a, C>,
    p: &Parser<'a, T>,
) -> Parser<'a, T> {
    right(open, &left(p, close))
}

/// Ordered choice: tries `p`, and on failure tries `q` from the same position.
pub fn choice<'a, T: 'a>(p: &Parser<'a, T>, q: &Parser<'a, T>) -> Parser<'a, T> {
    let (p, q) = (p.clone(), q.clone());
    Parser::new(move |input| {
        let q = q.clone();
        p.parse(input).then(move |first| match first {
            Ok(success) => Step::Done(Ok(success)),
            Err(first) => q.parse(input).then(move |second| {
                Step::Done(match second {
                    Ok(success) => Ok(success.with_hint(Some(first))),
                    Err(second) => Err(first.merge(second)),
                })
            }),
        })
    })
}

/// Ordered choice over any number of alternatives; the first success wins.
pub fn choices<'a, T: 'a>(alternatives: Vec<Parser<'a, T>>) -> Parser<'a, T> {
    alternatives
        .into_iter()
        .reduce(|acc, p| choice(&acc, &p))
        .unwrap_or_else(|| {
            Parser::primitive(|input: Stream<'a>| {
                Err(Failure::new(input.position(), "no alternatives"))
            })
        })
}

/// Zero or more repetitions of `p`. Stops at the first failure, or when `p` matches without
/// consuming input.
pub fn many<'a, T: 'a>(p: &Parser<'a, T>) -> Parser<'a, Vec<T>> {
    let p = p.clone();
    Parser::new(move |input| many_from(p.clone(), input, Vec::new(), None))
}

fn many_from<'a, T: 'a>(
    p: Parser<'a, T>,
    input: Stream<'a>,
    mut acc: Vec<T>,
    hint: Option<Failure>,
) -> Step<'a, Vec<T>> {
    let step = p.parse(input);
    step.then(move |outcome| match outcome {
        Ok(s) if s.rest.position() > input.position() => {
            acc.push(s.value);
            many_from(p, s.rest, acc, merge_hints(hint, s.furthest))
        }
        Ok(s) => Step::Done(Ok(Success {
            value: acc,
            rest: input,
            furthest: merge_hints(hint, s.furthest),
        })),
        Err(failure) => Step::Done(Ok(Success {
            value: acc,
            rest: input,
            furthest: merge_hints(hint, Some(failure)),
        })),
    })
}

/// One or more repetitions of `p`.
pub fn many1<'a, T: 'a>(p: &Parser<'a, T>) -> Parser<'a, Vec<T>> {
    pipe2(p, &many(p), |first, rest| {
        let mut all = Vec::with_capacity(rest.len() + 1);
        all.push(first);
        all.extend(rest);
        all
    })
}

/// One or more `p`, separated by `sep`.
pub fn sep_by1<'a, T: 'a, S: 'a>(p: &Parser<'a, T>, sep: &Parser<'a, S>) -> Parser<'a, Vec<T>> {
    pipe2(p, &many(&right(sep, p)), |first, rest| {
        let mut all = Vec::with_capacity(rest.len() + 1);
        all.push(first);
        all.extend(rest);
        all
    })
}

/// `Some` result of `p`, or `None` without consuming input.
pub fn optional<'a, T: 'a>(p: &Parser<'a, T>) -> Parser<'a, Option<T>> {
    let p = p.clone();
    Parser::new(move |input| {
        p.parse(input).then(move |outcome| {
            Step::Done(Ok(match outcome {
                Ok(s) => s.map_value(Some),
                Err(failure) => Success {
                    value: None,
                    rest: input,
                    furthest: Some(failure),
                },
            }))
        })
    })
}

/// Succeeds without consuming input only if `p` does not match here.
pub fn not_followed_by<'a, T: 'a>(p: &Parser<'a, T>, what: &'static str) -> Parser<'a, ()> {
    let p = p.clone();
    Parser::new(move |input| {
        p.parse(input).then(move |outcome| {
            Step::Done(match outcome {
                Ok(_) => Err(Failure::new(input.position(), format!("unexpected {what}"))),
                Err(_) => Ok(Success::new((), input)),
            })
        })
    })
}

/// Builds the parser on demand. Used for recursive grammar rules.
pub fn lazy<'a, T: 'a>(build: impl Fn() -> Parser<'a, T> + 'a) -> Parser<'a, T> {
    Parser::new(move |input| build().parse(input))
}
