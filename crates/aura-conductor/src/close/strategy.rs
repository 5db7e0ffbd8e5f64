//! Default close strategy: every member votes, one veto is enough.

use super::{CloseCallback, CloseCompletion, CloseStrategy};
use crate::config::ConductorConfig;
use crate::screen::{try_guard_close, Screen};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::trace;

/// Asks each member in order and closes only on a unanimous yes.
///
/// - Members without a guard vote yes.
/// - Evaluation continues past a veto, so every guard is asked once.
/// - Guards may answer synchronously or later; synchronous answers are
///   handled in a loop rather than by recursion.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCloseStrategy {
    close_conducted_items: bool,
}

impl DefaultCloseStrategy {
    /// Create a strategy. With `close_conducted_items` set the completion
    /// receives the members that agreed to close; otherwise an empty list.
    pub fn new(close_conducted_items: bool) -> Self {
        Self {
            close_conducted_items,
        }
    }

    /// Create a strategy from conductor configuration.
    pub fn from_config(config: &ConductorConfig) -> Self {
        Self::new(config.close_conducted_items)
    }
}

impl<T: Screen + Clone + 'static> CloseStrategy<T> for DefaultCloseStrategy {
    fn execute(&self, items: Vec<T>, on_complete: CloseCompletion<T>) {
        trace!(count = items.len(), "evaluating close votes");
        let evaluation = Rc::new(RefCell::new(Evaluation {
            remaining: items.into_iter(),
            closable: Vec::new(),
            verdict: true,
            resume_on_answer: false,
            report_closable: self.close_conducted_items,
            on_complete: Some(on_complete),
        }));
        evaluate(evaluation);
    }
}

struct Evaluation<T> {
    remaining: std::vec::IntoIter<T>,
    closable: Vec<T>,
    verdict: bool,
    /// Set when the loop suspended on a guard that has not answered yet.
    resume_on_answer: bool,
    report_closable: bool,
    on_complete: Option<CloseCompletion<T>>,
}

fn evaluate<T: Screen + Clone + 'static>(evaluation: Rc<RefCell<Evaluation<T>>>) {
    loop {
        let next = evaluation.borrow_mut().remaining.next();
        let Some(member) = next else {
            finish(&evaluation);
            return;
        };

        let answer_pending = Rc::new(Cell::new(true));
        let callback = answer_callback(evaluation.clone(), answer_pending.clone(), member.clone());

        if try_guard_close(&member, callback).is_some() {
            evaluation.borrow_mut().closable.push(member);
            continue;
        }

        if answer_pending.get() {
            evaluation.borrow_mut().resume_on_answer = true;
            return;
        }
    }
}

fn answer_callback<T: Screen + Clone + 'static>(
    evaluation: Rc<RefCell<Evaluation<T>>>,
    answer_pending: Rc<Cell<bool>>,
    member: T,
) -> CloseCallback {
    Box::new(move |can_close| {
        answer_pending.set(false);
        let resume = {
            let mut state = evaluation.borrow_mut();
            if can_close {
                state.closable.push(member);
            }
            state.verdict &= can_close;
            std::mem::take(&mut state.resume_on_answer)
        };
        if resume {
            evaluate(evaluation);
        }
    })
}

fn finish<T>(evaluation: &Rc<RefCell<Evaluation<T>>>) {
    let (verdict, closable, on_complete) = {
        let mut state = evaluation.borrow_mut();
        let closable = if state.report_closable {
            std::mem::take(&mut state.closable)
        } else {
            Vec::new()
        };
        (state.verdict, closable, state.on_complete.take())
    };
    trace!(verdict, "close votes complete");
    if let Some(on_complete) = on_complete {
        on_complete(verdict, closable);
    }
}
