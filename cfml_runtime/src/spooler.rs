//! Background task listener arguments
//!
//! The scheduler that runs, retries and delivers spooled tasks lives outside
//! this crate. What lives here is the record handed to a user-defined
//! listener before and after each execution attempt, and the glue that
//! invokes the listener without letting its failures escape.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error};

use crate::context::ExecutionContext;
use crate::error::{RuntimeError, RuntimeResult};
use crate::key::well_known;
use crate::value::{Struct, StructRef, Value};

/// One entry of a task's retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub tries: u32,
    pub interval_secs: u64,
}

/// Extra detail carried by mail tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailExtras {
    pub charset: String,
    pub reply_to: Vec<String>,
    pub fail_to: Vec<String>,
}

/// Source location that queued the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLine {
    pub template: String,
    pub line: u32,
}

impl TemplateLine {
    pub fn new(template: impl Into<String>, line: u32) -> Self {
        Self {
            template: template.into(),
            line,
        }
    }
}

/// A task owned by the external scheduler. Timestamps are milliseconds since
/// the Unix epoch; zero means "never".
pub trait SpoolerTask {
    fn id(&self) -> &str;
    fn task_type(&self) -> &str;
    fn creation(&self) -> i64;
    fn last_execution(&self) -> i64;
    fn next_execution(&self) -> i64;
    fn tries(&self) -> u32;
    fn plans(&self) -> &[ExecutionPlan];
    fn closed(&self) -> bool;
    fn detail(&self) -> Struct;
    /// Messages of the failures recorded so far
    fn exceptions(&self) -> Vec<String>;

    /// Mail tasks expose their delivery extras
    fn mail(&self) -> Option<MailExtras> {
        None
    }

    /// Apply changes returned by a listener before execution (mail tasks)
    fn modify(&mut self, _changes: &Struct) {}
}

/// User callback notified around task execution.
pub trait TaskListener {
    fn listen(
        &self,
        ctx: &mut ExecutionContext,
        args: StructRef,
        before: bool,
    ) -> RuntimeResult<Value>;
}

fn array<I: IntoIterator<Item = Value>>(items: I) -> Value {
    Value::Array(Rc::new(RefCell::new(items.into_iter().collect())))
}

fn strings(items: &[String]) -> Value {
    array(items.iter().map(|s| Value::from(s.as_str())))
}

/// Build the argument struct passed to a task listener.
pub fn listener_args(
    task: &dyn SpoolerTask,
    error: Option<&RuntimeError>,
    before: bool,
    caller: &TemplateLine,
) -> Struct {
    let mut args = Struct::new();

    if task.last_execution() > 0 {
        args.set("lastExecution", Value::DateTime(task.last_execution()));
    }
    if task.next_execution() > 0 {
        args.set("nextExecution", Value::DateTime(task.next_execution()));
    }
    args.set(well_known("created"), Value::DateTime(task.creation()));
    args.set(well_known("id"), task.id());
    args.set(well_known("type"), task.task_type());

    let mut detail = task.detail();
    if let Some(mail) = task.mail() {
        detail.set(well_known("charset"), mail.charset.as_str());
        detail.set(well_known("replyto"), strings(&mail.reply_to));
        detail.set("failto", strings(&mail.fail_to));
    }
    args.set(well_known("detail"), detail);

    args.set(well_known("tries"), task.tries());
    let remaining = match error {
        None => 0,
        Some(_) => task.plans().len() as i64 - i64::from(task.tries()),
    };
    args.set("remainingtries", remaining);
    args.set(well_known("closed"), task.closed());
    if !before {
        args.set("passed", error.is_none());
    }
    if let Some(e) = error {
        let mut exception = Struct::new();
        exception.set(well_known("message"), e.to_string());
        args.set(well_known("exception"), exception);
    }

    let mut current = Struct::new();
    current.set(well_known("template"), caller.template.as_str());
    current.set(well_known("line"), caller.line);
    args.set(well_known("caller"), current);

    let mut advanced = Struct::new();
    advanced.set(well_known("exceptions"), strings(&task.exceptions()));
    let plans = task.plans().iter().map(|p| {
        let mut plan = Struct::new();
        plan.set(well_known("tries"), p.tries);
        plan.set("interval", p.interval_secs as i64);
        Value::from(plan)
    });
    advanced.set("executedPlans", array(plans));
    args.set("advanced", advanced);

    args
}

/// Invoke `listener` for `task`. Listener failures are logged, never
/// returned. Before execution, a struct returned for a mail task is applied
/// to the task.
pub fn notify_listener(
    ctx: &mut ExecutionContext,
    listener: &dyn TaskListener,
    task: &mut dyn SpoolerTask,
    error: Option<&RuntimeError>,
    before: bool,
    caller: &TemplateLine,
) {
    let args = Rc::new(RefCell::new(listener_args(task, error, before, caller)));
    debug!(task = task.id(), before, "notifying task listener");
    match listener.listen(ctx, args, before) {
        Ok(Value::Struct(changes)) if before && task.mail().is_some() => {
            task.modify(&changes.borrow());
        }
        Ok(_) => {}
        Err(e) => error!(task = task.id(), error = %e, "task listener failed"),
    }
}
