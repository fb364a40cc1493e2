//! Check execution engine
//!
//! Runs a resolved set of checkers under a priority- and concurrency-aware
//! policy and aggregates a single pass/fail result. Checkers are sorted by
//! effective priority, partitioned by concurrency class, and executed in two
//! phases over a grow-only worker pool:
//!
//! - phase 1: every exclusive checker (multi_cpu = false) runs strictly one
//!   at a time on a single worker, in priority order. These checkers are
//!   presumed to saturate the CPU, so running anything alongside them only
//!   adds contention.
//! - phase 2: the pool grows to `parallelism` workers (the phase-1 worker is
//!   reused, never restarted) and the concurrent-class checkers share it.
//!
//! Each checker streams issue JSON lines into a pipe whose reader runs
//! concurrently with the checker itself; a checker that writes more than the
//! pipe capacity therefore cannot deadlock against a reader that has not
//! started. A checker "fails" exactly when at least one unfiltered issue (or
//! plumbing error) is rendered under its label.

use crate::checker::{CheckerFactory, CheckerParam, CheckerPriority, CheckerType};
use crate::core::error::{OmniError, OmniResult};
use crate::core::issue::Issue;
use std::cell::RefCell;
use std::io::{self, BufRead, BufReader, Write};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

/// Label used when a checker's type cannot be determined at execution time
const UNKNOWN_TYPE_LABEL: &str = "unknown";

/// Everything the engine needs for one run, built once by the CLI layer and
/// passed by value. The engine holds no state between invocations.
pub struct RunRequest {
  /// Resolved per-type checker parameters
  pub project_param: crate::checker::ProjectParam,
  /// Checker types to run, in desired order (resolution order only; actual
  /// execution order is decided by priority)
  pub checkers_to_run: Vec<CheckerType>,
  /// Target package paths
  pub pkg_paths: Vec<String>,
  /// Project root directory
  pub project_dir: PathBuf,
  /// Maximum number of concurrently executing checkers
  pub parallelism: usize,
}

/// Shared line-oriented output sink.
///
/// Workers write only complete, fully rendered lines; the mutex makes each
/// line atomic so concurrent checker output interleaves at line granularity
/// only, distinguishable by the per-line label prefix.
#[derive(Clone)]
pub struct OutputSink {
  inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputSink {
  pub fn new(writer: Box<dyn Write + Send>) -> Self {
    OutputSink {
      inner: Arc::new(Mutex::new(writer)),
    }
  }

  /// Sink writing to the process stdout
  pub fn to_stdout() -> Self {
    OutputSink::new(Box::new(io::stdout()))
  }

  /// Write one complete line. Write errors are ignored: losing a progress
  /// line must not fail a run, and issue loss is bounded by the same broken
  /// writer the summary would go to anyway.
  pub fn line(&self, line: &str) {
    let mut writer = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _ = writeln!(writer, "{}", line);
    let _ = writer.flush();
  }
}

/// Result of one checker execution
struct CheckOutcome {
  /// None for skipped checkers
  checker_type: Option<CheckerType>,
  /// Whether any unfiltered issue or plumbing error was rendered
  produced_output: bool,
}

/// Context shared by all workers for the duration of one run
struct WorkerContext {
  pkg_paths: Vec<String>,
  project_dir: PathBuf,
  /// Width of the widest requested type name, for aligned label padding
  max_type_len: usize,
  /// Whether more than one worker may be active (labels are only emitted
  /// when output from different checkers can interleave)
  multiple_workers: bool,
  stdout: OutputSink,
}

impl WorkerContext {
  fn label_prefix(&self, checker_type: &str) -> String {
    if self.multiple_workers {
      format!(
        "[{}] {}",
        checker_type,
        " ".repeat(self.max_type_len.saturating_sub(checker_type.len()))
      )
    } else {
      String::new()
    }
  }
}

/// Run the configured checkers against the package paths and aggregate a
/// single result.
///
/// Returns `Ok(())` if no checker produced output. If any did, a summary
/// line naming the failing checker types (sorted) is written and the
/// message-less `ChecksFailed` error is returned; per-checker detail was
/// already streamed. Resolution and sort-time metadata errors abort before
/// any checker executes.
pub fn run(request: RunRequest, factory: Option<&dyn CheckerFactory>, stdout: &OutputSink) -> OmniResult<()> {
  let RunRequest {
    project_param,
    checkers_to_run,
    pkg_paths,
    project_dir,
    parallelism,
  } = request;

  // resolve the concrete checker params: configured entry if present, else
  // a zero-configuration instance from the factory
  let mut configured = project_param.checks;
  let mut max_type_len = 0;
  let mut checkers: Vec<CheckerParam> = Vec::with_capacity(checkers_to_run.len());
  for checker_type in &checkers_to_run {
    max_type_len = max_type_len.max(checker_type.as_str().len());
    let param = match configured.remove(checker_type) {
      Some(param) => param,
      None => {
        let factory = factory.ok_or_else(|| OmniError::Resolution {
          checker_type: checker_type.to_string(),
          reason: "checker is not configured and no factory is available".to_string(),
        })?;
        CheckerParam::bare(factory.new_checker(checker_type, None)?)
      }
    };
    checkers.push(param);
  }

  sort_checkers(&mut checkers)?;

  // partition preserving priority order within each class
  let (exclusive, concurrent): (Vec<_>, Vec<_>) = checkers.into_iter().partition(|param| !param.checker.multi_cpu());

  let parallelism = parallelism.max(1).min((exclusive.len() + concurrent.len()).max(1));
  let ctx = Arc::new(WorkerContext {
    pkg_paths,
    project_dir,
    max_type_len,
    multiple_workers: parallelism > 1,
    stdout: stdout.clone(),
  });

  let (job_tx, job_rx) = mpsc::channel::<CheckerParam>();
  let (result_tx, result_rx) = mpsc::channel::<CheckOutcome>();
  let job_rx = Arc::new(Mutex::new(job_rx));

  let mut workers = Vec::with_capacity(parallelism);
  workers.push(spawn_worker(0, Arc::clone(&job_rx), result_tx.clone(), Arc::clone(&ctx))?);

  let mut failed_types: Vec<String> = Vec::new();

  // phase 1: exclusive checkers drain through the single worker, one at a
  // time, in priority order
  let exclusive_count = exclusive.len();
  for param in exclusive {
    let _ = job_tx.send(param);
  }
  collect_outcomes(&result_rx, exclusive_count, &mut failed_types)?;

  // phase 2: grow the pool (never shrinking, the phase-1 worker is reused)
  // and let the concurrent-class checkers share it
  for worker_idx in 1..pool_growth_target(parallelism, concurrent.len()) {
    workers.push(spawn_worker(
      worker_idx,
      Arc::clone(&job_rx),
      result_tx.clone(),
      Arc::clone(&ctx),
    )?);
  }
  let concurrent_count = concurrent.len();
  for param in concurrent {
    let _ = job_tx.send(param);
  }
  collect_outcomes(&result_rx, concurrent_count, &mut failed_types)?;

  drop(job_tx);
  for worker in workers {
    let _ = worker.join();
  }

  if !failed_types.is_empty() {
    failed_types.sort();
    stdout.line(&format!("Check(s) produced output: [{}]", failed_types.join(", ")));
    return Err(OmniError::ChecksFailed);
  }
  Ok(())
}

/// Size the phase-2 pool grows to: at most the requested parallelism, at
/// most one worker per concurrent-class checker, and never below the one
/// worker that already exists
fn pool_growth_target(parallelism: usize, concurrent_count: usize) -> usize {
  parallelism.min(concurrent_count.max(1))
}

/// Sort by effective priority ascending, ties broken by type name. Metadata
/// queried during comparison can fail; the first such error is retained and
/// surfaced after the sort completes rather than corrupting the comparator.
fn sort_checkers(checkers: &mut [CheckerParam]) -> OmniResult<()> {
  let first_err: RefCell<Option<OmniError>> = RefCell::new(None);

  let record = |err: OmniError| {
    let mut slot = first_err.borrow_mut();
    if slot.is_none() {
      *slot = Some(err);
    }
  };
  let effective_priority = |param: &CheckerParam| -> CheckerPriority {
    match param.priority_override {
      Some(priority) => priority,
      None => param.checker.priority().unwrap_or_else(|err| {
        record(err);
        0
      }),
    }
  };
  let type_name = |param: &CheckerParam| -> String {
    param.checker.checker_type().map(|t| t.to_string()).unwrap_or_else(|err| {
      record(err);
      String::new()
    })
  };

  checkers.sort_by(|a, b| {
    effective_priority(a)
      .cmp(&effective_priority(b))
      .then_with(|| type_name(a).cmp(&type_name(b)))
  });

  match first_err.into_inner() {
    Some(err) => Err(OmniError::metadata(format!(
      "failed to determine priority or type: {}",
      err
    ))),
    None => Ok(()),
  }
}

fn spawn_worker(
  worker_idx: usize,
  jobs: Arc<Mutex<Receiver<CheckerParam>>>,
  results: Sender<CheckOutcome>,
  ctx: Arc<WorkerContext>,
) -> OmniResult<thread::JoinHandle<()>> {
  Ok(
    thread::Builder::new()
      .name(format!("check-worker-{}", worker_idx))
      .spawn(move || worker_loop(jobs, results, ctx))?,
  )
}

fn worker_loop(jobs: Arc<Mutex<Receiver<CheckerParam>>>, results: Sender<CheckOutcome>, ctx: Arc<WorkerContext>) {
  loop {
    let job = {
      let guard = jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
      guard.recv()
    };
    let Ok(param) = job else {
      // job queue closed, run is over
      break;
    };
    let outcome = run_single_check(param, &ctx);
    if results.send(outcome).is_err() {
      break;
    }
  }
}

fn collect_outcomes(results: &Receiver<CheckOutcome>, count: usize, failed_types: &mut Vec<String>) -> OmniResult<()> {
  for _ in 0..count {
    let outcome = results
      .recv()
      .map_err(|_| OmniError::message("check worker terminated unexpectedly"))?;
    if outcome.produced_output
      && let Some(checker_type) = outcome.checker_type
    {
      failed_types.push(checker_type.to_string());
    }
  }
  Ok(())
}

/// The per-checker unit of work, identical on every worker
fn run_single_check(param: CheckerParam, ctx: &WorkerContext) -> CheckOutcome {
  if param.skip {
    return CheckOutcome {
      checker_type: None,
      produced_output: false,
    };
  }

  let checker_type = match param.checker.checker_type() {
    Ok(checker_type) => checker_type,
    Err(err) => {
      // cannot even label the checker; report under the sentinel label and
      // treat as a failing check without aborting siblings
      let prefix = ctx.label_prefix(UNKNOWN_TYPE_LABEL);
      ctx
        .stdout
        .line(&format!("{}failed to determine type for checker: {}", prefix, err));
      return CheckOutcome {
        checker_type: Some(CheckerType::from(UNKNOWN_TYPE_LABEL)),
        produced_output: true,
      };
    }
  };
  let prefix = ctx.label_prefix(checker_type.as_str());

  ctx.stdout.line(&format!("{}Running {}...", prefix, checker_type));

  let filtered_paths: Vec<String> = ctx
    .pkg_paths
    .iter()
    .filter(|path| !param.exclude.matches(path))
    .cloned()
    .collect();

  let mut produced_output = false;
  match io::pipe() {
    Err(err) => {
      ctx.stdout.line(&format!("{}failed to create pipe: {}", prefix, err));
      produced_output = true;
    }
    Ok((reader, writer)) => {
      // the drain runs concurrently with the check call: the reader is
      // guaranteed to be running before the write end is closed, and the
      // reader only unblocks once the write end closes at end-of-stream
      thread::scope(|scope| {
        let drain = scope.spawn(|| drain_issues(reader, &param, &prefix, &ctx.stdout));
        let mut writer = writer;
        // a panicking checker must not take its worker down: the result must
        // always be sent or the collector blocks forever
        let check_result = catch_unwind(AssertUnwindSafe(|| {
          param.checker.check(&filtered_paths, &ctx.project_dir, &mut writer);
        }));
        drop(writer);
        produced_output = match drain.join() {
          Ok(produced) => produced,
          Err(_) => {
            ctx.stdout.line(&format!("{}output reader panicked", prefix));
            true
          }
        };
        if let Err(payload) = check_result {
          ctx
            .stdout
            .line(&format!("{}check panicked: {}", prefix, panic_message(payload.as_ref())));
          produced_output = true;
        }
      });
    }
  }

  ctx.stdout.line(&format!("{}Finished {}", prefix, checker_type));
  CheckOutcome {
    checker_type: Some(checker_type),
    produced_output,
  }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
  if let Some(message) = payload.downcast_ref::<&str>() {
    message
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message
  } else {
    "opaque panic payload"
  }
}

/// Drain every line of a checker's output through the issue codec, apply
/// exclusion and filters, and render what survives under the worker's label.
/// Returns whether anything was rendered.
fn drain_issues(reader: io::PipeReader, param: &CheckerParam, prefix: &str, stdout: &OutputSink) -> bool {
  let mut produced_output = false;
  for line in BufReader::new(reader).lines() {
    let line = match line {
      Ok(line) => line,
      Err(err) => {
        stdout.line(&format!("{}error encountered while reading output: {}", prefix, err));
        produced_output = true;
        break;
      }
    };
    let issue = Issue::from_json_line(&line);
    if issue.is_empty() {
      continue;
    }
    if !issue.path.is_empty() && param.exclude.matches(&issue.path) {
      continue;
    }
    if param.filters.iter().any(|filter| filter.matches(&issue)) {
      continue;
    }
    // continuation lines of multi-line content carry the label too, so
    // concurrent output stays visually grouped
    let rendered = issue.to_string().replace('\n', &format!("\n{}", prefix));
    stdout.line(&format!("{}{}", prefix, rendered));
    produced_output = true;
  }
  produced_output
}
