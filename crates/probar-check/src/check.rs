//! Checkers bound to a test unit.
//!
//! A [`Check`] records failed checks against its unit and lets the test go
//! on. The unit fails the test when its last handle is dropped with
//! failures left, or earlier through [`Check::must`], [`Check::must_all`]
//! and [`AssertionMode::FailFast`](crate::AssertionMode::FailFast).
//!
//! ```ignore
//! let t = Check::new("parser");
//! t.equal(&tokens.len(), &3);
//! t.must(t.not_err(&result));
//! t.todo().contains(&names, "fixed later");
//! ```

use crate::compare::{self, ErrorValue, JsonText, Ordered, Pattern, Text};
use crate::config::CheckConfig;
use crate::dump::Dump;
use crate::reflect;
use crate::result::{CheckError, CheckResult};
use serde::{Deserialize, Serialize};
use std::any::type_name;
use std::fmt::{self, Display};
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const LABEL_WIDTH: usize = 10;

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Checker that failed
    pub checker: String,
    /// `file:line:column` of the check
    pub location: String,
    /// Full failure report
    pub message: String,
    /// Index of this failure within its unit
    pub index: usize,
}

impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Counters of a test unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Checks that passed
    pub passed: usize,
    /// Checks that failed
    pub failed: usize,
    /// Expected failures under [`Check::todo`]
    pub todo: usize,
}

impl CheckSummary {
    /// Every check run so far
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.todo
    }
}

#[derive(Debug, Default)]
struct UnitState {
    failures: Vec<Failure>,
    summary: CheckSummary,
    aborted: bool,
}

#[derive(Debug)]
struct Unit {
    name: String,
    config: CheckConfig,
    state: Mutex<UnitState>,
}

impl Unit {
    fn lock(&self) -> MutexGuard<'_, UnitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Unit {
    fn drop(&mut self) {
        if !self.config.verify_on_drop || std::thread::panicking() {
            return;
        }
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !state.failures.is_empty() {
            panic!("{}", failed_error(&self.name, &state.failures));
        }
    }
}

fn failed_error(unit: &str, failures: &[Failure]) -> CheckError {
    CheckError::Failed {
        unit: unit.to_string(),
        count: failures.len(),
        report: failures
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Values printed under the checker line of a failure.
#[derive(Debug, Default)]
struct Report {
    note: Option<String>,
    lines: Vec<(&'static str, String)>,
    diff: String,
}

impl Report {
    fn new() -> Self {
        Self::default()
    }

    fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    fn line(mut self, label: &'static str, value: impl Display) -> Self {
        self.lines.push((label, value.to_string()));
        self
    }

    fn actual(self, actual: &Dump) -> Self {
        self.line("Actual", actual)
    }

    fn versus(mut self, actual: &Dump, expected: &Dump, context: usize) -> Self {
        self.diff = actual.diff(expected, context);
        self.line("Expected", expected).line("Actual", actual)
    }
}

/// Handle to a test unit.
///
/// Clones share the unit. Modifiers ([`todo`](Self::todo),
/// [`must_all`](Self::must_all), [`with_msg`](Self::with_msg)) return a new
/// handle to the same unit, leaving `self` unchanged.
#[derive(Debug, Clone)]
pub struct Check {
    unit: Arc<Unit>,
    todo: bool,
    must: bool,
    msg: Option<Arc<str>>,
}

impl Check {
    /// New unit with the default configuration
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CheckConfig::default())
    }

    /// New unit with a specific configuration
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: CheckConfig) -> Self {
        Self {
            unit: Arc::new(Unit {
                name: name.into(),
                config,
                state: Mutex::new(UnitState::default()),
            }),
            todo: false,
            must: false,
            msg: None,
        }
    }

    /// Unit name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.unit.name
    }

    /// Unit configuration
    #[must_use]
    pub fn config(&self) -> CheckConfig {
        self.unit.config
    }

    /// Handle whose checks are expected to fail. A failing check counts as
    /// todo, a passing one is reported as a failure.
    #[must_use]
    pub fn todo(&self) -> Self {
        Self {
            todo: true,
            ..self.clone()
        }
    }

    /// Handle that stops the unit at its first failure.
    #[must_use]
    pub fn must_all(&self) -> Self {
        Self {
            must: true,
            ..self.clone()
        }
    }

    /// Handle that prefixes failure reports with `msg`.
    #[must_use]
    pub fn with_msg(&self, msg: impl Into<String>) -> Self {
        Self {
            msg: Some(Arc::from(msg.into())),
            ..self.clone()
        }
    }

    /// Run `f` as the sub-unit `<name>/<sub>`.
    ///
    /// A fail-now or an unexpected panic inside `f` stops only the
    /// sub-unit. Its failures and counters are merged into this unit.
    /// Returns whether the sub-unit passed.
    pub fn run<F: FnOnce(&Self)>(&self, name: &str, f: F) -> bool {
        let child = Self::with_config(format!("{}/{name}", self.unit.name), self.unit.config);
        tracing::debug!(unit = %child.unit.name, "running sub-unit");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(&child)));

        let (failures, summary) = {
            let mut state = child.unit.lock();
            if let Err(payload) = outcome {
                if !state.aborted {
                    let message = format!(
                        "{}\n{:<LABEL_WIDTH$}{}",
                        child.unit.name,
                        "Panic:",
                        compare::panic_text(payload.as_ref())
                    );
                    let index = state.failures.len();
                    state.failures.push(Failure {
                        checker: "run".to_string(),
                        location: String::new(),
                        message,
                        index,
                    });
                    state.summary.failed += 1;
                }
            }
            (std::mem::take(&mut state.failures), state.summary)
        };

        let passed = failures.is_empty();
        let mut state = self.unit.lock();
        for mut failure in failures {
            failure.index = state.failures.len();
            state.failures.push(failure);
        }
        state.summary.passed += summary.passed;
        state.summary.failed += summary.failed;
        state.summary.todo += summary.todo;
        passed
    }

    /// Copy of every failure recorded so far
    #[must_use]
    pub fn failures(&self) -> Vec<Failure> {
        self.unit.lock().failures.clone()
    }

    /// Remove and return every failure recorded so far. The unit no longer
    /// fails on drop because of them.
    pub fn take_failures(&self) -> Vec<Failure> {
        std::mem::take(&mut self.unit.lock().failures)
    }

    /// Counters of the unit
    #[must_use]
    pub fn summary(&self) -> CheckSummary {
        self.unit.lock().summary
    }

    /// Hand the recorded failures over as an error instead of failing on
    /// drop.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Failed`] listing every failure, if any.
    pub fn verify(&self) -> CheckResult<()> {
        let failures = self.take_failures();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failed_error(&self.unit.name, &failures))
        }
    }

    /// Stop the unit now, panicking with every failure recorded so far.
    pub fn fail_now(&self) -> ! {
        let failures = {
            let mut state = self.unit.lock();
            state.aborted = true;
            state.failures.clone()
        };
        tracing::warn!(unit = %self.unit.name, "unit stopped");
        if failures.is_empty() {
            panic!("{}: stopped", self.unit.name);
        }
        panic!("{}", failed_error(&self.unit.name, &failures));
    }

    /// Stop the unit when `continue_test` is false.
    ///
    /// ```ignore
    /// t.must(t.not_err(&result));
    /// ```
    #[track_caller]
    pub fn must(&self, continue_test: bool) {
        if !continue_test {
            self.fail_now();
        }
    }

    /// Unconditional failure with a message.
    #[track_caller]
    pub fn error(&self, msg: impl Display) -> bool {
        let location = Location::caller();
        self.verdict(false, "error", location, || Report::new().note(msg.to_string()))
    }

    fn verdict(
        &self,
        ok: bool,
        checker: &str,
        location: &Location<'_>,
        report: impl FnOnce() -> Report,
    ) -> bool {
        let unit = self.unit.name.as_str();
        match (ok, self.todo) {
            (true, false) => {
                self.unit.lock().summary.passed += 1;
                tracing::trace!(unit, checker, %location, "check passed");
            }
            (false, true) => {
                self.unit.lock().summary.todo += 1;
                tracing::debug!(unit, checker, %location, "todo check failed as expected");
            }
            (true, true) => {
                self.record(checker, location, &Report::new().note("unexpectedly passed, remove todo()"));
            }
            (false, false) => self.record(checker, location, &report()),
        }
        ok
    }

    fn record(&self, checker: &str, location: &Location<'_>, report: &Report) {
        let message = self.render(checker, location, report);
        tracing::warn!(unit = %self.unit.name, checker, %location, "check failed");
        {
            let mut state = self.unit.lock();
            let index = state.failures.len();
            state.failures.push(Failure {
                checker: checker.to_string(),
                location: location.to_string(),
                message,
                index,
            });
            state.summary.failed += 1;
        }
        if self.must || self.unit.config.is_fail_fast() {
            self.fail_now();
        }
    }

    fn render(&self, checker: &str, location: &Location<'_>, report: &Report) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(report.lines.len() + 4);
        if let Some(msg) = &self.msg {
            lines.push(msg.to_string());
        }
        if let Some(note) = &report.note {
            lines.push(note.clone());
        }
        lines.push(format!("{:<LABEL_WIDTH$}{checker}", "Checker:"));
        lines.push(format!("{:<LABEL_WIDTH$}{location}", "Location:"));
        for (label, value) in &report.lines {
            lines.push(format!("{:<LABEL_WIDTH$}{value}", format!("{label}:")));
        }
        let mut out = lines.join("\n");
        out.push_str(&report.diff);
        out
    }

    fn context(&self) -> usize {
        self.unit.config.diff_context
    }
}

fn text_dump<T: Text + ?Sized>(value: &T) -> Dump {
    match value.text() {
        Some(text) => Dump::text(&reflect::short_type_name(type_name::<T>()), &text),
        None => Dump::new(&()),
    }
}

fn error_dump<E: ErrorValue + ?Sized>(value: &E) -> Dump {
    match value.as_error() {
        Some(err) => Dump::debug(err),
        None => Dump::new(&()),
    }
}

fn json_dump<T: JsonText + ?Sized>(value: &T) -> (Dump, Option<String>) {
    match compare::parse_json(value) {
        Ok(Some(doc)) => {
            let pretty = serde_json::to_string_pretty(&doc).unwrap_or_else(|_| doc.to_string());
            (Dump::text("json", &pretty), None)
        }
        Ok(None) => (Dump::new(&()), None),
        Err(err) => {
            let raw = value.json().map(String::from_utf8_lossy).unwrap_or_default();
            (Dump::text("json", &raw), Some(err.to_string()))
        }
    }
}

fn short_type<T: ?Sized>() -> String {
    reflect::short_type_name(type_name::<T>())
}

// ---------------------------------------------------------------------------
// Checkers
// ---------------------------------------------------------------------------

impl Check {
    /// `cond == true`
    #[track_caller]
    pub fn is_true(&self, cond: bool) -> bool {
        let location = Location::caller();
        self.verdict(cond, "is_true", location, Report::new)
    }

    /// `cond == false`
    #[track_caller]
    pub fn is_false(&self, cond: bool) -> bool {
        let location = Location::caller();
        self.verdict(!cond, "is_false", location, Report::new)
    }

    /// `actual` is `()` or `None`
    #[track_caller]
    pub fn nil<T: Serialize + ?Sized>(&self, actual: &T) -> bool {
        let location = Location::caller();
        let reflected = reflect::reflect(actual);
        let ok = reflected.value.is_nil();
        self.verdict(ok, "nil", location, || {
            Report::new().actual(&Dump::from_reflected(reflected))
        })
    }

    /// `actual` is neither `()` nor `None`
    #[track_caller]
    pub fn not_nil<T: Serialize + ?Sized>(&self, actual: &T) -> bool {
        let location = Location::caller();
        let ok = !reflect::reflect(actual).value.is_nil();
        self.verdict(ok, "not_nil", location, Report::new)
    }

    /// `actual == expected`
    #[track_caller]
    pub fn equal<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: PartialEq<E> + Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = compare::equal(actual, expected);
        self.verdict(ok, "equal", location, || {
            Report::new().versus(&Dump::new(actual), &Dump::new(expected), self.context())
        })
    }

    /// Alias of [`equal`](Self::equal)
    #[track_caller]
    pub fn eq<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: PartialEq<E> + Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        self.equal(actual, expected)
    }

    /// `actual != expected`
    #[track_caller]
    pub fn not_equal<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: PartialEq<E> + Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = !compare::equal(actual, expected);
        self.verdict(ok, "not_equal", location, || Report::new().actual(&Dump::new(actual)))
    }

    /// Alias of [`not_equal`](Self::not_equal)
    #[track_caller]
    pub fn ne<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: PartialEq<E> + Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        self.not_equal(actual, expected)
    }

    /// Byte buffers are equal
    #[track_caller]
    pub fn bytes_equal(&self, actual: &[u8], expected: &[u8]) -> bool {
        let location = Location::caller();
        let ok = compare::bytes_equal(actual, expected);
        self.verdict(ok, "bytes_equal", location, || {
            Report::new().versus(&Dump::new(actual), &Dump::new(expected), self.context())
        })
    }

    /// Byte buffers differ
    #[track_caller]
    pub fn not_bytes_equal(&self, actual: &[u8], expected: &[u8]) -> bool {
        let location = Location::caller();
        let ok = !compare::bytes_equal(actual, expected);
        self.verdict(ok, "not_bytes_equal", location, || {
            Report::new().actual(&Dump::new(actual))
        })
    }

    /// Same canonical type and same content
    #[track_caller]
    pub fn deep_equal<A: Serialize + ?Sized, E: Serialize + ?Sized>(
        &self,
        actual: &A,
        expected: &E,
    ) -> bool {
        let location = Location::caller();
        let (a, e) = (reflect::reflect(actual), reflect::reflect(expected));
        let ok = compare::deep_equal_reflected(&a, &e);
        self.verdict(ok, "deep_equal", location, || {
            Report::new().versus(&Dump::from_reflected(a), &Dump::from_reflected(e), self.context())
        })
    }

    /// Not [`deep_equal`](Self::deep_equal)
    #[track_caller]
    pub fn not_deep_equal<A: Serialize + ?Sized, E: Serialize + ?Sized>(
        &self,
        actual: &A,
        expected: &E,
    ) -> bool {
        let location = Location::caller();
        let a = reflect::reflect(actual);
        let ok = !compare::deep_equal_reflected(&a, &reflect::reflect(expected));
        self.verdict(ok, "not_deep_equal", location, || {
            Report::new().actual(&Dump::from_reflected(a))
        })
    }

    /// Text of `actual` matches `pattern`. Values without text never match.
    ///
    /// # Panics
    ///
    /// When `pattern` is a malformed regular expression.
    #[track_caller]
    pub fn is_match<A: Text + ?Sized, P: Pattern + ?Sized>(&self, actual: &A, pattern: &P) -> bool {
        let location = Location::caller();
        let ok = compare::is_match(actual, pattern);
        self.verdict(ok, "is_match", location, || {
            Report::new()
                .line("Regexp", format!("{:?}", pattern.regex().as_str()))
                .actual(&text_dump(actual))
        })
    }

    /// Text of `actual` does not match `pattern`
    ///
    /// # Panics
    ///
    /// When `pattern` is a malformed regular expression.
    #[track_caller]
    pub fn not_match<A: Text + ?Sized, P: Pattern + ?Sized>(&self, actual: &A, pattern: &P) -> bool {
        let location = Location::caller();
        let ok = !compare::is_match(actual, pattern);
        self.verdict(ok, "not_match", location, || {
            Report::new()
                .line("Regexp", format!("{:?}", pattern.regex().as_str()))
                .actual(&text_dump(actual))
        })
    }

    /// `container` holds `needle` as substring, element or map value
    ///
    /// # Panics
    ///
    /// When `container` is not a container or the needle type does not
    /// match its elements.
    #[track_caller]
    pub fn contains<A: Serialize + ?Sized, E: Serialize + ?Sized>(
        &self,
        container: &A,
        needle: &E,
    ) -> bool {
        let location = Location::caller();
        let (a, e) = (reflect::reflect(container), reflect::reflect(needle));
        let ok = compare::contains_reflected(&a, &e);
        self.verdict(ok, "contains", location, || {
            Report::new().versus(&Dump::from_reflected(a), &Dump::from_reflected(e), self.context())
        })
    }

    /// `container` does not hold `needle`
    ///
    /// # Panics
    ///
    /// Same as [`contains`](Self::contains).
    #[track_caller]
    pub fn not_contains<A: Serialize + ?Sized, E: Serialize + ?Sized>(
        &self,
        container: &A,
        needle: &E,
    ) -> bool {
        let location = Location::caller();
        let (a, e) = (reflect::reflect(container), reflect::reflect(needle));
        let ok = !compare::contains_reflected(&a, &e);
        self.verdict(ok, "not_contains", location, || {
            Report::new().versus(&Dump::from_reflected(a), &Dump::from_reflected(e), self.context())
        })
    }

    /// Map `map` has key `key`
    ///
    /// # Panics
    ///
    /// When `map` is not a map or the key type does not match.
    #[track_caller]
    pub fn has_key<A: Serialize + ?Sized, K: Serialize + ?Sized>(&self, map: &A, key: &K) -> bool {
        let location = Location::caller();
        let ok = compare::has_key(map, key);
        self.verdict(ok, "has_key", location, || {
            Report::new().versus(&Dump::new(map), &Dump::new(key), self.context())
        })
    }

    /// Map `map` has no key `key`
    ///
    /// # Panics
    ///
    /// Same as [`has_key`](Self::has_key).
    #[track_caller]
    pub fn not_has_key<A: Serialize + ?Sized, K: Serialize + ?Sized>(
        &self,
        map: &A,
        key: &K,
    ) -> bool {
        let location = Location::caller();
        let ok = !compare::has_key(map, key);
        self.verdict(ok, "not_has_key", location, || {
            Report::new().versus(&Dump::new(map), &Dump::new(key), self.context())
        })
    }

    /// `actual` is the zero value of its type
    #[track_caller]
    pub fn zero<T: Serialize + ?Sized>(&self, actual: &T) -> bool {
        let location = Location::caller();
        let reflected = reflect::reflect(actual);
        let ok = compare::is_zero(&reflected.value);
        self.verdict(ok, "zero", location, || {
            Report::new().actual(&Dump::from_reflected(reflected))
        })
    }

    /// `actual` is not the zero value of its type
    #[track_caller]
    pub fn not_zero<T: Serialize + ?Sized>(&self, actual: &T) -> bool {
        let location = Location::caller();
        let reflected = reflect::reflect(actual);
        let ok = !compare::is_zero(&reflected.value);
        self.verdict(ok, "not_zero", location, || {
            Report::new().actual(&Dump::from_reflected(reflected))
        })
    }

    /// Length of `actual` is `expected`
    ///
    /// # Panics
    ///
    /// When `actual` has no length.
    #[track_caller]
    pub fn len<T: Serialize + ?Sized>(&self, actual: &T, expected: usize) -> bool {
        let location = Location::caller();
        let len = compare::len(actual);
        self.verdict(len == expected, "len", location, || {
            Report::new().versus(&Dump::new(&len), &Dump::new(&expected), self.context())
        })
    }

    fn ordered<A, E>(
        &self,
        ok: bool,
        checker: &str,
        location: &Location<'_>,
        actual: &A,
        expected: &E,
    ) -> bool
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        self.verdict(ok, checker, location, || {
            Report::new().versus(&Dump::new(actual), &Dump::new(expected), self.context())
        })
    }

    /// `actual < expected`
    ///
    /// # Panics
    ///
    /// When the values cannot be ordered.
    #[track_caller]
    pub fn less<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = compare::less(actual, expected);
        self.ordered(ok, "less", location, actual, expected)
    }

    /// Alias of [`less`](Self::less)
    #[track_caller]
    pub fn lt<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
    {
        self.less(actual, expected)
    }

    /// `actual <= expected`
    ///
    /// # Panics
    ///
    /// When the values cannot be ordered.
    #[track_caller]
    pub fn less_or_equal<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = compare::less_or_equal(actual, expected);
        self.ordered(ok, "less_or_equal", location, actual, expected)
    }

    /// Alias of [`less_or_equal`](Self::less_or_equal)
    #[track_caller]
    pub fn le<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
    {
        self.less_or_equal(actual, expected)
    }

    /// `actual > expected`
    ///
    /// # Panics
    ///
    /// When the values cannot be ordered.
    #[track_caller]
    pub fn greater<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = compare::greater(actual, expected);
        self.ordered(ok, "greater", location, actual, expected)
    }

    /// Alias of [`greater`](Self::greater)
    #[track_caller]
    pub fn gt<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
    {
        self.greater(actual, expected)
    }

    /// `actual >= expected`
    ///
    /// # Panics
    ///
    /// When the values cannot be ordered.
    #[track_caller]
    pub fn greater_or_equal<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = compare::greater_or_equal(actual, expected);
        self.ordered(ok, "greater_or_equal", location, actual, expected)
    }

    /// Alias of [`greater_or_equal`](Self::greater_or_equal)
    #[track_caller]
    pub fn ge<A, E>(&self, actual: &A, expected: &E) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
    {
        self.greater_or_equal(actual, expected)
    }

    fn range<A, L, H>(
        &self,
        ok: bool,
        checker: &str,
        location: &Location<'_>,
        (actual, min, max): (&A, &L, &H),
    ) -> bool
    where
        A: Serialize + ?Sized,
        L: Serialize + ?Sized,
        H: Serialize + ?Sized,
    {
        self.verdict(ok, checker, location, || {
            Report::new()
                .line("Min", Dump::new(min))
                .line("Max", Dump::new(max))
                .actual(&Dump::new(actual))
        })
    }

    /// `min < actual < max`
    ///
    /// # Panics
    ///
    /// When the values cannot be ordered.
    #[track_caller]
    pub fn between<A, L, H>(&self, actual: &A, min: &L, max: &H) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        L: Ordered + Serialize + ?Sized,
        H: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = compare::between(actual, min, max);
        self.range(ok, "between", location, (actual, min, max))
    }

    /// Not `min < actual < max`
    ///
    /// # Panics
    ///
    /// When the values cannot be ordered.
    #[track_caller]
    pub fn not_between<A, L, H>(&self, actual: &A, min: &L, max: &H) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        L: Ordered + Serialize + ?Sized,
        H: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = !compare::between(actual, min, max);
        self.range(ok, "not_between", location, (actual, min, max))
    }

    /// `min <= actual <= max`
    ///
    /// # Panics
    ///
    /// When the values cannot be ordered.
    #[track_caller]
    pub fn between_or_equal<A, L, H>(&self, actual: &A, min: &L, max: &H) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        L: Ordered + Serialize + ?Sized,
        H: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = compare::between_or_equal(actual, min, max);
        self.range(ok, "between_or_equal", location, (actual, min, max))
    }

    /// Not `min <= actual <= max`
    ///
    /// # Panics
    ///
    /// When the values cannot be ordered.
    #[track_caller]
    pub fn not_between_or_equal<A, L, H>(&self, actual: &A, min: &L, max: &H) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        L: Ordered + Serialize + ?Sized,
        H: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = !compare::between_or_equal(actual, min, max);
        self.range(ok, "not_between_or_equal", location, (actual, min, max))
    }

    fn tolerance<A, E>(
        &self,
        ok: bool,
        checker: &str,
        location: &Location<'_>,
        (actual, expected): (&A, &E),
        limit: (&'static str, String),
    ) -> bool
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        self.verdict(ok, checker, location, || {
            Report::new()
                .line(limit.0, limit.1)
                .versus(&Dump::new(actual), &Dump::new(expected), self.context())
        })
    }

    /// `|actual - expected| <= delta`
    ///
    /// # Panics
    ///
    /// On a negative delta or operands that are not numbers or instants.
    #[track_caller]
    pub fn in_delta<A, E, D>(&self, actual: &A, expected: &E, delta: &D) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
        D: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = compare::in_delta(actual, expected, delta);
        let limit = ("Delta", Dump::new(delta).to_string());
        self.tolerance(ok, "in_delta", location, (actual, expected), limit)
    }

    /// `|actual - expected| > delta`
    ///
    /// # Panics
    ///
    /// Same as [`in_delta`](Self::in_delta).
    #[track_caller]
    pub fn not_in_delta<A, E, D>(&self, actual: &A, expected: &E, delta: &D) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
        D: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = !compare::in_delta(actual, expected, delta);
        let limit = ("Delta", Dump::new(delta).to_string());
        self.tolerance(ok, "not_in_delta", location, (actual, expected), limit)
    }

    /// SMAPE of `actual` and `expected` is at most `smape` percent
    ///
    /// # Panics
    ///
    /// When `smape` is outside `(0, 100]` or an operand is not a number.
    #[track_caller]
    pub fn in_smape<A, E>(&self, actual: &A, expected: &E, smape: f64) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = compare::in_smape(actual, expected, smape);
        let limit = ("SMAPE", format!("{smape}"));
        self.tolerance(ok, "in_smape", location, (actual, expected), limit)
    }

    /// SMAPE of `actual` and `expected` is above `smape` percent
    ///
    /// # Panics
    ///
    /// Same as [`in_smape`](Self::in_smape).
    #[track_caller]
    pub fn not_in_smape<A, E>(&self, actual: &A, expected: &E, smape: f64) -> bool
    where
        A: Ordered + Serialize + ?Sized,
        E: Ordered + Serialize + ?Sized,
    {
        let location = Location::caller();
        let ok = !compare::in_smape(actual, expected, smape);
        let limit = ("SMAPE", format!("{smape}"));
        self.tolerance(ok, "not_in_smape", location, (actual, expected), limit)
    }

    fn affix<A: Text + ?Sized, P: Text + ?Sized>(
        &self,
        ok: bool,
        checker: &str,
        location: &Location<'_>,
        label: &'static str,
        (actual, affix): (&A, &P),
    ) -> bool {
        self.verdict(ok, checker, location, || {
            Report::new().line(label, text_dump(affix)).actual(&text_dump(actual))
        })
    }

    /// Text of `actual` starts with text of `prefix`
    #[track_caller]
    pub fn has_prefix<A: Text + ?Sized, P: Text + ?Sized>(&self, actual: &A, prefix: &P) -> bool {
        let location = Location::caller();
        let ok = compare::has_prefix(actual, prefix);
        self.affix(ok, "has_prefix", location, "Prefix", (actual, prefix))
    }

    /// Text of `actual` does not start with text of `prefix`
    #[track_caller]
    pub fn not_has_prefix<A: Text + ?Sized, P: Text + ?Sized>(
        &self,
        actual: &A,
        prefix: &P,
    ) -> bool {
        let location = Location::caller();
        let ok = !compare::has_prefix(actual, prefix);
        self.affix(ok, "not_has_prefix", location, "Prefix", (actual, prefix))
    }

    /// Text of `actual` ends with text of `suffix`
    #[track_caller]
    pub fn has_suffix<A: Text + ?Sized, S: Text + ?Sized>(&self, actual: &A, suffix: &S) -> bool {
        let location = Location::caller();
        let ok = compare::has_suffix(actual, suffix);
        self.affix(ok, "has_suffix", location, "Suffix", (actual, suffix))
    }

    /// Text of `actual` does not end with text of `suffix`
    #[track_caller]
    pub fn not_has_suffix<A: Text + ?Sized, S: Text + ?Sized>(
        &self,
        actual: &A,
        suffix: &S,
    ) -> bool {
        let location = Location::caller();
        let ok = !compare::has_suffix(actual, suffix);
        self.affix(ok, "not_has_suffix", location, "Suffix", (actual, suffix))
    }

    /// Both sides are valid and equal JSON documents
    #[track_caller]
    pub fn json_equal<A: JsonText + ?Sized, E: JsonText + ?Sized>(
        &self,
        actual: &A,
        expected: &E,
    ) -> bool {
        let location = Location::caller();
        let ok = compare::json_equal(actual, expected);
        self.verdict(ok, "json_equal", location, || {
            let (a, a_err) = json_dump(actual);
            let (e, e_err) = json_dump(expected);
            let mut report = Report::new();
            if let Some(err) = e_err {
                report = report.line("Invalid", format!("expected: {err}"));
            }
            if let Some(err) = a_err {
                report = report.line("Invalid", format!("actual: {err}"));
            }
            report.versus(&a, &e, self.context())
        })
    }

    /// `actual` and `expected` have the same type
    #[track_caller]
    pub fn has_type<A: ?Sized + 'static, E: ?Sized + 'static>(&self, actual: &A, expected: &E) -> bool {
        let location = Location::caller();
        let ok = compare::has_type(actual, expected);
        self.verdict(ok, "has_type", location, || {
            Report::new()
                .line("Expected", short_type::<E>())
                .line("Actual", short_type::<A>())
        })
    }

    /// `actual` and `expected` have different types
    #[track_caller]
    pub fn not_has_type<A: ?Sized + 'static, E: ?Sized + 'static>(
        &self,
        actual: &A,
        expected: &E,
    ) -> bool {
        let location = Location::caller();
        let ok = !compare::has_type(actual, expected);
        self.verdict(ok, "not_has_type", location, || {
            Report::new().line("Actual", short_type::<A>())
        })
    }

    /// `expected` is in the source chain of `actual`. Two missing errors
    /// match.
    #[track_caller]
    pub fn err<A: ErrorValue + ?Sized, E: ErrorValue + ?Sized>(&self, actual: &A, expected: &E) -> bool {
        let location = Location::caller();
        let ok = compare::error_is(actual, expected);
        self.verdict(ok, "err", location, || {
            Report::new().versus(&error_dump(actual), &error_dump(expected), self.context())
        })
    }

    /// `expected` is not in the source chain of `actual`
    #[track_caller]
    pub fn not_err<A: ErrorValue + ?Sized, E: ErrorValue + ?Sized>(
        &self,
        actual: &A,
        expected: &E,
    ) -> bool {
        let location = Location::caller();
        let ok = !compare::error_is(actual, expected);
        self.verdict(ok, "not_err", location, || Report::new().actual(&error_dump(actual)))
    }

    /// `actual` holds no error
    #[track_caller]
    pub fn ok<A: ErrorValue + ?Sized>(&self, actual: &A) -> bool {
        let location = Location::caller();
        let ok = actual.as_error().is_none();
        self.verdict(ok, "ok", location, || Report::new().actual(&error_dump(actual)))
    }

    /// `f` panics
    #[track_caller]
    pub fn panics<F: FnOnce()>(&self, f: F) -> bool {
        let location = Location::caller();
        let ok = panic::catch_unwind(AssertUnwindSafe(f)).is_err();
        self.verdict(ok, "panics", location, || Report::new().note("did not panic"))
    }

    /// `f` returns normally
    #[track_caller]
    pub fn not_panics<F: FnOnce()>(&self, f: F) -> bool {
        let location = Location::caller();
        let outcome = panic::catch_unwind(AssertUnwindSafe(f));
        let ok = outcome.is_ok();
        self.verdict(ok, "not_panics", location, || match outcome {
            Err(payload) => Report::new().line("Panic", compare::panic_text(payload.as_ref())),
            Ok(()) => Report::new(),
        })
    }

    /// `f` panics with a message matching `pattern`
    ///
    /// # Panics
    ///
    /// When `pattern` is a malformed regular expression.
    #[track_caller]
    pub fn panic_match<F: FnOnce(), P: Pattern + ?Sized>(&self, f: F, pattern: &P) -> bool {
        let location = Location::caller();
        self.panic_text_check("panic_match", location, f, pattern, true)
    }

    /// `f` panics with a message not matching `pattern`
    ///
    /// # Panics
    ///
    /// When `pattern` is a malformed regular expression.
    #[track_caller]
    pub fn panic_not_match<F: FnOnce(), P: Pattern + ?Sized>(&self, f: F, pattern: &P) -> bool {
        let location = Location::caller();
        self.panic_text_check("panic_not_match", location, f, pattern, false)
    }

    fn panic_text_check<F: FnOnce(), P: Pattern + ?Sized>(
        &self,
        checker: &str,
        location: &Location<'_>,
        f: F,
        pattern: &P,
        want_match: bool,
    ) -> bool {
        let regex = pattern.regex();
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(()) => self.verdict(false, checker, location, || Report::new().note("did not panic")),
            Err(payload) => {
                let text = compare::panic_text(payload.as_ref());
                let ok = regex.is_match(&text) == want_match;
                self.verdict(ok, checker, location, || {
                    Report::new()
                        .line("Regexp", format!("{:?}", regex.as_str()))
                        .actual(&Dump::text("panic", &text))
                })
            }
        }
    }

    /// Custom one-value checker
    #[track_caller]
    pub fn should<A, F>(&self, checker: F, actual: &A) -> bool
    where
        A: Serialize + ?Sized,
        F: FnOnce(&Self, &A) -> bool,
    {
        let location = Location::caller();
        let name = format!("should({})", short_type::<F>());
        let ok = checker(self, actual);
        self.verdict(ok, &name, location, || Report::new().actual(&Dump::new(actual)))
    }

    /// Custom two-value checker
    #[track_caller]
    pub fn should_with<A, E, F>(&self, checker: F, actual: &A, expected: &E) -> bool
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
        F: FnOnce(&Self, &A, &E) -> bool,
    {
        let location = Location::caller();
        let name = format!("should_with({})", short_type::<F>());
        let ok = checker(self, actual, expected);
        self.verdict(ok, &name, location, || {
            Report::new().versus(&Dump::new(actual), &Dump::new(expected), self.context())
        })
    }
}
