//! The `qcm quiz` command.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, ensure, Result};
use chrono::{DateTime, Utc};

use qcm_core::config::MAX_TIMER_MINUTES;
use qcm_core::exam::build_exam;
use qcm_core::loader::DirectoryStore;
use qcm_core::model::{choice_label, parse_choice_label, OrderMode};
use qcm_core::report::SessionReport;
use qcm_core::scoring::Outcome;
use qcm_core::session::{QuizSession, Step};
use qcm_core::statistics::{record_completion, JsonStatsFile};
use qcm_core::traits::LessonStore;

use super::Globals;

pub struct QuizArgs {
    pub module: String,
    pub lesson: Option<String>,
    /// `Some(None)` means `--exam` without a size.
    pub exam: Option<Option<usize>>,
    pub order: Option<OrderMode>,
    pub timer: Option<u32>,
    pub report: Option<PathBuf>,
    pub no_stats: bool,
}

pub fn execute(globals: &Globals, args: QuizArgs) -> Result<()> {
    let config = globals.resolve()?;
    let store = DirectoryStore::new(&config.root);
    let mut rng = rand::thread_rng();

    let bank = match (args.lesson.as_deref(), args.exam) {
        (Some(lesson), _) => store.load_bank(&args.module, lesson)?,
        (None, Some(size)) => build_exam(
            &store,
            &args.module,
            size.unwrap_or(config.exam_size),
            &mut rng,
        )?,
        (None, None) => bail!("pass either --lesson or --exam"),
    };

    let order = args.order.unwrap_or(config.default_order);
    let timer = args.timer.or(config.timer_minutes);
    if let Some(minutes) = timer {
        ensure!(
            (1..=MAX_TIMER_MINUTES).contains(&minutes),
            "the timer must be between 1 and {MAX_TIMER_MINUTES} minutes, got {minutes}"
        );
    }

    let mut session = QuizSession::start(bank, order, &mut rng)?;
    if let Some(minutes) = timer {
        session = session.with_time_limit(Utc::now(), minutes);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(
        out,
        "{} ({} questions, {order} order)",
        session.bank().origin,
        session.len()
    )?;
    if let Some(minutes) = timer {
        writeln!(out, "You have {minutes} minute(s).")?;
    }
    write_help(&mut out)?;

    let finished = run_session(&mut session, &mut stdin.lock(), &mut out, &Utc::now)?;
    if !finished {
        writeln!(out, "\nQuiz abandoned, nothing recorded.")?;
        return Ok(());
    }

    let report = SessionReport::from_session(&session);
    write_summary(&mut out, &report)?;

    if !args.no_stats {
        if let Some(completion) = session.take_completion() {
            let stats = JsonStatsFile::new(&config.stats_file);
            match record_completion(&stats, &completion.key, &completion.scores) {
                Ok(entry) => writeln!(
                    out,
                    "{}: {} attempt(s), {:.2}% on average.",
                    completion.key,
                    entry.attempts,
                    entry.average_percent()
                )?,
                Err(e) => tracing::warn!("statistics not saved: {e}"),
            }
        }
    }

    if let Some(path) = &args.report {
        match report.save_json(path) {
            Ok(()) => writeln!(out, "Report saved to: {}", path.display())?,
            Err(e) => tracing::warn!("report not saved: {e:#}"),
        }
    }

    Ok(())
}

/// One line of user input during a quiz.
#[derive(Debug, PartialEq)]
enum Input {
    /// Flip these choices of the current question.
    Toggle(Vec<usize>),
    Check,
    Next,
    Previous,
    Quit,
    Help,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" | "next" | ">" => return Input::Next,
        "prev" | "back" | "<" => return Input::Previous,
        "check" | "=" => return Input::Check,
        "quit" | "exit" => return Input::Quit,
        "help" => return Input::Help,
        _ => {}
    }

    let choices: Option<Vec<usize>> = line
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .map(parse_choice_label)
        .collect();
    match choices {
        Some(choices) if !choices.is_empty() => Input::Toggle(choices),
        _ => Input::Unknown(line.to_string()),
    }
}

/// Drive `session` from `input` until it finishes or the user leaves.
///
/// Returns `true` when the session finished (last question passed or time
/// ran out) and `false` when it was abandoned by `quit` or end of input.
fn run_session<R: BufRead, W: Write>(
    session: &mut QuizSession,
    input: &mut R,
    out: &mut W,
    now: &dyn Fn() -> DateTime<Utc>,
) -> Result<bool> {
    let mut shown = None;

    loop {
        if session.expire_if_due(now()) {
            writeln!(out, "\nTime is up!")?;
        }
        if session.is_finished() {
            return Ok(true);
        }

        if shown != Some(session.position()) {
            write_question(out, session, now())?;
            shown = Some(session.position());
        }
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        if session.expire_if_due(now()) {
            writeln!(out, "\nTime is up!")?;
            return Ok(true);
        }

        match parse_input(&line) {
            Input::Toggle(choices) => {
                let count = session.current().map_or(0, |q| q.choices().len());
                if let Some(&bad) = choices.iter().find(|&&c| c >= count) {
                    writeln!(out, "No choice {} on this question.", choice_label(bad))?;
                    continue;
                }
                for choice in choices {
                    session.toggle_choice(choice)?;
                }
                let selected = session.selection(session.position());
                writeln!(out, "Selected: {}", letters(&selected))?;
            }
            Input::Check => {
                let score = session.evaluate_current()?;
                write_feedback(out, session, score)?;
            }
            Input::Next => {
                session.advance(Step::Forward)?;
            }
            Input::Previous => {
                if session.position() == 0 {
                    writeln!(out, "Already at the first question.")?;
                } else {
                    session.advance(Step::Backward)?;
                }
            }
            Input::Quit => return Ok(false),
            Input::Help => write_help(out)?,
            Input::Unknown(text) => {
                writeln!(out, "Unrecognised input {text:?}. Type `help` for commands.")?;
            }
        }
    }
}

fn letters(selected: &BTreeSet<usize>) -> String {
    if selected.is_empty() {
        return "(none)".to_string();
    }
    selected
        .iter()
        .map(|&i| choice_label(i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Type choice letters (e.g. `a c`) to toggle them.")?;
    writeln!(
        out,
        "Commands: check (=), next (> or Enter), prev (<), help, quit"
    )
}

fn write_question<W: Write>(
    out: &mut W,
    session: &QuizSession,
    now: DateTime<Utc>,
) -> io::Result<()> {
    let position = session.position();
    let Some(question) = session.current() else {
        return Ok(());
    };

    write!(out, "\nQuestion {}/{}", position + 1, session.len())?;
    if let Some(left) = session.remaining(now) {
        let secs = left.num_seconds();
        write!(out, " ({:02}:{:02} left)", secs / 60, secs % 60)?;
    }
    if let Some(score) = session.score_at(position) {
        write!(out, " [checked: {score:.2}]")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", question.text())?;

    let selected = session.selection(position);
    for (i, choice) in question.choices().iter().enumerate() {
        let mark = if selected.contains(&i) { "x" } else { " " };
        writeln!(out, "  [{mark}] {}. {choice}", choice_label(i))?;
    }
    Ok(())
}

fn write_feedback<W: Write>(out: &mut W, session: &QuizSession, score: f64) -> io::Result<()> {
    match Outcome::from_score(Some(score)) {
        Outcome::Correct => writeln!(out, "Correct!")?,
        Outcome::Partial => writeln!(out, "Partially correct ({score:.2}).")?,
        _ => writeln!(out, "Incorrect.")?,
    }
    if let Some(question) = session.current() {
        writeln!(out, "Correct answer(s): {}", question.correct_letters())?;
    }
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, report: &SessionReport) -> io::Result<()> {
    writeln!(
        out,
        "\nFinal score: {:.2} / {} ({:.1}%)",
        report.final_score,
        report.question_count,
        report.percent()
    )?;
    if report.timed_out {
        writeln!(out, "Time ran out before the end.")?;
    }

    if report.review.is_empty() {
        writeln!(out, "Perfect score, nothing to review.")?;
        return Ok(());
    }

    writeln!(out, "\nReview (* marks the correct answers):")?;
    for item in &report.review {
        let outcome = Outcome::from_score(item.score);
        writeln!(
            out,
            "\nQ{}. {} [{}]",
            item.position + 1,
            item.question,
            outcome.symbol()
        )?;
        for choice in &item.choices {
            let mark = if choice.correct { "*" } else { " " };
            let picked = if choice.selected { "  (your answer)" } else { "" };
            writeln!(out, "  {mark} {}. {}{picked}", choice.label, choice.text)?;
        }
    }
    Ok(())
}
