//! Command shell driving one [`FrameGraph`].
//!
//! Supported slash-commands:
//!   /submit <parent> <frame> [x y z [qw qx qy qz]] [--static] [--age-ms N]
//!   /lookup <base> <target>
//!   /remove <frame>
//!   /expire <ms>    – set the expiry threshold for subsequent lookups
//!   /save           – persist the current settings
//!   /dump           – JSON snapshot of tree, frames and pending edges
//!   /graphviz       – Graphviz rendering of the tree
//!   /schema         – JSON schema of the /dump output
//!   /demo           – replace the graph with the reorder/remove walkthrough
//!   /help
//!   /quit | /exit
//!
//! Blank lines and lines starting with `#` are ignored, so the same syntax
//! works for script files.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use colored::Colorize;
use frameflow_graph::{FrameGraph, GraphSnapshot};
use frameflow_types::{LookupStatus, Quaternion, SubmitStatus, Transform3D, Vec3};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{self, Config};

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Submit {
        parent: String,
        frame: String,
        transform: Transform3D,
        is_static: bool,
        /// Backdate the edge timestamp by this many milliseconds.
        age_ms: u64,
    },
    Lookup {
        base: String,
        target: String,
    },
    Remove {
        frame: String,
    },
    Expire {
        ms: u64,
    },
    Save,
    Dump,
    Graphviz,
    Schema,
    Demo,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

const SUBMIT_USAGE: &str = "/submit <parent> <frame> [x y z [qw qx qy qz]] [--static] [--age-ms N]";

/// Parse one line.  Returns `Ok(None)` for blank lines and comments.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let cmd = match (head, args.as_slice()) {
        ("/submit", _) => parse_submit(&args)?,
        ("/lookup", [base, target]) => Command::Lookup {
            base: base.to_string(),
            target: target.to_string(),
        },
        ("/lookup", _) => return Err(CommandError::Usage("/lookup <base> <target>")),
        ("/remove", [frame]) => Command::Remove {
            frame: frame.to_string(),
        },
        ("/remove", _) => return Err(CommandError::Usage("/remove <frame>")),
        ("/expire", [ms]) => Command::Expire { ms: parse_num(ms)? },
        ("/expire", _) => return Err(CommandError::Usage("/expire <ms>")),
        ("/save", []) => Command::Save,
        ("/dump", []) => Command::Dump,
        ("/graphviz", []) => Command::Graphviz,
        ("/schema", []) => Command::Schema,
        ("/demo", []) => Command::Demo,
        ("/help", _) => Command::Help,
        ("/quit" | "/exit", _) => Command::Quit,
        (other, _) => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

fn parse_submit(args: &[&str]) -> Result<Command, CommandError> {
    let mut positional = Vec::new();
    let mut is_static = false;
    let mut age_ms = 0;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--static" => is_static = true,
            "--age-ms" => {
                let value = iter.next().ok_or(CommandError::Usage(SUBMIT_USAGE))?;
                age_ms = parse_num(value)?;
            }
            other => positional.push(other),
        }
    }

    let [parent, frame, numbers @ ..] = positional.as_slice() else {
        return Err(CommandError::Usage(SUBMIT_USAGE));
    };
    let values = numbers
        .iter()
        .map(|n| parse_num::<f32>(n))
        .collect::<Result<Vec<_>, _>>()?;
    let transform = match values.as_slice() {
        [] => Transform3D::identity(),
        [x, y, z] => Transform3D::from_translation(Vec3::new(*x, *y, *z)),
        [x, y, z, qw, qx, qy, qz] => Transform3D::new(
            Vec3::new(*x, *y, *z),
            Quaternion::new(*qw, *qx, *qy, *qz).normalized(),
        ),
        _ => return Err(CommandError::Usage(SUBMIT_USAGE)),
    };

    Ok(Command::Submit {
        parent: parent.to_string(),
        frame: frame.to_string(),
        transform,
        is_static,
        age_ms,
    })
}

fn parse_num<T: std::str::FromStr>(raw: &str) -> Result<T, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Shell
// ─────────────────────────────────────────────────────────────────────────────

/// Result of executing one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Owns the graph and the settings it was built from.
pub struct Shell {
    graph: FrameGraph,
    config: Config,
}

impl Shell {
    pub fn new(config: Config) -> Self {
        Self {
            graph: FrameGraph::with_params(config.graph_params()),
            config,
        }
    }

    pub fn graph(&self) -> &FrameGraph {
        &self.graph
    }

    pub fn prompt(&self) -> &str {
        &self.config.prompt
    }

    /// Parse and execute one line.  Blank lines and comments yield `None`.
    pub fn execute_line(&mut self, line: &str) -> Option<Reply> {
        match parse(line) {
            Ok(Some(cmd)) => Some(self.execute(cmd)),
            Ok(None) => None,
            Err(e) => Some(Reply::Text(format!(
                "{}: {}. Type {} for available commands.",
                "Error".red(),
                e,
                "/help".bold()
            ))),
        }
    }

    pub fn execute(&mut self, cmd: Command) -> Reply {
        debug!(command = ?cmd, "executing");
        let text = match cmd {
            Command::Submit {
                parent,
                frame,
                transform,
                is_static,
                age_ms,
            } => {
                let age = i64::try_from(age_ms)
                    .ok()
                    .and_then(TimeDelta::try_milliseconds)
                    .unwrap_or(TimeDelta::MAX);
                let timestamp = Utc::now()
                    .checked_sub_signed(age)
                    .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);
                let status = self
                    .graph
                    .submit_transform(&parent, &frame, transform, timestamp, is_static);
                format!("{} -> {}: {}", parent, frame, paint_submit(status))
            }
            Command::Lookup { base, target } => {
                let result = self.graph.lookup_transform(&base, &target);
                match result {
                    Ok(t) => format!("{} {}", LookupStatus::Ok.to_string().green(), format_transform(&t)),
                    Err(e) => e.to_string().red().to_string(),
                }
            }
            Command::Remove { frame } => {
                let result = self.graph.remove_frame(&frame);
                format!("{}: {}", frame, result)
            }
            Command::Expire { ms } => {
                self.config.expire_threshold_ms = ms;
                self.graph.set_expire_threshold(Duration::from_millis(ms));
                format!("expire threshold set to {} ms", ms)
            }
            Command::Save => match config::save(&self.config) {
                Ok(path) => format!("{} {}", "✓ Settings saved to".green(), path.display()),
                Err(e) => format!("{}: {}", "Error saving config".red(), e),
            },
            Command::Dump => self.graph.dump(),
            Command::Graphviz => self.graph.to_graphviz(),
            Command::Schema => GraphSnapshot::json_schema(),
            Command::Demo => self.run_demo(),
            Command::Help => help_text(),
            Command::Quit => return Reply::Quit,
        };
        Reply::Text(text)
    }

    /// Replace the graph with a walkthrough of out-of-order arrival, subtree
    /// removal and reattachment under a new parent.
    fn run_demo(&mut self) -> String {
        self.graph = FrameGraph::with_params(self.config.graph_params());
        let mut out = Vec::new();

        let edges = [
            ("world", "frame1"),
            ("world", "frame2"),
            ("frame1", "frame3"),
            ("frame3", "frame4"),
            ("frame4", "frame5"),
            ("frame5", "frame6"),
            ("frame7", "frame8"),
            ("frame4", "frame7"),
        ];
        for (parent, frame) in edges {
            let status = self
                .graph
                .submit_transform(parent, frame, Transform3D::identity(), Utc::now(), true);
            out.push(format!("submit {parent} -> {frame}: {}", paint_submit(status)));
        }

        out.push(format!("remove frame4: {}", self.graph.remove_frame("frame4")));
        let status = self
            .graph
            .submit_transform("frame2", "frame4", Transform3D::identity(), Utc::now(), true);
        out.push(format!("submit frame2 -> frame4: {}", paint_submit(status)));

        if let Some((first, last)) = self.graph.paths_to_lca("frame3", "frame6") {
            out.push(format!("frame3 to LCA: {}", first.join(" -> ")));
            out.push(format!("frame6 to LCA: {}", last.join(" -> ")));
        }
        out.push(self.graph.to_graphviz());
        out.join("\n")
    }
}

fn paint_submit(status: SubmitStatus) -> String {
    let s = status.as_str();
    match status {
        SubmitStatus::AddedNew | SubmitStatus::UpdatedExisting => s.green().to_string(),
        SubmitStatus::NoRouteToWorld => s.yellow().to_string(),
        SubmitStatus::UnmatchedParent => s.red().to_string(),
    }
}

fn format_transform(t: &Transform3D) -> String {
    format!(
        "translation ({:.4}, {:.4}, {:.4}) rotation ({:.4}, {:.4}, {:.4}, {:.4})",
        t.translation.x,
        t.translation.y,
        t.translation.z,
        t.rotation.w,
        t.rotation.x,
        t.rotation.y,
        t.rotation.z
    )
}

fn help_text() -> String {
    let rows = [
        (SUBMIT_USAGE, "submit an edge"),
        ("/lookup <base> <target>", "transform from base to target"),
        ("/remove <frame>", "remove a frame, demoting its descendants"),
        ("/expire <ms>", "set the expiry threshold"),
        ("/save", "persist settings to ~/.frameflow/config.toml"),
        ("/dump", "JSON snapshot"),
        ("/graphviz", "Graphviz rendering"),
        ("/schema", "JSON schema of /dump"),
        ("/demo", "reorder/remove walkthrough"),
        ("/quit  /exit", "exit"),
    ];
    let mut out = vec![format!("{}", "Frameflow Commands".bold().underline())];
    for (usage, what) in rows {
        out.push(format!("  {}  – {}", usage.bold().cyan(), what));
    }
    out.join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Loops
// ─────────────────────────────────────────────────────────────────────────────

/// Interactive loop.  `shutdown` is polled each iteration; when set the loop
/// exits cleanly.
pub fn run(shell: &mut Shell, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", shell.prompt().bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        match shell.execute_line(&line) {
            Some(Reply::Text(text)) => println!("{text}"),
            Some(Reply::Quit) => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            None => {}
        }
    }
}

/// Execute every line of `path`, stopping early on `/quit` or shutdown.
pub fn run_script(shell: &mut Shell, path: &Path, shutdown: &AtomicBool) -> io::Result<()> {
    let script = fs::read_to_string(path)?;
    info!(path = %path.display(), "running script");

    for line in script.lines() {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match shell.execute_line(line) {
            Some(Reply::Text(text)) => {
                println!("{} {}", ">".dimmed(), line.trim().dimmed());
                println!("{text}");
            }
            Some(Reply::Quit) => break,
            None => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(Config::default())
    }

    fn text(reply: Option<Reply>) -> String {
        match reply {
            Some(Reply::Text(t)) => t,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("   "), Ok(None));
        assert_eq!(parse("# world -> base"), Ok(None));
    }

    #[test]
    fn parse_submit_variants() {
        let cmd = parse("/submit world base").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Submit {
                parent: "world".into(),
                frame: "base".into(),
                transform: Transform3D::identity(),
                is_static: false,
                age_ms: 0,
            }
        );

        let Some(Command::Submit {
            transform,
            is_static,
            age_ms,
            ..
        }) = parse("/submit base cam 1 2 3 --static --age-ms 250").unwrap()
        else {
            panic!("expected submit");
        };
        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert!(is_static);
        assert_eq!(age_ms, 250);

        let Some(Command::Submit { transform, .. }) = parse("/submit a b 0 0 0 2 0 0 2").unwrap() else {
            panic!("expected submit");
        };
        assert!((transform.rotation.w - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse("/submit world"), Err(CommandError::Usage(SUBMIT_USAGE)));
        assert_eq!(parse("/submit a b 1 2"), Err(CommandError::Usage(SUBMIT_USAGE)));
        assert_eq!(parse("/submit a b x y z"), Err(CommandError::InvalidNumber("x".into())));
        assert_eq!(parse("/submit a b --age-ms"), Err(CommandError::Usage(SUBMIT_USAGE)));
        assert_eq!(parse("/lookup a"), Err(CommandError::Usage("/lookup <base> <target>")));
        assert_eq!(parse("/expire soon"), Err(CommandError::InvalidNumber("soon".into())));
        assert_eq!(parse("/teleport"), Err(CommandError::Unknown("/teleport".into())));
    }

    #[test]
    fn submit_and_lookup_through_the_shell() {
        let mut sh = shell();
        assert!(text(sh.execute_line("/submit a b 1 0 0")).contains("NO_ROUTE_TO_WORLD"));
        assert!(text(sh.execute_line("/submit world a 1 0 0")).contains("ADDED_NEW"));
        assert!(sh.graph().contains_frame("b"));

        let out = text(sh.execute_line("/lookup world b"));
        assert!(out.contains("OK"));
        assert!(out.contains("2.0000"));
    }

    #[test]
    fn expire_applies_to_next_lookup() {
        let mut sh = shell();
        sh.execute_line("/submit world a 1 0 0 --age-ms 5000");
        assert!(text(sh.execute_line("/lookup world a")).contains("OK"));

        sh.execute_line("/expire 100");
        assert_eq!(sh.graph().params().expire_threshold, Duration::from_millis(100));
        assert!(text(sh.execute_line("/lookup world a")).contains("EXPIRED_CHAIN"));
    }

    #[test]
    fn remove_reports_result() {
        let mut sh = shell();
        sh.execute_line("/submit world a");
        assert!(text(sh.execute_line("/remove a")).contains("OK"));
        assert!(text(sh.execute_line("/remove a")).contains("FRAME_NOT_FOUND"));
        assert!(text(sh.execute_line("/remove world")).contains("ROOT_PROTECTED"));
    }

    #[test]
    fn demo_reattaches_subtree() {
        let mut sh = shell();
        let out = text(sh.execute_line("/demo"));
        assert!(out.contains("frame3 to LCA: frame3 -> frame1"));
        assert!(out.contains("frame6 to LCA: frame6 -> frame5 -> frame4 -> frame2"));
        assert_eq!(sh.graph().parent_of("frame4"), Some("frame2"));
        assert_eq!(sh.graph().pending_count(), 0);
    }

    #[test]
    fn dump_is_json() {
        let mut sh = shell();
        sh.execute_line("/submit world a");
        let out = text(sh.execute_line("/dump"));
        assert!(out.contains("\"frames\""));
        assert!(out.contains("\"a\""));
    }

    #[test]
    fn quit_and_unknown() {
        let mut sh = shell();
        assert_eq!(sh.execute_line("/exit"), Some(Reply::Quit));
        assert!(text(sh.execute_line("/fly")).contains("unknown command"));
    }

    #[test]
    fn script_stops_at_quit() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("edges.tf");
        std::fs::write(
            &path,
            "# reversed chain\n/submit a b\n/submit world a\n/quit\n/submit world late\n",
        )
        .unwrap();

        let mut sh = shell();
        run_script(&mut sh, &path, &AtomicBool::new(false)).unwrap();
        assert!(sh.graph().contains_frame("b"));
        assert!(!sh.graph().contains_frame("late"));
    }
}
