//! Interactive host loop driving a `ValidatorSession` from stdin.
//!
//! Captured snapshots stand in for pages; `go <path>` simulates navigation.
//! A reader thread forwards input lines over a channel and the loop waits
//! with `recv_timeout` until the session's next deadline, so navigation
//! before a pending scan fires replaces it.

use crate::error::LoadError;
use crate::models::site::SiteMap;
use crate::models::snapshot::{DomSnapshot, Element};
use crate::models::{IssueType, Severity};
use crate::session::{SessionOptions, ValidatorSession};
use crate::widget::{ValidatorWidget, WidgetView};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const IDLE_WAIT: Duration = Duration::from_secs(3600);

pub const HELP: &str = "commands: go <path> | scan | sev <high|medium|low> | type <type> | tips | fold <type> | open | close | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Scan,
    Severity(Severity),
    Type(IssueType),
    Tips,
    Fold(IssueType),
    Open,
    Close,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();
    let need = |what: &str| format!("`{}` needs {}", head, what);
    let cmd = match head.to_ascii_lowercase().as_str() {
        "go" => {
            let path = arg.ok_or_else(|| need("a path"))?;
            if !path.starts_with('/') {
                return Err(format!("path must start with '/': {}", path));
            }
            Command::Go(path.to_string())
        }
        "scan" => Command::Scan,
        "sev" => {
            let s = arg.ok_or_else(|| need("a severity"))?;
            Command::Severity(Severity::parse(s).ok_or_else(|| format!("unknown severity: {}", s))?)
        }
        "type" | "fold" => {
            let s = arg.ok_or_else(|| need("an issue type"))?;
            let t = IssueType::parse(s).ok_or_else(|| format!("unknown issue type: {}", s))?;
            if head.eq_ignore_ascii_case("type") {
                Command::Type(t)
            } else {
                Command::Fold(t)
            }
        }
        "tips" => Command::Tips,
        "open" => Command::Open,
        "close" => Command::Close,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(Some(cmd))
}

/// Load snapshots keyed by pathname. Later files win on duplicate paths.
pub fn load_pages(files: &[PathBuf]) -> Result<BTreeMap<String, DomSnapshot>, LoadError> {
    let mut pages = BTreeMap::new();
    for f in files {
        let snap = DomSnapshot::load(f)?;
        if pages.contains_key(&snap.pathname) {
            warn!("{} replaces an earlier snapshot of {}", f.display(), snap.pathname);
        }
        pages.insert(snap.pathname.clone(), snap);
    }
    Ok(pages)
}

fn blank_page(pathname: &str) -> DomSnapshot {
    DomSnapshot::new(Element::new("html").child(Element::new("body"))).at(pathname)
}

/// Session, widget, and the pages they run against.
pub struct Watch<'a> {
    pages: &'a BTreeMap<String, DomSnapshot>,
    site: &'a SiteMap,
    session: ValidatorSession,
    widget: ValidatorWidget,
    blank: DomSnapshot,
}

pub enum Flow {
    Continue,
    Quit,
}

impl<'a> Watch<'a> {
    pub fn new(
        pages: &'a BTreeMap<String, DomSnapshot>,
        site: &'a SiteMap,
        opts: SessionOptions,
        start: &str,
        now: Instant,
    ) -> Self {
        let mut session = ValidatorSession::new(opts);
        session.mount(start, now);
        Watch {
            pages,
            site,
            session,
            widget: ValidatorWidget::new(),
            blank: blank_page(start),
        }
    }

    pub fn session(&self) -> &ValidatorSession {
        &self.session
    }

    pub fn widget(&self) -> &ValidatorWidget {
        &self.widget
    }

    pub fn has_page(&self, pathname: &str) -> bool {
        self.pages.contains_key(pathname)
    }

    pub fn apply(&mut self, cmd: Command, now: Instant) -> Flow {
        match cmd {
            Command::Go(path) => {
                if self.session.route_changed(&path, now) {
                    self.blank = blank_page(&path);
                }
            }
            Command::Scan => {
                let page = self.pages.get(self.session.pathname()).unwrap_or(&self.blank);
                self.session.scan_now(page, self.site);
            }
            Command::Severity(s) => self.widget.toggle_severity(s),
            Command::Type(t) => self.widget.toggle_type(t),
            Command::Tips => self.widget.toggle_suggestions(),
            Command::Fold(t) => self.widget.toggle_group(t),
            Command::Open => self.widget.open(),
            Command::Close => self.widget.close(),
            Command::Help => {}
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Run a due scan. Returns true when one ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        let page = self.pages.get(self.session.pathname()).unwrap_or(&self.blank);
        self.session.poll(now, page, self.site)
    }

    pub fn render(&mut self, color: bool) -> String {
        let view = WidgetView::of(&self.session);
        self.widget.render(&view, color)
    }

    fn wait(&self, now: Instant) -> Duration {
        self.session
            .next_deadline()
            .map(|d| d.saturating_duration_since(now))
            .unwrap_or(IDLE_WAIT)
    }
}

/// Drive a `Watch` from `input` until `quit` or end of input. A scan still
/// pending at end of input runs before returning.
pub fn run<R, W>(mut watch: Watch<'_>, input: R, out: &mut W, color: bool) -> io::Result<()>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    writeln!(out, "{}", HELP)?;
    write!(out, "{}", watch.render(color))?;
    loop {
        match rx.recv_timeout(watch.wait(Instant::now())) {
            Ok(line) => {
                let cmd = match parse_command(&line) {
                    Ok(Some(c)) => c,
                    Ok(None) => continue,
                    Err(e) => {
                        writeln!(out, "{} {}", crate::utils::error_prefix(), e)?;
                        continue;
                    }
                };
                debug!("command {:?}", cmd);
                if cmd == Command::Help {
                    writeln!(out, "{}", HELP)?;
                    continue;
                }
                if let Command::Go(path) = &cmd {
                    if !watch.has_page(path) {
                        writeln!(
                            out,
                            "{} no snapshot captured for {}; validating an empty page",
                            crate::utils::note_prefix(),
                            path
                        )?;
                    }
                }
                if let Flow::Quit = watch.apply(cmd, Instant::now()) {
                    break;
                }
                write!(out, "{}", watch.render(color))?;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if watch.tick(Instant::now()) {
                    write!(out, "{}", watch.render(color))?;
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                // input closed; settle a pending scan before leaving
                if let Some(due) = watch.session().next_deadline() {
                    if watch.tick(due) {
                        write!(out, "{}", watch.render(color))?;
                    }
                }
                break;
            }
        }
        out.flush()?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::site::{NavLink, NavSection};
    use std::io::Cursor;

    fn site() -> SiteMap {
        SiteMap {
            routes: vec!["/audits".into()],
            nav: vec![NavSection {
                section: "Main".into(),
                links: vec![NavLink {
                    title: "Audits".into(),
                    href: "/audits".into(),
                }],
            }],
        }
    }

    fn pages() -> BTreeMap<String, DomSnapshot> {
        let audits = DomSnapshot::new(
            Element::new("html").child(
                Element::new("body").child(Element::new("a").attr("href", "#").text("Soon")),
            ),
        )
        .at("/audits");
        [("/audits".to_string(), audits)].into_iter().collect()
    }

    fn manual() -> SessionOptions {
        SessionOptions {
            auto_run: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("go /audits"), Ok(Some(Command::Go("/audits".into()))));
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(parse_command("sev HIGH"), Ok(Some(Command::Severity(Severity::High))));
        assert_eq!(
            parse_command("fold accessibility"),
            Ok(Some(Command::Fold(IssueType::Accessibility)))
        );
        assert_eq!(parse_command("q"), Ok(Some(Command::Quit)));
        assert!(parse_command("go audits").is_err());
        assert!(parse_command("sev urgent").is_err());
        assert!(parse_command("type").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_apply_scan_and_navigation() {
        let (pages, site) = (pages(), site());
        let t0 = Instant::now();
        let mut w = Watch::new(&pages, &site, manual(), "/audits", t0);
        assert!(!w.session().is_validating());
        w.apply(Command::Scan, t0);
        assert!(w
            .session()
            .issues()
            .iter()
            .any(|i| i.description == "Link has an empty or placeholder href"));

        w.apply(Command::Go("/missing".into()), t0);
        assert!(w.session().is_validating());
        assert!(!w.tick(t0));
        assert!(w.tick(t0 + Duration::from_millis(300)));
        assert!(w
            .session()
            .issues()
            .iter()
            .any(|i| i.description.contains("/missing")));
    }

    #[test]
    fn test_widget_commands_do_not_rescan() {
        let (pages, site) = (pages(), site());
        let t0 = Instant::now();
        let mut w = Watch::new(&pages, &site, manual(), "/audits", t0);
        w.apply(Command::Tips, t0);
        w.apply(Command::Close, t0);
        assert!(!w.widget().is_open());
        assert!(w.session().last_validated().is_none());
        assert!(matches!(w.apply(Command::Quit, t0), Flow::Quit));
    }

    #[test]
    fn test_run_loop_from_reader() {
        let (pages, site) = (pages(), site());
        let w = Watch::new(&pages, &site, manual(), "/audits", Instant::now());
        let input = Cursor::new(b"scan\nbogus\nquit\nscan\n".to_vec());
        let mut out: Vec<u8> = Vec::new();
        run(w, input, &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("not yet run"));
        assert!(text.contains("▾ link (1)"));
        assert!(text.contains("unknown command: bogus"));
    }

    #[test]
    fn test_end_of_input_runs_pending_scan() {
        let (pages, site) = (pages(), site());
        let w = Watch::new(&pages, &site, manual(), "/audits", Instant::now());
        let input = Cursor::new(b"go /missing\n".to_vec());
        let mut out: Vec<u8> = Vec::new();
        run(w, input, &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("validating an empty page"));
        assert!(
            text.contains("Current page /missing is not in the route table"),
            "{}",
            text
        );
    }

    #[test]
    fn test_load_pages_keys_by_pathname() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        std::fs::write(&a, r#"{"pathname": "/x", "document": {"tag": "html"}}"#).unwrap();
        std::fs::write(&b, r#"{"document": {"tag": "html"}}"#).unwrap();
        let pages = load_pages(&[a, b]).unwrap();
        let keys: Vec<_> = pages.keys().cloned().collect();
        assert_eq!(keys, vec!["/".to_string(), "/x".to_string()]);
    }
}
