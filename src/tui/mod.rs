mod help;
mod panels;

use crate::cli::Cli;
use crate::model::{AnalysisInput, WorkflowEvent, WorkflowEventKind};
use crate::orchestrator::{self, UiCommand};
use crate::session::SessionState;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Tabs},
    Terminal,
};
use std::{io, path::PathBuf, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Which input control is capturing keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Normal,
    JobDescription,
    ResumePath,
}

pub(crate) struct UiState {
    pub session: SessionState,
    pub resume_path_input: String,
    pub focus: Focus,
    pub info: String,
    pub tab: usize,
    pub spinner_idx: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            session: SessionState::default(),
            resume_path_input: String::new(),
            focus: Focus::Normal,
            info: String::new(),
            tab: 0,
            spinner_idx: 0,
        }
    }
}

pub async fn run(args: Cli) -> Result<()> {
    // Unbounded channels avoid backpressure between the workflow and the UI.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<WorkflowEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let cfg = crate::cli::build_config(&args);
    let job_description = crate::cli::load_job_description(&args).await?;

    // TUI runs in a dedicated thread to keep all blocking terminal I/O out of
    // the Tokio runtime.
    let ui_args = args.clone();
    let ui_handle =
        std::thread::spawn(move || run_threaded(ui_args, job_description, event_rx, cmd_tx));

    let res = orchestrator::run_controller(&cfg, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    args: Cli,
    job_description: String,
    mut event_rx: UnboundedReceiver<WorkflowEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::default();
    state.session.set_job_description(job_description);
    state.resume_path_input = args
        .resume
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep the UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        if last_tick.elapsed() >= tick_rate {
            state.spinner_idx = state.spinner_idx.wrapping_add(1);
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
                    let _ = cmd_tx.send(UiCommand::Quit);
                    break Ok(());
                }
                match state.focus {
                    Focus::JobDescription => handle_job_description_key(&mut state, k.code),
                    Focus::ResumePath => handle_resume_path_key(&mut state, k.code),
                    Focus::Normal => match k.code {
                        KeyCode::Char('q') => {
                            let _ = cmd_tx.send(UiCommand::Quit);
                            break Ok(());
                        }
                        KeyCode::Char('a') | KeyCode::Enter => {
                            try_analyze(&mut state, &cmd_tx);
                        }
                        KeyCode::Char('e') => {
                            state.focus = Focus::JobDescription;
                        }
                        KeyCode::Char('f') => {
                            state.focus = Focus::ResumePath;
                        }
                        KeyCode::Char('r') => {
                            // Reset is always available, even mid-call; the
                            // controller cancels the run and stale events are
                            // dropped by the session's generation check.
                            state.session.reset();
                            state.resume_path_input.clear();
                            state.info = "Reset".into();
                            let _ = cmd_tx.send(UiCommand::Reset);
                        }
                        KeyCode::Tab => {
                            state.tab = (state.tab + 1) % 2;
                        }
                        KeyCode::Char('?') => {
                            state.tab = 1;
                        }
                        _ => {}
                    },
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

/// Every keystroke lands in the session directly, mirroring an editable form
/// field bound to the store.
fn handle_job_description_key(state: &mut UiState, code: KeyCode) {
    match code {
        KeyCode::Esc => state.focus = Focus::Normal,
        KeyCode::Enter => {
            let mut jd = state.session.job_description.clone();
            jd.push('\n');
            state.session.set_job_description(jd);
        }
        KeyCode::Backspace => {
            let mut jd = state.session.job_description.clone();
            jd.pop();
            state.session.set_job_description(jd);
        }
        KeyCode::Char(c) => {
            let mut jd = state.session.job_description.clone();
            jd.push(c);
            state.session.set_job_description(jd);
        }
        _ => {}
    }
}

fn handle_resume_path_key(state: &mut UiState, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Enter => state.focus = Focus::Normal,
        KeyCode::Backspace => {
            state.resume_path_input.pop();
        }
        KeyCode::Char(c) => {
            state.resume_path_input.push(c);
        }
        _ => {}
    }
}

/// Gate the analyze action the way the form disables its button: a file, a
/// job description, and no call in flight.
fn try_analyze(state: &mut UiState, cmd_tx: &UnboundedSender<UiCommand>) {
    if state.session.is_loading {
        state.info = "A call is already in flight".into();
        return;
    }
    let path = state.resume_path_input.trim();
    if path.is_empty() {
        state.info = "Select a resume file first (press f)".into();
        return;
    }
    if state.session.job_description.is_empty() {
        state.info = "Paste a job description first (press e)".into();
        return;
    }

    let input = AnalysisInput {
        resume_path: PathBuf::from(path),
        job_description: state.session.job_description.clone(),
        generation: state.session.generation,
    };
    let _ = cmd_tx.send(UiCommand::Analyze(input));
}

fn apply_event(state: &mut UiState, ev: WorkflowEvent) {
    if !state.session.apply_event(&ev) {
        // Stale generation: the run was reset out from under this event.
        return;
    }
    match ev.kind {
        WorkflowEventKind::StageStarted { stage } => {
            state.info = format!("{}…", stage.label());
        }
        WorkflowEventKind::UploadCompleted { .. } => {
            state.info = "Resume text extracted".into();
        }
        WorkflowEventKind::AnalysisSkipped => {
            state.info = "Job description is empty; analysis skipped".into();
        }
        WorkflowEventKind::AnalysisCompleted { .. } => {
            state.info = "Analysis complete".into();
        }
        WorkflowEventKind::WorkflowFailed { .. } => {}
        WorkflowEventKind::Info(msg) => state.info = msg,
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Optimizer"), Line::from("Help")])
        .select(state.tab)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("resume-optimizer"),
        )
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => panels::draw_optimizer(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}
