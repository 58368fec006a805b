//! Form and result panels for the optimizer tab.
//!
//! Everything here is a pure function of `UiState`; derived values like the
//! missing-keyword set are computed at render time, not stored.

use super::{Focus, UiState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

pub(crate) fn draw_optimizer(area: Rect, f: &mut Frame, state: &UiState) {
    let mut constraints = vec![
        Constraint::Length(3), // resume file input
        Constraint::Length(8), // job description editor
        Constraint::Length(4), // status + key hints
    ];
    if state.session.error.is_some() {
        constraints.push(Constraint::Length(3)); // error banner
    }
    constraints.push(Constraint::Min(0)); // results

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    draw_resume_input(chunks[0], f, state);
    draw_job_description(chunks[1], f, state);
    draw_status(chunks[2], f, state);

    let results_area = if let Some(error) = state.session.error.as_deref() {
        draw_error_banner(chunks[3], f, error);
        chunks[4]
    } else {
        chunks[3]
    };
    draw_results(results_area, f, state);
}

fn input_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().fg(Color::Yellow))
    } else {
        block
    }
}

fn draw_resume_input(area: Rect, f: &mut Frame, state: &UiState) {
    let focused = state.focus == Focus::ResumePath;
    let content = if state.resume_path_input.is_empty() {
        Line::from(Span::styled(
            "No file selected: press f and type a path (.pdf, .docx, .txt)",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(state.resume_path_input.as_str())
    };
    let p = Paragraph::new(content).block(input_block("Resume file (f to edit)", focused));
    f.render_widget(p, area);
}

fn draw_job_description(area: Rect, f: &mut Frame, state: &UiState) {
    let focused = state.focus == Focus::JobDescription;
    let title = if focused {
        "Job Description (Esc to finish)"
    } else {
        "Job Description (e to edit)"
    };
    let content = if state.session.job_description.is_empty() {
        Line::from(Span::styled(
            "Paste job description here...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(state.session.job_description.as_str())
    };
    let p = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(input_block(title, focused));
    f.render_widget(p, area);
}

fn draw_status(area: Rect, f: &mut Frame, state: &UiState) {
    let status_line = if state.session.is_loading {
        let spinner = SPINNER[state.spinner_idx % SPINNER.len()];
        Line::from(vec![
            Span::styled(
                format!("{spinner} "),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(state.info.clone()),
        ])
    } else {
        Line::from(vec![
            Span::styled("Info: ", Style::default().fg(Color::Gray)),
            Span::raw(state.info.clone()),
        ])
    };

    let p = Paragraph::new(vec![
        status_line,
        Line::from(Span::styled(
            "Keys: a analyze | e edit description | f edit file | r reset | tab help | q quit",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(p, area);
}

fn draw_error_banner(area: Rect, f: &mut Frame, error: &str) {
    let p = Paragraph::new(Line::from(Span::styled(
        error,
        Style::default().fg(Color::Red),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title("Error"),
    );
    f.render_widget(p, area);
}

fn draw_results(area: Rect, f: &mut Frame, state: &UiState) {
    // Result panels render only once loading is done and the service returned
    // at least one keyword set.
    if state.session.is_loading || !state.session.has_results() {
        let p = Paragraph::new(Span::styled(
            "Results will appear here after an analysis.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Analysis Results"),
        );
        f.render_widget(p, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let score = state.session.score.clamp(0.0, 100.0);
    let gauge_color = if score >= 70.0 {
        Color::Green
    } else if score >= 40.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Match Score"))
        .gauge_style(Style::default().fg(gauge_color))
        .percent(score.round() as u16);
    f.render_widget(gauge, rows[0]);

    let mut lines = vec![Line::from(Span::styled(
        "Matched keywords",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.push(keyword_badges(
        &state.session.matched_keywords,
        Color::Green,
        "No matches found",
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Missing keywords",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(keyword_badges(
        &state.session.missing_keywords(),
        Color::Red,
        "(none)",
    ));

    if !state.session.suggestions.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Suggestions",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for suggestion in &state.session.suggestions {
            lines.push(Line::from(format!("  • {suggestion}")));
        }
    }
    if !state.session.key_skills_analysis.trim().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Key skills",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(state.session.key_skills_analysis.trim().to_string()));
    }
    if !state.session.improvement_areas.trim().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Improvement areas",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(state.session.improvement_areas.trim().to_string()));
    }

    let details = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Analysis Results"),
    );
    f.render_widget(details, rows[1]);
}

/// One line of colored keyword badges, or a gray placeholder when empty.
fn keyword_badges(keywords: &[String], color: Color, empty: &str) -> Line<'static> {
    if keywords.is_empty() {
        return Line::from(Span::styled(
            empty.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let mut spans = Vec::new();
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("[{keyword}]"),
            Style::default().fg(color),
        ));
    }
    Line::from(spans)
}
