use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use chatbox_core::Sender;
use crate::app::App;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.active_dialog().is_some() {
        render_dialog(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let pending_indicator = if app.pending > 0 {
        format!(" [{} pending]", app.pending)
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" chatbox ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.backend_url.clone(), Style::default().fg(Color::White)),
        Span::styled(pending_indicator, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn sender_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Cyan),
        Sender::Bot => Style::default().fg(Color::Yellow),
    }
}

/// Transcript lines exactly as drawn, also used for scroll math
pub fn transcript_text(app: &App) -> Text<'static> {
    if app.transcript.is_empty() && app.pending == 0 {
        return Text::from(Span::styled(
            "Say hello, or press Ctrl-N for the news...",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in app.transcript.messages() {
        // Raw spans only: message text is never parsed for markup
        let style = sender_style(msg.sender);
        for line in msg.text.lines() {
            lines.push(Line::from(Span::styled(line.to_string(), style)));
        }
        lines.push(Line::default());
    }

    if app.pending > 0 {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Waiting{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Text::from(lines)
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    app.refresh_scroll();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let text = transcript_text(app);

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let dialog_open = app.active_dialog().is_some();
    let border_color = if dialog_open { Color::DarkGray } else { Color::Yellow };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message ");

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_col) = app.input.visible(inner_width);

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if !dialog_open {
        frame.set_cursor_position((area.x + cursor_col as u16 + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.active_dialog().is_some() {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" submit ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ]
    } else {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" ^L ", key_style),
            Span::styled(" teach ", label_style),
            Span::styled(" ^W ", key_style),
            Span::styled(" weather ", label_style),
            Span::styled(" ^N ", key_style),
            Span::styled(" news ", label_style),
            Span::styled(" ^S ", key_style),
            Span::styled(" search ", label_style),
            Span::styled(" ^K ", key_style),
            Span::styled(" known ", label_style),
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" quit ", label_style),
        ]
    };

    let footer = Paragraph::new(Line::from(hints)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_dialog(app: &App, frame: &mut Frame, area: Rect) {
    let Some(dialog) = app.active_dialog() else {
        return;
    };

    // Calculate popup size and position (centered), never larger than the frame
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 6.min(area.height);

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height).intersection(area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let title = if app.dialogs.len() > 1 {
        format!(" Input needed (+{} queued) ", app.dialogs.len() - 1)
    } else {
        " Input needed ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    // Question on the first row when there is room for it
    if inner.height >= 2 {
        let question = Paragraph::new(dialog.question.as_str())
            .style(Style::default().fg(Color::White));
        frame.render_widget(question, Rect::new(inner.x, inner.y, inner.width, 1));
    }

    let input_row = inner.y + 2.min(inner.height - 1);
    let input_area = Rect::new(inner.x, input_row, inner.width, 1);
    let (visible_text, cursor_col) = dialog.input.visible(input_area.width as usize);
    let input = Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan));
    frame.render_widget(input, input_area);

    frame.set_cursor_position((input_area.x + cursor_col as u16, input_area.y));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Dialog;
    use chatbox_core::{BackendClient, Message};
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::{mpsc, oneshot};

    fn app_with_dialog() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(BackendClient::new("http://127.0.0.1:5000"), tx);
        let (reply, _answer) = oneshot::channel();
        app.dialogs
            .push_back(Dialog::new("Enter location for weather:".to_string(), reply));
        app
    }

    #[test]
    fn test_dialog_fits_small_terminals() {
        for height in 1..=8 {
            for width in [1, 10, 30, 80] {
                let mut app = app_with_dialog();
                let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
                terminal.draw(|frame| render(&mut app, frame)).unwrap();
            }
        }
    }

    #[test]
    fn test_transcript_renders_markup_literally() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(BackendClient::new("http://127.0.0.1:5000"), tx);
        app.append(Message::bot("<b>**hi**</b>"));

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..40).map(|x| buffer[(x, 2)].symbol().to_string()).collect();
        assert!(row.contains("Bot: <b>**hi**</b>"), "row was {:?}", row);
    }
}
