use std::future::Future;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tracing::debug;
use crate::app::{App, Dialog};
use crate::bridge::Session;
use crate::tui::{AppEvent, SessionEvent};

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => app.refresh_scroll(),
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Session(event) => handle_session_event(app, event),
    }
    Ok(())
}

fn handle_session_event(app: &mut App, event: SessionEvent) {
    match event {
        SessionEvent::Append(message) => app.append(message),
        SessionEvent::ClearInput(sent) => {
            // Keep a draft typed while the reply was in flight
            if app.input.text.trim() == sent {
                app.input.clear();
            }
        }
        SessionEvent::Prompt { question, reply } => {
            app.dialogs.push_back(Dialog::new(question, reply));
        }
        SessionEvent::Finished => {
            app.pending = app.pending.saturating_sub(1);
            app.refresh_scroll();
        }
    }
}

/// Run one chat operation on its own task
fn spawn_operation<F, Fut>(app: &mut App, name: &'static str, operation: F)
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    debug!("starting {}", name);
    let task = operation(app.session.clone());
    let events = app.events.clone();
    app.pending += 1;
    app.refresh_scroll();

    tokio::spawn(async move {
        task.await;
        let _ = events.send(AppEvent::Session(SessionEvent::Finished));
    });
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.active_dialog().is_some() {
        handle_dialog_key(app, key);
    } else if key.modifiers.contains(KeyModifiers::CONTROL) {
        handle_command_key(app, key);
    } else {
        handle_input_key(app, key);
    }
}

fn handle_dialog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            if let Some(dialog) = app.dialogs.pop_front() {
                dialog.submit();
            }
        }
        KeyCode::Esc => {
            if let Some(dialog) = app.dialogs.pop_front() {
                dialog.cancel();
            }
        }
        _ if key.modifiers.contains(KeyModifiers::CONTROL) => {}
        _ => {
            if let Some(dialog) = app.active_dialog_mut() {
                edit_line(&mut dialog.input, key.code);
            }
        }
    }
}

fn handle_command_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('l') => spawn_operation(app, "learning", |s| async move {
            s.handle_learning().await
        }),
        KeyCode::Char('w') => spawn_operation(app, "weather", |s| async move {
            s.get_weather().await
        }),
        KeyCode::Char('n') => spawn_operation(app, "news", |s| async move {
            s.get_news().await
        }),
        KeyCode::Char('s') => spawn_operation(app, "search", |s| async move {
            s.search_data().await
        }),
        KeyCode::Char('k') => spawn_operation(app, "known facts", |s| async move {
            s.show_known_facts().await
        }),
        _ => {}
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => {
            if !app.input.text.trim().is_empty() {
                let text = app.input.text.clone();
                spawn_operation(app, "chat", |s| async move {
                    s.send_message(&text).await
                });
            }
        }
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1) / 2),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1) / 2),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        code => edit_line(&mut app.input, code),
    }
}

fn edit_line(input: &mut crate::app::InputLine, code: KeyCode) {
    match code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Char(c) => input.insert(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(3),
        MouseEventKind::ScrollDown => app.scroll_down(3),
        _ => {}
    }
}
